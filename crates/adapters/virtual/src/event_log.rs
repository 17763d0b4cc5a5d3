//! In-memory event log — keeps the most recent records.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use cabinhub_app::ports::{EventLog, EventLogError};
use cabinhub_domain::event::EventRecord;

/// Bounded ring of [`EventRecord`]s; each record is also logged.
#[derive(Debug)]
pub struct MemoryEventLog {
    capacity: usize,
    records: Mutex<VecDeque<EventRecord>>,
}

impl MemoryEventLog {
    /// Keep at most `capacity` records, dropping the oldest first.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Stored records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventLog for MemoryEventLog {
    async fn record(&self, event: EventRecord) -> Result<(), EventLogError> {
        if self.capacity == 0 {
            return Err(EventLogError::Unavailable);
        }
        tracing::info!(
            trigger = %event.trigger,
            response = %event.response,
            automated = event.automated,
            "{event}"
        );
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(event);
        Ok(())
    }
}
