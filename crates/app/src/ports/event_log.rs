//! Event log port — append-only record of triggers and responses.

use std::future::Future;

use cabinhub_domain::event::EventRecord;

/// Sink for [`EventRecord`]s.
pub trait EventLog: Send + Sync {
    /// Append one record.
    fn record(&self, event: EventRecord) -> impl Future<Output = Result<(), EventLogError>> + Send;
}

/// The event log could not accept a record.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// No usable log store.
    #[error("event log unavailable")]
    Unavailable,

    /// The store rejected the write.
    #[error("event log write failed")]
    Write(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Append `event`, logging instead of failing when the log is unusable.
///
/// Automation must never block on the event log.
pub async fn record_or_warn<E: EventLog>(log: &E, event: EventRecord) {
    let trigger = event.trigger;
    if let Err(err) = log.record(event).await {
        tracing::warn!(%err, %trigger, "failed to record event");
    }
}
