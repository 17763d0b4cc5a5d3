//! Virtual relay — remote sockets that only exist in memory.

use std::collections::HashMap;
use std::sync::Mutex;

use cabinhub_app::ports::{RelaySwitch, SwitchError};
use cabinhub_domain::device::RelayChannel;

use super::lock;

/// In-memory set of paired sockets, all off initially.
#[derive(Debug)]
pub struct VirtualRelay {
    states: Mutex<HashMap<RelayChannel, bool>>,
}

impl VirtualRelay {
    /// Pair the given channels.
    #[must_use]
    pub fn new(channels: impl IntoIterator<Item = RelayChannel>) -> Self {
        Self {
            states: Mutex::new(channels.into_iter().map(|c| (c, false)).collect()),
        }
    }
}

impl Default for VirtualRelay {
    fn default() -> Self {
        Self::new([RelayChannel(1), RelayChannel(2)])
    }
}

impl RelaySwitch for VirtualRelay {
    async fn switch(&self, channel: RelayChannel, on: bool) -> Result<(), SwitchError> {
        let mut states = lock(&self.states);
        let state = states
            .get_mut(&channel)
            .ok_or(SwitchError::UnknownChannel(channel))?;
        *state = on;
        tracing::debug!(%channel, on, "virtual relay switched");
        Ok(())
    }

    fn is_on(&self, channel: RelayChannel) -> bool {
        lock(&self.states).get(&channel).copied().unwrap_or(false)
    }
}
