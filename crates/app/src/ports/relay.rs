//! Relay port — remote sockets powering binary devices.

use std::future::Future;

use cabinhub_domain::device::RelayChannel;
use cabinhub_domain::error::CabinError;

/// Switches remote sockets on and off.
///
/// The switch remembers the last state it sent; there is no read-back from
/// the sockets themselves.
pub trait RelaySwitch: Send + Sync {
    /// Send an on/off command to `channel`.
    fn switch(
        &self,
        channel: RelayChannel,
        on: bool,
    ) -> impl Future<Output = Result<(), SwitchError>> + Send;

    /// Last state sent to `channel` (`false` if never switched).
    fn is_on(&self, channel: RelayChannel) -> bool;
}

/// A relay command could not be transmitted.
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    /// The channel is not paired with this transmitter.
    #[error("{0} is not paired")]
    UnknownChannel(RelayChannel),

    /// The transmitter failed.
    #[error("relay transmission failed")]
    Transmit(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<SwitchError> for CabinError {
    fn from(err: SwitchError) -> Self {
        Self::Hardware(Box::new(err))
    }
}
