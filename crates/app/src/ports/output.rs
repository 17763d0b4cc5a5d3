//! Output channel port — the PWM line driving one covering servo.

use cabinhub_domain::error::CabinError;
use cabinhub_domain::position::DutyCycle;

/// A single PWM output channel.
///
/// Writes are synchronous and best-effort: the watchdog calls this while
/// holding its own state lock, so implementations must not block for long.
pub trait PwmOutput: Send + Sync {
    /// Drive the channel at `duty`; [`DutyCycle::ZERO`] de-energizes it.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] when the underlying device rejects the write.
    fn write_duty_cycle(&self, duty: DutyCycle) -> Result<(), ChannelError>;
}

/// Failure writing to an output channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel has been released or was never opened.
    #[error("output channel unavailable")]
    Unavailable,

    /// The driver returned an I/O error.
    #[error("output channel write failed")]
    Io(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ChannelError> for CabinError {
    fn from(err: ChannelError) -> Self {
        Self::Hardware(Box::new(err))
    }
}
