//! Simulated servo output — stands in for one PWM channel.

use std::sync::{Arc, Mutex};

use cabinhub_app::ports::{ChannelError, PwmOutput};
use cabinhub_domain::position::DutyCycle;

use super::lock;

/// A PWM channel that only remembers what it was told.
///
/// Clones share the same state so a test can keep a handle while the
/// watchdog owns the boxed output.
#[derive(Debug, Clone, Default)]
pub struct SimulatedOutput {
    channel: u8,
    duty: Arc<Mutex<DutyCycle>>,
}

impl SimulatedOutput {
    #[must_use]
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            duty: Arc::default(),
        }
    }

    #[must_use]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Last duty cycle written.
    #[must_use]
    pub fn duty_cycle(&self) -> DutyCycle {
        *lock(&self.duty)
    }

    /// Whether the simulated servo is currently driven.
    #[must_use]
    pub fn is_energized(&self) -> bool {
        !self.duty_cycle().is_zero()
    }
}

impl PwmOutput for SimulatedOutput {
    fn write_duty_cycle(&self, duty: DutyCycle) -> Result<(), ChannelError> {
        *lock(&self.duty) = duty;
        tracing::trace!(channel = self.channel, %duty, "simulated duty cycle");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinhub_domain::position::Position;

    #[test]
    fn should_start_de_energized() {
        let output = SimulatedOutput::new(3);
        assert_eq!(output.channel(), 3);
        assert!(!output.is_energized());
    }

    #[test]
    fn should_remember_last_duty_cycle() {
        let output = SimulatedOutput::new(0);
        output.write_duty_cycle(Position::CLOSED.duty_cycle()).unwrap();
        assert_eq!(output.duty_cycle().raw(), 6553);
        assert!(output.is_energized());

        output.write_duty_cycle(DutyCycle::ZERO).unwrap();
        assert!(!output.is_energized());
    }

    #[test]
    fn should_share_state_between_clones() {
        let output = SimulatedOutput::new(0);
        let handle = output.clone();
        let boxed: Box<dyn PwmOutput> = Box::new(output);

        boxed.write_duty_cycle(Position::OPEN.duty_cycle()).unwrap();

        assert_eq!(handle.duty_cycle().raw(), 3276);
    }
}
