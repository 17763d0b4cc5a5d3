//! Heating rule — hysteresis control of the heater relay.

use std::sync::Arc;

use cabinhub_domain::device::RelayChannel;
use cabinhub_domain::event::{EventRecord, ResponseCode, TriggerCode};
use cabinhub_domain::heating::HeaterDecision;

use crate::ports::event_log::record_or_warn;
use crate::ports::{EventLog, RelaySwitch, TemperatureSource};
use crate::settings::SharedSettings;

/// Result of one heating evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatingOutcome {
    /// Heating mode is not `auto`.
    Disabled,
    /// No reading this cycle; nothing changed.
    SensorUnavailable,
    SwitchedOn { reading: f64 },
    SwitchedOff { reading: f64 },
    /// Inside the band or already in the right state.
    Held { reading: f64 },
    /// The relay rejected the command; retried next cycle.
    SwitchFailed { reading: f64 },
}

/// Keeps the cabin inside `desired ± margin` while heating is automatic.
pub struct HeatingRule<T, R, E> {
    temperature: Arc<T>,
    relay: Arc<R>,
    events: Arc<E>,
    heater: RelayChannel,
    settings: SharedSettings,
}

impl<T, R, E> HeatingRule<T, R, E>
where
    T: TemperatureSource,
    R: RelaySwitch,
    E: EventLog,
{
    #[must_use]
    pub fn new(
        temperature: Arc<T>,
        relay: Arc<R>,
        events: Arc<E>,
        heater: RelayChannel,
        settings: SharedSettings,
    ) -> Self {
        Self {
            temperature,
            relay,
            events,
            heater,
            settings,
        }
    }

    /// Run the rule once.
    pub async fn evaluate(&self) -> HeatingOutcome {
        let heating = self.settings.read(|s| s.heating.clone());
        if !heating.mode.is_automatic() {
            tracing::debug!(mode = %heating.mode, "auto heating off, skipping");
            return HeatingOutcome::Disabled;
        }

        let reading = match self.temperature.read_temperature().await {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(%err, "problem reading temperature, skipping heating");
                return HeatingOutcome::SensorUnavailable;
            }
        };

        let heater_on = self.relay.is_on(self.heater);
        tracing::debug!(reading, desired = heating.desired_temp, heater_on, "heating check");

        let (on, trigger) = match heating.band().decide(heater_on, reading) {
            HeaterDecision::Hold => return HeatingOutcome::Held { reading },
            HeaterDecision::SwitchOn => (true, TriggerCode::TemperatureBelow),
            HeaterDecision::SwitchOff => (false, TriggerCode::TemperatureAbove),
        };

        if let Err(err) = self.relay.switch(self.heater, on).await {
            tracing::warn!(%err, on, "failed to switch heater");
            return HeatingOutcome::SwitchFailed { reading };
        }
        tracing::info!(reading, on, "heater switched");

        let state = if on { "on" } else { "off" };
        record_or_warn(
            self.events.as_ref(),
            EventRecord::automated(
                trigger,
                Some(reading.to_string()),
                ResponseCode::HeatingState,
                state,
            ),
        )
        .await;

        if on {
            HeatingOutcome::SwitchedOn { reading }
        } else {
            HeatingOutcome::SwitchedOff { reading }
        }
    }
}
