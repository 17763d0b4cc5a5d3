//! Control service — the commands and queries a user surface exposes.
//!
//! Inputs arrive as already-validated domain values; every accepted command
//! is applied and then recorded in the event log as a commanded event.

use std::sync::Arc;

use cabinhub_domain::error::CabinError;
use cabinhub_domain::event::{EventRecord, ResponseCode, TriggerCode};
use cabinhub_domain::heating::{HeatingMode, HeatingStatus, TemperatureAdjustment};
use cabinhub_domain::position::{CoveringTarget, Position};

use crate::coordinator::MotionCoordinator;
use crate::ports::event_log::record_or_warn;
use crate::ports::{EventLog, RelaySwitch, TemperatureSource};
use crate::scheduler::DeviceChannels;
use crate::settings::SharedSettings;

/// Application service behind the control surface.
pub struct ControlService<T, R, E> {
    temperature: Arc<T>,
    relay: Arc<R>,
    events: Arc<E>,
    coordinator: Arc<MotionCoordinator>,
    settings: SharedSettings,
    channels: DeviceChannels,
}

impl<T, R, E> ControlService<T, R, E>
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
        coordinator: Arc<MotionCoordinator>,
        settings: SharedSettings,
        channels: DeviceChannels,
    ) -> Self {
        Self {
            temperature,
            relay,
            events,
            coordinator,
            settings,
            channels,
        }
    }

    /// Step or set the desired temperature, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns [`CabinError::Validation`] when the change would leave the
    /// configured limits.
    #[tracing::instrument(skip(self))]
    pub async fn adjust_desired_temperature(
        &self,
        adjustment: TemperatureAdjustment,
    ) -> Result<f64, CabinError> {
        let desired = self.settings.update(|s| {
            let next = s.heating.limits.apply(s.heating.desired_temp, adjustment)?;
            s.heating.desired_temp = next;
            Ok::<_, CabinError>(next)
        })?;
        tracing::info!(desired, "desired temperature changed");
        self.record(
            TriggerCode::CommandDesiredTemperature,
            adjustment_detail(adjustment),
            ResponseCode::HeatingDesired,
            desired.to_string(),
        )
        .await;
        Ok(desired)
    }

    /// Change the heating mode. Switching to `off` also turns the heater off.
    ///
    /// # Errors
    ///
    /// Returns [`CabinError::Hardware`] when the heater could not be switched
    /// off; the mode change itself is kept.
    #[tracing::instrument(skip(self))]
    pub async fn set_heating_mode(&self, mode: HeatingMode) -> Result<(), CabinError> {
        self.settings.update(|s| s.heating.mode = mode);
        tracing::info!(%mode, "heating mode changed");
        self.record(
            TriggerCode::CommandHeatingMode,
            mode.to_string(),
            ResponseCode::HeatingMode,
            mode.to_string(),
        )
        .await;

        if mode == HeatingMode::Off {
            self.relay.switch(self.channels.heater, false).await?;
            self.record(
                TriggerCode::CommandHeatingMode,
                mode.to_string(),
                ResponseCode::HeatingState,
                "off",
            )
            .await;
        }
        Ok(())
    }

    /// Switch the heater directly.
    ///
    /// # Errors
    ///
    /// Returns [`CabinError::Hardware`] when the relay rejects the command.
    #[tracing::instrument(skip(self))]
    pub async fn set_heater(&self, on: bool) -> Result<(), CabinError> {
        self.relay.switch(self.channels.heater, on).await?;
        let state = if on { "on" } else { "off" };
        tracing::info!(state, "heater switched by command");
        self.record(
            TriggerCode::CommandHeatingStatus,
            state,
            ResponseCode::HeatingState,
            state,
        )
        .await;
        Ok(())
    }

    /// Move one covering, or all of them, and wait for them to settle.
    ///
    /// # Errors
    ///
    /// Returns [`CabinError::NotFound`] for an unknown covering name, or
    /// [`CabinError::Motion`] when a move never settles or the fleet is shut
    /// down. Nothing is recorded on failure.
    #[tracing::instrument(skip(self))]
    pub async fn set_covering(
        &self,
        target: CoveringTarget,
        position: Position,
    ) -> Result<(), CabinError> {
        match &target {
            CoveringTarget::All => self.coordinator.move_all(position).await?,
            CoveringTarget::One(name) => self.coordinator.move_one(name, position).await?,
        }
        let detail = format!("{target}, {position}");
        self.record(
            TriggerCode::CommandCoveringPosition,
            detail.as_str(),
            ResponseCode::CoveringsState,
            detail.as_str(),
        )
        .await;
        Ok(())
    }

    /// Current heating state. A failed sensor read reports no temperature.
    pub async fn heating_status(&self) -> HeatingStatus {
        let current_temp = match self.temperature.read_temperature().await {
            Ok(reading) => Some(reading),
            Err(err) => {
                tracing::warn!(%err, "problem reading temperature for status");
                None
            }
        };
        let heating = self.settings.read(|s| s.heating.clone());
        HeatingStatus {
            current_temp,
            desired_temp: heating.desired_temp,
            mode: heating.mode,
            heater_on: self.relay.is_on(self.channels.heater),
        }
    }

    /// Commanded position of every covering, in wiring order.
    #[must_use]
    pub fn covering_positions(&self) -> Vec<(String, Position)> {
        self.coordinator.registry().positions()
    }

    async fn record(
        &self,
        trigger: TriggerCode,
        trigger_detail: impl Into<String>,
        response: ResponseCode,
        response_detail: impl Into<String>,
    ) {
        record_or_warn(
            self.events.as_ref(),
            EventRecord::commanded(trigger, trigger_detail, response, response_detail),
        )
        .await;
    }
}

fn adjustment_detail(adjustment: TemperatureAdjustment) -> String {
    match adjustment {
        TemperatureAdjustment::Increase => "increase".to_string(),
        TemperatureAdjustment::Decrease => "decrease".to_string(),
        TemperatureAdjustment::Set(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::MotionTimings;
    use crate::registry::ActuatorRegistry;
    use crate::scheduler::tests::{FakeRelay, FakeTemperature, SpyEventLog};
    use crate::watchdog::tests::RecordingOutput;
    use crate::watchdog::{ActuatorWatchdog, WatchdogTimings};
    use cabinhub_domain::device::RelayChannel;
    use cabinhub_domain::error::ValidationError;
    use cabinhub_domain::settings::AutomationSettings;

    struct Harness {
        service: ControlService<FakeTemperature, FakeRelay, SpyEventLog>,
        relay: Arc<FakeRelay>,
        events: Arc<SpyEventLog>,
        settings: SharedSettings,
        coordinator: Arc<MotionCoordinator>,
    }

    fn harness() -> Harness {
        let output = RecordingOutput::default();
        let actuators = ["left", "right"]
            .iter()
            .zip(0u8..)
            .map(|(name, channel)| {
                ActuatorWatchdog::spawn(
                    *name,
                    channel,
                    output.on_channel(channel),
                    Position::OPEN,
                    WatchdogTimings::default(),
                )
            })
            .collect();
        let registry = Arc::new(ActuatorRegistry::new(actuators).unwrap());
        let coordinator = Arc::new(MotionCoordinator::new(registry, MotionTimings::default()));
        let relay = Arc::new(FakeRelay::default());
        let events = Arc::new(SpyEventLog::default());
        let settings = SharedSettings::new(AutomationSettings::default());
        let service = ControlService::new(
            Arc::new(FakeTemperature::new(Some(18.5))),
            Arc::clone(&relay),
            Arc::clone(&events),
            Arc::clone(&coordinator),
            settings.clone(),
            DeviceChannels::default(),
        );
        Harness {
            service,
            relay,
            events,
            settings,
            coordinator,
        }
    }

    #[tokio::test]
    async fn should_increase_desired_temperature() {
        let h = harness();

        let desired = h
            .service
            .adjust_desired_temperature(TemperatureAdjustment::Increase)
            .await
            .unwrap();

        assert!((desired - 20.5).abs() < f64::EPSILON);
        assert!((h.settings.read(|s| s.heating.desired_temp) - 20.5).abs() < f64::EPSILON);
        let recorded = h.events.records();
        assert_eq!(recorded[0].trigger, TriggerCode::CommandDesiredTemperature);
        assert_eq!(recorded[0].response, ResponseCode::HeatingDesired);
        assert!(!recorded[0].automated);
    }

    #[tokio::test]
    async fn should_reject_desired_temperature_outside_limits() {
        let h = harness();

        let err = h
            .service
            .adjust_desired_temperature(TemperatureAdjustment::Set(35.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CabinError::Validation(ValidationError::DesiredTemperatureOutOfBounds { .. })
        ));
        assert!((h.settings.read(|s| s.heating.desired_temp) - 20.0).abs() < f64::EPSILON);
        assert!(h.events.records().is_empty());
    }

    #[tokio::test]
    async fn should_switch_heater_off_with_mode_off() {
        let h = harness();
        h.relay.force(RelayChannel(1), true);
        h.settings.update(|s| s.heating.mode = HeatingMode::Auto);

        h.service.set_heating_mode(HeatingMode::Off).await.unwrap();

        assert_eq!(h.settings.read(|s| s.heating.mode), HeatingMode::Off);
        assert!(!h.relay.is_on(RelayChannel(1)));
        let responses: Vec<ResponseCode> = h.events.records().iter().map(|e| e.response).collect();
        assert_eq!(
            responses,
            vec![ResponseCode::HeatingMode, ResponseCode::HeatingState]
        );
    }

    #[tokio::test]
    async fn should_leave_heater_alone_in_manual_mode() {
        let h = harness();
        h.relay.force(RelayChannel(1), true);

        h.service.set_heating_mode(HeatingMode::Manual).await.unwrap();

        assert!(h.relay.is_on(RelayChannel(1)));
        assert!(h.relay.commands().is_empty());
    }

    #[tokio::test]
    async fn should_switch_heater_on_command() {
        let h = harness();

        h.service.set_heater(true).await.unwrap();

        assert!(h.relay.is_on(RelayChannel(1)));
        assert_eq!(h.events.records()[0].trigger, TriggerCode::CommandHeatingStatus);
    }

    #[tokio::test]
    async fn should_surface_relay_failure_as_hardware_error() {
        let h = harness();
        h.relay.fail_next();

        let err = h.service.set_heater(true).await.unwrap_err();

        assert!(matches!(err, CabinError::Hardware(_)));
        assert!(h.events.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_move_single_covering() {
        let h = harness();

        h.service
            .set_covering(CoveringTarget::One("right".to_string()), Position::CLOSED)
            .await
            .unwrap();

        assert_eq!(
            h.service.covering_positions(),
            vec![
                ("left".to_string(), Position::OPEN),
                ("right".to_string(), Position::CLOSED),
            ]
        );
        let recorded = h.events.records();
        assert_eq!(recorded[0].trigger, TriggerCode::CommandCoveringPosition);
        assert_eq!(recorded[0].trigger_detail.as_deref(), Some("right, 20"));
        assert_eq!(recorded[0].response_detail, "right, 20");
    }

    #[tokio::test(start_paused = true)]
    async fn should_move_all_coverings() {
        let h = harness();

        h.service
            .set_covering(CoveringTarget::All, Position::CLOSED)
            .await
            .unwrap();

        assert!(
            h.service
                .covering_positions()
                .iter()
                .all(|(_, position)| *position == Position::CLOSED)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_unknown_covering() {
        let h = harness();

        let err = h
            .service
            .set_covering(CoveringTarget::One("porch".to_string()), Position::CLOSED)
            .await
            .unwrap_err();

        assert!(matches!(err, CabinError::NotFound(_)));
        assert!(h.events.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_fail_covering_command_after_shutdown() {
        let h = harness();
        h.coordinator.registry().shutdown();

        let err = h
            .service
            .set_covering(CoveringTarget::One("left".to_string()), Position::CLOSED)
            .await
            .unwrap_err();

        assert!(matches!(err, CabinError::Motion(_)));
        assert!(h.events.records().is_empty());
        assert_eq!(h.service.covering_positions()[0].1, Position::OPEN);
    }

    #[tokio::test]
    async fn should_report_heating_status() {
        let h = harness();
        h.relay.force(RelayChannel(1), true);

        let status = h.service.heating_status().await;

        assert_eq!(status.current_temp, Some(18.5));
        assert!((status.desired_temp - 20.0).abs() < f64::EPSILON);
        assert_eq!(status.mode, HeatingMode::Off);
        assert!(status.heater_on);
    }
}
