//! Automation scheduler — runs every rule once per fixed period.
//!
//! Each cycle evaluates, in order, the heating rule, the occupancy timeout
//! and the covering rules. A covering move takes at least one idle timeout
//! per actuator, so it runs as a background motion job; the covering rule is
//! skipped while a job is in flight and a failed job stops the scheduler on
//! the next cycle. Presence edges are handled by a separate listener task.

pub mod coverings;
pub mod heating;
pub mod occupancy;

use std::sync::Arc;
use std::time::Duration;

use cabinhub_domain::device::RelayChannel;
use cabinhub_domain::event::{EventRecord, ResponseCode};
use cabinhub_domain::position::CoveringTarget;
use cabinhub_domain::time::local_hour;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::{MotionCoordinator, MotionError};
use crate::ports::event_log::record_or_warn;
use crate::ports::{EventLog, ForecastProvider, LightSource, RelaySwitch, TemperatureSource};
use crate::settings::SharedSettings;

pub use coverings::{CoveringCommand, CoveringOutcome, CoveringRule};
pub use heating::{HeatingOutcome, HeatingRule};
pub use occupancy::{
    OccupancyOutcome, OccupancyRule, PresenceOutcome, PresenceReceiver, PresenceSender,
    presence_channel,
};

/// Relay channels used by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceChannels {
    pub heater: RelayChannel,
    pub devices: RelayChannel,
}

impl Default for DeviceChannels {
    fn default() -> Self {
        Self {
            heater: RelayChannel(1),
            devices: RelayChannel(2),
        }
    }
}

/// Every collaborator the rules read from or act on.
pub struct SchedulerPorts<T, L, F, R, E> {
    pub temperature: Arc<T>,
    pub light: Arc<L>,
    pub forecast: Arc<F>,
    pub relay: Arc<R>,
    pub events: Arc<E>,
}

/// What each rule did during one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub heating: HeatingOutcome,
    pub occupancy: OccupancyOutcome,
    pub coverings: CoveringOutcome,
}

/// Periodic driver of the automation rules.
pub struct AutomationScheduler<T, L, F, R, E> {
    heating: HeatingRule<T, R, E>,
    occupancy: Arc<OccupancyRule<R, E>>,
    coverings: CoveringRule<L, F>,
    coordinator: Arc<MotionCoordinator>,
    events: Arc<E>,
    period: Duration,
    motion: Option<JoinHandle<Result<(), MotionError>>>,
}

impl<T, L, F, R, E> AutomationScheduler<T, L, F, R, E>
where
    T: TemperatureSource,
    L: LightSource,
    F: ForecastProvider,
    R: RelaySwitch + 'static,
    E: EventLog + 'static,
{
    #[must_use]
    pub fn new(
        ports: SchedulerPorts<T, L, F, R, E>,
        coordinator: Arc<MotionCoordinator>,
        settings: SharedSettings,
        channels: DeviceChannels,
        period: Duration,
    ) -> Self {
        let SchedulerPorts {
            temperature,
            light,
            forecast,
            relay,
            events,
        } = ports;
        Self {
            heating: HeatingRule::new(
                temperature,
                Arc::clone(&relay),
                Arc::clone(&events),
                channels.heater,
                settings.clone(),
            ),
            occupancy: Arc::new(OccupancyRule::new(
                relay,
                Arc::clone(&events),
                channels.devices,
                settings.clone(),
            )),
            coverings: CoveringRule::new(light, forecast, settings),
            coordinator,
            events,
            period,
            motion: None,
        }
    }

    /// The occupancy rule shared with the presence listener.
    #[must_use]
    pub fn occupancy(&self) -> Arc<OccupancyRule<R, E>> {
        Arc::clone(&self.occupancy)
    }

    /// Start the task that feeds presence edges into the occupancy rule.
    pub fn spawn_presence_listener(&self, receiver: PresenceReceiver) -> JoinHandle<()> {
        tokio::spawn(occupancy::listen(self.occupancy(), receiver))
    }

    /// Whether a covering move dispatched by this scheduler is still running.
    #[must_use]
    pub fn motion_in_progress(&self) -> bool {
        self.motion.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Run every rule once for local `hour`.
    ///
    /// # Errors
    ///
    /// Returns the [`MotionError`] of a previously dispatched move that
    /// failed; the fleet can no longer be trusted to stay idle.
    pub async fn run_cycle(&mut self, hour: u32) -> Result<CycleReport, MotionError> {
        self.reap_motion().await?;

        let heating = self.heating.evaluate().await;
        let occupancy = self.occupancy.on_cycle().await;
        let coverings = if self.motion_in_progress() {
            CoveringOutcome::MotionInProgress
        } else {
            let average = self.coordinator.registry().average_position();
            match self.coverings.evaluate(hour, average).await {
                CoveringOutcome::Move(command) => {
                    self.dispatch(command.clone());
                    CoveringOutcome::Move(command)
                }
                other => other,
            }
        };

        Ok(CycleReport {
            heating,
            occupancy,
            coverings,
        })
    }

    /// Block until the in-flight covering move, if any, has finished.
    ///
    /// # Errors
    ///
    /// Returns the move's [`MotionError`].
    pub async fn wait_for_motion(&mut self) -> Result<(), MotionError> {
        match self.motion.take() {
            Some(job) => join_motion(job).await,
            None => Ok(()),
        }
    }

    /// Run cycles every period until `shutdown` flips to `true`.
    ///
    /// The first cycle runs immediately. An in-flight move is aborted on
    /// shutdown; the watchdogs zero the outputs on their own.
    ///
    /// # Errors
    ///
    /// Returns a [`MotionError`] from a failed covering move.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), MotionError> {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_secs = self.period.as_secs(), "automation scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_cycle(local_hour()).await?;
                    tracing::debug!(?report, "cycle complete");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if let Some(job) = self.motion.take() {
            job.abort();
            tracing::debug!("in-flight covering move aborted");
        }
        tracing::info!("automation scheduler stopped");
        Ok(())
    }

    async fn reap_motion(&mut self) -> Result<(), MotionError> {
        match self.motion.take() {
            Some(job) if job.is_finished() => join_motion(job).await,
            pending => {
                self.motion = pending;
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, command: CoveringCommand) {
        tracing::info!(
            target_position = %command.target,
            trigger = %command.trigger,
            "moving all coverings"
        );
        let coordinator = Arc::clone(&self.coordinator);
        let events = Arc::clone(&self.events);
        self.motion = Some(tokio::spawn(async move {
            coordinator.move_all(command.target).await?;
            record_or_warn(
                events.as_ref(),
                EventRecord::automated(
                    command.trigger,
                    Some(command.trigger_detail),
                    ResponseCode::CoveringsState,
                    format!("{}, {}", CoveringTarget::All, command.target),
                ),
            )
            .await;
            Ok(())
        }));
    }
}

async fn join_motion(job: JoinHandle<Result<(), MotionError>>) -> Result<(), MotionError> {
    match job.await {
        Ok(result) => result,
        Err(err) if err.is_cancelled() => Ok(()),
        Err(err) => {
            tracing::error!(%err, "covering move panicked");
            Ok(())
        }
    }
}
