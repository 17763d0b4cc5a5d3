//! Motion coordinator — serializes covering moves across the whole fleet.
//!
//! The servos share one current-limited supply rail, so at most one may be
//! energized at a time. Every move acquires a coordinator-wide gate, waits
//! until the *entire* fleet is idle, commands one actuator and then waits
//! until that actuator's watchdog has zeroed it again. A move therefore
//! always lasts at least the idle timeout.
//!
//! Waiting is cooperative polling at a fixed interval; no watchdog state lock
//! is held across a sleep. Each wait is bounded by a generous settle timeout
//! and overrunning it is reported as [`MotionError::SettleTimeout`].

use std::sync::Arc;
use std::time::Duration;

use cabinhub_domain::error::{CabinError, NotFoundError};
use cabinhub_domain::position::Position;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::registry::ActuatorRegistry;
use crate::watchdog::ActuatorWatchdog;

/// Polling parameters for settle waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTimings {
    /// Interval between settle checks.
    pub poll_interval: Duration,
    /// Upper bound on any single settle wait.
    pub settle_timeout: Duration,
}

impl Default for MotionTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            settle_timeout: Duration::from_secs(120),
        }
    }
}

/// Errors raised while moving coverings.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    /// The command named an actuator that does not exist.
    #[error("unknown actuator")]
    UnknownActuator(#[source] NotFoundError),

    /// An actuator (or the fleet) never reported idle.
    #[error("{target} did not settle within {waited:?}")]
    SettleTimeout { target: String, waited: Duration },

    /// The fleet was shut down; the actuator refused the command.
    #[error("{actuator} is shut down")]
    ShutDown { actuator: String },
}

impl From<MotionError> for CabinError {
    fn from(err: MotionError) -> Self {
        match err {
            MotionError::UnknownActuator(not_found) => Self::NotFound(not_found),
            other => Self::Motion(Box::new(other)),
        }
    }
}

/// Gatekeeper for every covering command.
pub struct MotionCoordinator {
    registry: Arc<ActuatorRegistry>,
    gate: Mutex<()>,
    timings: MotionTimings,
}

impl MotionCoordinator {
    #[must_use]
    pub fn new(registry: Arc<ActuatorRegistry>, timings: MotionTimings) -> Self {
        Self {
            registry,
            gate: Mutex::new(()),
            timings,
        }
    }

    /// The fleet this coordinator drives.
    #[must_use]
    pub fn registry(&self) -> &ActuatorRegistry {
        &self.registry
    }

    /// Move one covering and block until it has settled.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::UnknownActuator`] before waiting when `name` is
    /// not registered, [`MotionError::SettleTimeout`] when a wait overruns,
    /// or [`MotionError::ShutDown`] once the fleet has been shut down.
    pub async fn move_one(&self, name: &str, target: Position) -> Result<(), MotionError> {
        let actuator = self
            .registry
            .require(name)
            .map_err(MotionError::UnknownActuator)?;
        let _gate = self.gate.lock().await;
        self.drive(actuator, target).await
    }

    /// Move every covering, one after another in wiring order.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::SettleTimeout`] when a wait overruns or
    /// [`MotionError::ShutDown`] once the fleet has been shut down; later
    /// actuators are not commanded.
    pub async fn move_all(&self, target: Position) -> Result<(), MotionError> {
        let _gate = self.gate.lock().await;
        tracing::debug!(%target, count = self.registry.len(), "moving all coverings");
        for actuator in self.registry.iter() {
            self.drive(actuator, target).await?;
        }
        Ok(())
    }

    async fn drive(&self, actuator: &ActuatorWatchdog, target: Position) -> Result<(), MotionError> {
        self.wait_until("fleet", || !self.registry.any_active()).await?;
        tracing::debug!(actuator = %actuator.name(), %target, "commanding covering");
        if !actuator.set_position(target) {
            return Err(MotionError::ShutDown {
                actuator: actuator.name().to_string(),
            });
        }
        self.wait_until(actuator.name(), || !actuator.is_active()).await
    }

    async fn wait_until(&self, target: &str, settled: impl Fn() -> bool) -> Result<(), MotionError> {
        let started = Instant::now();
        while !settled() {
            let waited = started.elapsed();
            if waited >= self.timings.settle_timeout {
                tracing::error!(
                    target_name = %target,
                    ?waited,
                    "actuator never settled; watchdog invariant violated"
                );
                return Err(MotionError::SettleTimeout {
                    target: target.to_string(),
                    waited,
                });
            }
            tokio::time::sleep(self.timings.poll_interval).await;
        }
        Ok(())
    }
}
