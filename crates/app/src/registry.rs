//! Actuator registry — the fixed, ordered fleet of covering watchdogs.
//!
//! Order is the physical wiring order and is the order in which fleet-wide
//! moves are executed. The registry has no lock of its own: every read is a
//! snapshot of one watchdog, and commands are serialized by the
//! [`MotionCoordinator`](crate::coordinator::MotionCoordinator).

use std::collections::HashSet;

use cabinhub_domain::error::{NotFoundError, ValidationError};
use cabinhub_domain::position::Position;

use crate::watchdog::{ActuatorSnapshot, ActuatorWatchdog};

/// Named collection of every actuator watchdog.
pub struct ActuatorRegistry {
    actuators: Vec<ActuatorWatchdog>,
}

impl ActuatorRegistry {
    /// Build the registry from watchdogs in wiring order.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the fleet is empty, a name is empty,
    /// or a name appears twice.
    pub fn new(actuators: Vec<ActuatorWatchdog>) -> Result<Self, ValidationError> {
        if actuators.is_empty() {
            return Err(ValidationError::EmptyFleet);
        }
        let mut seen = HashSet::new();
        for actuator in &actuators {
            if actuator.name().trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if !seen.insert(actuator.name()) {
                return Err(ValidationError::DuplicateActuator(actuator.name().to_string()));
            }
        }
        Ok(Self { actuators })
    }

    /// Look up an actuator by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActuatorWatchdog> {
        self.actuators.iter().find(|a| a.name() == name)
    }

    /// Look up an actuator by name, as an error when missing.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown name.
    pub fn require(&self, name: &str) -> Result<&ActuatorWatchdog, NotFoundError> {
        self.get(name).ok_or_else(|| NotFoundError {
            entity: "Actuator",
            id: name.to_string(),
        })
    }

    /// Snapshot of one actuator.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> Option<ActuatorSnapshot> {
        self.get(name).map(ActuatorWatchdog::snapshot)
    }

    /// Actuators in wiring order.
    pub fn iter(&self) -> impl Iterator<Item = &ActuatorWatchdog> {
        self.actuators.iter()
    }

    /// Names in wiring order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actuators.iter().map(ActuatorWatchdog::name)
    }

    /// `(name, position)` pairs in wiring order.
    #[must_use]
    pub fn positions(&self) -> Vec<(String, Position)> {
        self.actuators
            .iter()
            .map(|a| (a.name().to_string(), a.position()))
            .collect()
    }

    /// Arithmetic mean of every commanded position.
    #[must_use]
    pub fn average_position(&self) -> f64 {
        let total: f64 = self
            .actuators
            .iter()
            .map(|a| f64::from(a.position().value()))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.actuators.len() as f64;
        total / count
    }

    /// Whether any actuator's output is energized.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.actuators.iter().any(ActuatorWatchdog::is_active)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actuators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actuators.is_empty()
    }

    /// Zero every output and stop every watchdog.
    pub fn shutdown(&self) {
        for actuator in &self.actuators {
            actuator.shutdown();
        }
        tracing::info!(count = self.actuators.len(), "all actuators shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchdog::WatchdogTimings;
    use crate::watchdog::tests::RecordingOutput;

    fn fleet(output: &RecordingOutput, names: &[&str]) -> Vec<ActuatorWatchdog> {
        names
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
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_wiring_order() {
        let output = RecordingOutput::default();
        let registry =
            ActuatorRegistry::new(fleet(&output, &["left", "leftdoor", "rightdoor", "right"]))
                .unwrap();

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["left", "leftdoor", "rightdoor", "right"]);
        assert_eq!(registry.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_duplicate_names() {
        let output = RecordingOutput::default();
        let result = ActuatorRegistry::new(fleet(&output, &["left", "left"]));
        assert!(matches!(result, Err(ValidationError::DuplicateActuator(name)) if name == "left"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_empty_name() {
        let output = RecordingOutput::default();
        let result = ActuatorRegistry::new(fleet(&output, &["left", " "]));
        assert!(matches!(result, Err(ValidationError::EmptyName)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_empty_fleet() {
        assert!(matches!(
            ActuatorRegistry::new(Vec::new()),
            Err(ValidationError::EmptyFleet)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_average_positions() {
        let output = RecordingOutput::default();
        let registry =
            ActuatorRegistry::new(fleet(&output, &["left", "leftdoor", "rightdoor", "right"]))
                .unwrap();
        assert!((registry.average_position() - 10.0).abs() < f64::EPSILON);

        assert!(registry.get("left").unwrap().set_position(Position::CLOSED));
        assert!(registry.get("right").unwrap().set_position(Position::CLOSED));
        assert!((registry.average_position() - 15.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_any_active() {
        let output = RecordingOutput::default();
        let registry = ActuatorRegistry::new(fleet(&output, &["left", "right"])).unwrap();
        assert!(!registry.any_active());

        assert!(registry.get("right").unwrap().set_position(Position::CLOSED));
        assert!(registry.any_active());
        assert!(registry.snapshot("right").unwrap().active);
        assert!(!registry.snapshot("left").unwrap().active);
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_missing_actuator() {
        let output = RecordingOutput::default();
        let registry = ActuatorRegistry::new(fleet(&output, &["left"])).unwrap();

        assert!(registry.get("porch").is_none());
        let err = registry.require("porch").err().unwrap();
        assert_eq!(err.id, "porch");
    }

    #[tokio::test(start_paused = true)]
    async fn should_list_positions_in_order() {
        let output = RecordingOutput::default();
        let registry = ActuatorRegistry::new(fleet(&output, &["left", "right"])).unwrap();
        assert!(registry.get("right").unwrap().set_position(Position::CLOSED));

        assert_eq!(
            registry.positions(),
            vec![
                ("left".to_string(), Position::OPEN),
                ("right".to_string(), Position::CLOSED),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_shut_down_every_actuator() {
        let output = RecordingOutput::default();
        let registry = ActuatorRegistry::new(fleet(&output, &["left", "right"])).unwrap();
        assert!(registry.get("left").unwrap().set_position(Position::CLOSED));

        registry.shutdown();

        assert!(!registry.any_active());
        assert_eq!(output.last_duty(0), Some(cabinhub_domain::position::DutyCycle::ZERO));
    }
}
