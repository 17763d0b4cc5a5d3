//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`CabinError`]
//! via `#[from]` when it crosses a port boundary.

/// Top-level error for cabinhub operations.
#[derive(Debug, thiserror::Error)]
pub enum CabinError {
    /// Input rejected at the boundary.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A named thing does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An actuator did not settle, or another motion invariant broke.
    #[error("motion error")]
    Motion(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A hardware channel, relay or sensor failed.
    #[error("hardware error")]
    Hardware(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invalid input rejected before it reaches the control core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Covering position outside the mechanical range.
    #[error("position {value} is outside {min}..={max}")]
    PositionOutOfRange { value: i64, min: u8, max: u8 },

    /// Desired temperature would leave the allowed band.
    #[error("desired temperature {value} is outside the allowed bounds")]
    DesiredTemperatureOutOfBounds { value: f64 },

    /// Unrecognised heating mode string.
    #[error("unknown heating mode '{0}'")]
    UnknownHeatingMode(String),

    /// Unrecognised light channel string.
    #[error("unknown light channel '{0}'")]
    UnknownLightChannel(String),

    /// Actuator name is empty.
    #[error("actuator name must not be empty")]
    EmptyName,

    /// Two actuators share the same name.
    #[error("actuator '{0}' is declared more than once")]
    DuplicateActuator(String),

    /// The actuator fleet is empty.
    #[error("at least one actuator is required")]
    EmptyFleet,
}

/// A lookup by name or channel found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
