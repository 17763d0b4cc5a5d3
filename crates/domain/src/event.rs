//! Event — an immutable record of something the system reacted to.
//!
//! Every automated action and every accepted control command produces one
//! record: what triggered it, how the system responded and whether the
//! response came from an automation rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, now};

/// What caused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerCode {
    /// Temperature rose above the upper band.
    TemperatureAbove,
    /// Temperature fell below the lower band.
    TemperatureBelow,
    /// Presence timed out.
    PresenceTimeout,
    /// Presence detected.
    PresenceDetected,
    /// Morning covering rule fired.
    CoveringsMorning,
    /// Evening covering rule fired.
    CoveringsEvening,
    /// Desired temperature changed by a command.
    CommandDesiredTemperature,
    /// Heating mode changed by a command.
    CommandHeatingMode,
    /// Heater switched by a command.
    CommandHeatingStatus,
    /// Covering position changed by a command.
    CommandCoveringPosition,
}

impl TriggerCode {
    /// Seven-letter code stored in the event log.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::TemperatureAbove => "TEMPABV",
            Self::TemperatureBelow => "TEMPBEL",
            Self::PresenceTimeout => "PRESTMO",
            Self::PresenceDetected => "PRESDEC",
            Self::CoveringsMorning => "BLNDMOR",
            Self::CoveringsEvening => "BLNDEVE",
            Self::CommandDesiredTemperature => "APIDETM",
            Self::CommandHeatingMode => "APIHEMO",
            Self::CommandHeatingStatus => "APIHEST",
            Self::CommandCoveringPosition => "APIBDST",
        }
    }
}

impl fmt::Display for TriggerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What the system did in response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCode {
    /// Heater switched.
    HeatingState,
    /// Auxiliary devices switched.
    DevicesState,
    /// Coverings moved.
    CoveringsState,
    /// Desired temperature stored.
    HeatingDesired,
    /// Heating mode stored.
    HeatingMode,
}

impl ResponseCode {
    /// Seven-letter code stored in the event log.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::HeatingState => "HEATSTA",
            Self::DevicesState => "DEVISTA",
            Self::CoveringsState => "BLNDSTA",
            Self::HeatingDesired => "HEATDES",
            Self::HeatingMode => "HEATMOD",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single event-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub trigger: TriggerCode,
    pub trigger_detail: Option<String>,
    pub response: ResponseCode,
    pub response_detail: String,
    /// `true` when an automation rule produced the response.
    pub automated: bool,
    pub recorded_at: Timestamp,
}

impl EventRecord {
    /// Record produced by an automation rule.
    #[must_use]
    pub fn automated(
        trigger: TriggerCode,
        trigger_detail: Option<String>,
        response: ResponseCode,
        response_detail: impl Into<String>,
    ) -> Self {
        Self {
            trigger,
            trigger_detail,
            response,
            response_detail: response_detail.into(),
            automated: true,
            recorded_at: now(),
        }
    }

    /// Record produced by an explicit command.
    #[must_use]
    pub fn commanded(
        trigger: TriggerCode,
        trigger_detail: impl Into<String>,
        response: ResponseCode,
        response_detail: impl Into<String>,
    ) -> Self {
        Self {
            trigger,
            trigger_detail: Some(trigger_detail.into()),
            response,
            response_detail: response_detail.into(),
            automated: false,
            recorded_at: now(),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) -> {}({})",
            self.trigger,
            self.trigger_detail.as_deref().unwrap_or("-"),
            self.response,
            self.response_detail
        )
    }
}
