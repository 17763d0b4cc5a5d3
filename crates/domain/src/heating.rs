//! Heating — modes, desired-temperature adjustments and the hysteresis band.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How the heater is driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingMode {
    /// The scheduler keeps the temperature inside the hysteresis band.
    Auto,
    /// The heater only changes on explicit commands.
    Manual,
    /// Heating disabled; the heater is forced off when this mode is set.
    #[default]
    Off,
}

impl HeatingMode {
    /// Whether the heating rule should run.
    #[must_use]
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Auto)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for HeatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeatingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::UnknownHeatingMode(other.to_string())),
        }
    }
}

/// Upper and lower switching thresholds around a desired temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisBand {
    pub lower: f64,
    pub upper: f64,
}

/// What the heating rule wants to do with the heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterDecision {
    /// Reading fell below the lower bound while the heater was off.
    SwitchOn,
    /// Reading rose above the upper bound while the heater was on.
    SwitchOff,
    /// Inside the band, or already in the right state.
    Hold,
}

impl HysteresisBand {
    /// Build the band `desired ± margin`.
    #[must_use]
    pub fn around(desired: f64, margin: f64) -> Self {
        Self {
            lower: desired - margin,
            upper: desired + margin,
        }
    }

    /// Decide what to do given the current heater state and a reading.
    #[must_use]
    pub fn decide(&self, heater_on: bool, reading: f64) -> HeaterDecision {
        if heater_on && reading > self.upper {
            HeaterDecision::SwitchOff
        } else if !heater_on && reading < self.lower {
            HeaterDecision::SwitchOn
        } else {
            HeaterDecision::Hold
        }
    }
}

/// Snapshot of the heating subsystem, as reported to the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatingStatus {
    /// Latest sensor reading; `None` when the sensor could not be read.
    pub current_temp: Option<f64>,
    pub desired_temp: f64,
    pub mode: HeatingMode,
    pub heater_on: bool,
}

/// A requested change to the desired temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "desired_temp", rename_all = "snake_case")]
pub enum TemperatureAdjustment {
    /// Raise by one step.
    Increase,
    /// Lower by one step.
    Decrease,
    /// Jump to an absolute value.
    Set(f64),
}

/// Limits applied to desired-temperature changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesiredTemperatureLimits {
    /// Desired temperature may not be lowered past this value.
    pub lower: f64,
    /// Desired temperature may not be raised past this value.
    pub upper: f64,
    /// Increment used by increase/decrease.
    pub step: f64,
}

impl Default for DesiredTemperatureLimits {
    fn default() -> Self {
        Self {
            lower: 15.0,
            upper: 30.0,
            step: 0.5,
        }
    }
}

impl DesiredTemperatureLimits {
    /// Apply an adjustment to `current`, returning the new desired value.
    ///
    /// Increase is allowed while `current < upper`, decrease while
    /// `current > lower`; an absolute value must lie strictly between the
    /// bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DesiredTemperatureOutOfBounds`] when the
    /// adjustment is not allowed.
    pub fn apply(&self, current: f64, adjustment: TemperatureAdjustment) -> Result<f64, ValidationError> {
        match adjustment {
            TemperatureAdjustment::Increase if current < self.upper => Ok(current + self.step),
            TemperatureAdjustment::Increase => Err(ValidationError::DesiredTemperatureOutOfBounds {
                value: current + self.step,
            }),
            TemperatureAdjustment::Decrease if current > self.lower => Ok(current - self.step),
            TemperatureAdjustment::Decrease => Err(ValidationError::DesiredTemperatureOutOfBounds {
                value: current - self.step,
            }),
            TemperatureAdjustment::Set(value) if self.lower < value && value < self.upper => Ok(value),
            TemperatureAdjustment::Set(value) => {
                Err(ValidationError::DesiredTemperatureOutOfBounds { value })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> HysteresisBand {
        HysteresisBand::around(20.0, 0.5)
    }

    #[test]
    fn should_build_band_around_desired() {
        let band = band();
        assert!((band.lower - 19.5).abs() < f64::EPSILON);
        assert!((band.upper - 20.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_switch_off_when_on_and_above_upper() {
        assert_eq!(band().decide(true, 20.6), HeaterDecision::SwitchOff);
    }

    #[test]
    fn should_switch_on_when_off_and_below_lower() {
        assert_eq!(band().decide(false, 19.4), HeaterDecision::SwitchOn);
    }

    #[test]
    fn should_hold_inside_band() {
        assert_eq!(band().decide(false, 20.0), HeaterDecision::Hold);
        assert_eq!(band().decide(true, 20.0), HeaterDecision::Hold);
    }

    #[test]
    fn should_hold_when_already_in_target_state() {
        assert_eq!(band().decide(true, 18.0), HeaterDecision::Hold);
        assert_eq!(band().decide(false, 23.0), HeaterDecision::Hold);
    }

    #[test]
    fn should_hold_exactly_on_bounds() {
        assert_eq!(band().decide(true, 20.5), HeaterDecision::Hold);
        assert_eq!(band().decide(false, 19.5), HeaterDecision::Hold);
    }

    #[test]
    fn should_parse_heating_modes() {
        assert_eq!("auto".parse::<HeatingMode>().unwrap(), HeatingMode::Auto);
        assert_eq!("manual".parse::<HeatingMode>().unwrap(), HeatingMode::Manual);
        assert_eq!("off".parse::<HeatingMode>().unwrap(), HeatingMode::Off);
    }

    #[test]
    fn should_reject_malformed_heating_mode() {
        assert_eq!(
            "boost".parse::<HeatingMode>(),
            Err(ValidationError::UnknownHeatingMode("boost".to_string()))
        );
    }

    #[test]
    fn should_round_trip_mode_display() {
        for mode in [HeatingMode::Auto, HeatingMode::Manual, HeatingMode::Off] {
            assert_eq!(mode.to_string().parse::<HeatingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn should_increase_by_one_step() {
        let limits = DesiredTemperatureLimits::default();
        let next = limits.apply(20.0, TemperatureAdjustment::Increase).unwrap();
        assert!((next - 20.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_refuse_increase_at_upper_bound() {
        let limits = DesiredTemperatureLimits::default();
        assert!(limits.apply(30.0, TemperatureAdjustment::Increase).is_err());
    }

    #[test]
    fn should_refuse_decrease_at_lower_bound() {
        let limits = DesiredTemperatureLimits::default();
        assert!(limits.apply(15.0, TemperatureAdjustment::Decrease).is_err());
        assert!(limits.apply(15.5, TemperatureAdjustment::Decrease).is_ok());
    }

    #[test]
    fn should_accept_absolute_value_strictly_inside_bounds() {
        let limits = DesiredTemperatureLimits::default();
        assert!(limits.apply(20.0, TemperatureAdjustment::Set(22.0)).is_ok());
        assert!(limits.apply(20.0, TemperatureAdjustment::Set(30.0)).is_err());
        assert!(limits.apply(20.0, TemperatureAdjustment::Set(15.0)).is_err());
    }
}
