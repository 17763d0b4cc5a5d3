//! Automation settings — the mutable knobs the rules read every cycle.
//!
//! One value of [`AutomationSettings`] is shared between the scheduler and
//! the control service; rules never keep state of their own beyond it.

use serde::{Deserialize, Serialize};

use crate::forecast::{DailyForecast, Location};
use crate::heating::{DesiredTemperatureLimits, HeatingMode, HysteresisBand};

/// Every setting the automation rules consult.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    pub heating: HeatingSettings,
    pub presence: PresenceSettings,
    pub coverings: CoveringSettings,
}

/// Heating rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatingSettings {
    /// Temperature to maintain, in °C.
    pub desired_temp: f64,
    /// Half-width of the hysteresis band.
    pub margin: f64,
    pub mode: HeatingMode,
    pub limits: DesiredTemperatureLimits,
}

impl Default for HeatingSettings {
    fn default() -> Self {
        Self {
            desired_temp: 20.0,
            margin: 0.5,
            mode: HeatingMode::Off,
            limits: DesiredTemperatureLimits::default(),
        }
    }
}

impl HeatingSettings {
    /// Band derived from the current desired temperature.
    #[must_use]
    pub fn band(&self) -> HysteresisBand {
        HysteresisBand::around(self.desired_temp, self.margin)
    }
}

/// Occupancy rule settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceSettings {
    pub enabled: bool,
    /// Cycles without presence before the devices switch off.
    pub timeout_cycles: u32,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_cycles: 30,
        }
    }
}

/// Half-open window of local hours, `start <= hour < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    #[must_use]
    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }
}

/// Which covering sub-rule applies right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoveringWindow {
    /// Coverings mostly open during the morning window: consult the forecast.
    Morning,
    /// Coverings mostly closed during the evening window: consult the light.
    Evening,
}

/// Covering rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveringSettings {
    pub enabled: bool,
    pub location: Location,
    pub morning: HourWindow,
    pub evening: HourWindow,
    /// Fleet average below which the coverings count as open.
    pub open_below: f64,
    /// Fleet average above which the coverings count as closed.
    pub closed_above: f64,
    /// Close in the morning only when cloud cover is below this fraction.
    pub cloud_cover_threshold: f64,
    /// Close in the morning only when the forecast high exceeds this.
    pub temperature_threshold: f64,
    /// Open in the evening once full-spectrum light drops below this.
    pub light_threshold: f64,
}

impl Default for CoveringSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            location: Location::default(),
            morning: HourWindow { start: 7, end: 8 },
            evening: HourWindow { start: 17, end: 22 },
            open_below: 15.5,
            closed_above: 14.5,
            cloud_cover_threshold: 0.5,
            temperature_threshold: 20.0,
            light_threshold: 1_200_000.0,
        }
    }
}

impl CoveringSettings {
    /// Pick the sub-rule for this hour and fleet average, if any.
    ///
    /// The average check keeps the rule from re-issuing the same move every
    /// cycle once the fleet already reflects the target.
    #[must_use]
    pub fn window_for(&self, hour: u32, average_position: f64) -> Option<CoveringWindow> {
        if self.morning.contains(hour) && average_position < self.open_below {
            Some(CoveringWindow::Morning)
        } else if self.evening.contains(hour) && average_position > self.closed_above {
            Some(CoveringWindow::Evening)
        } else {
            None
        }
    }

    /// Whether a sunny, hot forecast calls for closing the coverings.
    #[must_use]
    pub fn should_close_for(&self, forecast: &DailyForecast) -> bool {
        forecast.cloud_cover < self.cloud_cover_threshold
            && forecast.high_temp > self.temperature_threshold
    }

    /// Whether the evening light level calls for opening the coverings.
    #[must_use]
    pub fn should_open_for(&self, light_level: f64) -> bool {
        light_level < self.light_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_observed_constants() {
        let settings = AutomationSettings::default();
        assert!((settings.heating.desired_temp - 20.0).abs() < f64::EPSILON);
        assert_eq!(settings.heating.mode, HeatingMode::Off);
        assert_eq!(settings.presence.timeout_cycles, 30);
        assert!(settings.coverings.enabled);
    }

    #[test]
    fn should_select_morning_window_when_open() {
        let settings = CoveringSettings::default();
        assert_eq!(settings.window_for(7, 10.0), Some(CoveringWindow::Morning));
        assert_eq!(settings.window_for(7, 20.0), None);
        assert_eq!(settings.window_for(8, 10.0), None);
    }

    #[test]
    fn should_select_evening_window_when_closed() {
        let settings = CoveringSettings::default();
        assert_eq!(settings.window_for(17, 20.0), Some(CoveringWindow::Evening));
        assert_eq!(settings.window_for(21, 15.0), Some(CoveringWindow::Evening));
        assert_eq!(settings.window_for(22, 20.0), None);
        assert_eq!(settings.window_for(18, 10.0), None);
    }

    #[test]
    fn should_ignore_other_hours() {
        let settings = CoveringSettings::default();
        for hour in [0, 6, 8, 12, 16, 22, 23] {
            assert_eq!(settings.window_for(hour, 10.0), None);
            assert_eq!(settings.window_for(hour, 20.0), None);
        }
    }

    #[test]
    fn should_close_for_clear_hot_forecast() {
        let settings = CoveringSettings::default();
        let forecast = DailyForecast {
            cloud_cover: 0.3,
            high_temp: 25.0,
        };
        assert!(settings.should_close_for(&forecast));
    }

    #[test]
    fn should_not_close_for_cloudy_or_cool_forecast() {
        let settings = CoveringSettings::default();
        assert!(!settings.should_close_for(&DailyForecast {
            cloud_cover: 0.7,
            high_temp: 25.0,
        }));
        assert!(!settings.should_close_for(&DailyForecast {
            cloud_cover: 0.3,
            high_temp: 20.0,
        }));
    }

    #[test]
    fn should_open_when_light_drops() {
        let settings = CoveringSettings::default();
        assert!(settings.should_open_for(50.0));
        assert!(!settings.should_open_for(1_500_000.0));
    }

    #[test]
    fn should_derive_band_from_heating_settings() {
        let heating = HeatingSettings::default();
        let band = heating.band();
        assert!((band.upper - 20.5).abs() < f64::EPSILON);
    }
}
