//! Forecast data consumed by the covering rule.

use serde::{Deserialize, Serialize};

/// Geographic position of the cabin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 51.456_857,
            longitude: -1.053_791,
        }
    }
}

/// Today's forecast summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Fraction of the sky covered, `0.0..=1.0`.
    pub cloud_cover: f64,
    /// Forecast daily high, in °C.
    pub high_temp: f64,
}
