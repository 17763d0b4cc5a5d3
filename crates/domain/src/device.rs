//! Device addressing — relay channels for binary devices and light-sensor
//! measurement channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Radio socket number a binary device is paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelayChannel(pub u8);

impl fmt::Display for RelayChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket {}", self.0)
    }
}

/// Measurement exposed by the light sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightChannel {
    Lux,
    Visible,
    Infrared,
    #[default]
    FullSpectrum,
    RawLuminosity,
}

impl LightChannel {
    /// Every channel the sensor exposes.
    pub const ALL: [Self; 5] = [
        Self::Lux,
        Self::Visible,
        Self::Infrared,
        Self::FullSpectrum,
        Self::RawLuminosity,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Lux => "lux",
            Self::Visible => "visible",
            Self::Infrared => "infrared",
            Self::FullSpectrum => "full_spectrum",
            Self::RawLuminosity => "raw_luminosity",
        }
    }
}

impl fmt::Display for LightChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightChannel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownLightChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_every_light_channel() {
        for channel in LightChannel::ALL {
            assert_eq!(channel.to_string().parse::<LightChannel>().unwrap(), channel);
        }
    }

    #[test]
    fn should_reject_unknown_light_channel() {
        assert!("ultraviolet".parse::<LightChannel>().is_err());
    }

    #[test]
    fn should_display_relay_channel() {
        assert_eq!(RelayChannel(2).to_string(), "socket 2");
    }
}
