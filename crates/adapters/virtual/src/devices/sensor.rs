//! Virtual sensors — temperature and light readings set from outside.

use std::collections::HashMap;
use std::sync::Mutex;

use cabinhub_app::ports::{LightSource, SensorError, TemperatureSource};
use cabinhub_domain::device::LightChannel;

use super::lock;

/// A temperature sensor whose reading is set by the caller.
///
/// `None` simulates a failed read (e.g. a checksum mismatch).
#[derive(Debug, Default)]
pub struct VirtualTemperature {
    reading: Mutex<Option<f64>>,
}

impl VirtualTemperature {
    #[must_use]
    pub fn new(reading: Option<f64>) -> Self {
        Self {
            reading: Mutex::new(reading),
        }
    }

    pub fn set(&self, reading: Option<f64>) {
        *lock(&self.reading) = reading;
    }
}

impl TemperatureSource for VirtualTemperature {
    async fn read_temperature(&self) -> Result<f64, SensorError> {
        let reading = *lock(&self.reading);
        reading.ok_or(SensorError::Unavailable)
    }
}

/// A light sensor with one settable level per channel.
///
/// Channels never set are reported as unsupported.
#[derive(Debug, Default)]
pub struct VirtualLight {
    levels: Mutex<HashMap<LightChannel, f64>>,
}

impl VirtualLight {
    /// Sensor reporting `level` on the full-spectrum channel.
    #[must_use]
    pub fn full_spectrum(level: f64) -> Self {
        let light = Self::default();
        light.set(LightChannel::FullSpectrum, level);
        light
    }

    pub fn set(&self, channel: LightChannel, level: f64) {
        lock(&self.levels).insert(channel, level);
    }
}

impl LightSource for VirtualLight {
    async fn read_light(&self, channel: LightChannel) -> Result<f64, SensorError> {
        let level = lock(&self.levels).get(&channel).copied();
        level.ok_or(SensorError::UnsupportedChannel(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_return_set_temperature() {
        let sensor = VirtualTemperature::new(Some(19.5));
        assert!((sensor.read_temperature().await.unwrap() - 19.5).abs() < f64::EPSILON);

        sensor.set(Some(21.0));
        assert!((sensor.read_temperature().await.unwrap() - 21.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_fail_read_without_temperature() {
        let sensor = VirtualTemperature::new(None);
        assert!(matches!(
            sensor.read_temperature().await,
            Err(SensorError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn should_return_full_spectrum_level() {
        let light = VirtualLight::full_spectrum(800_000.0);
        let level = light.read_light(LightChannel::FullSpectrum).await.unwrap();
        assert!((level - 800_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_reject_unset_channel() {
        let light = VirtualLight::full_spectrum(800_000.0);
        assert!(matches!(
            light.read_light(LightChannel::Infrared).await,
            Err(SensorError::UnsupportedChannel(LightChannel::Infrared))
        ));
    }
}
