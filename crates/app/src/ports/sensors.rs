//! Sensor ports — temperature and light readings.

use std::future::Future;

use cabinhub_domain::device::LightChannel;
use cabinhub_domain::error::CabinError;

/// Source of the cabin's air temperature, in °C.
pub trait TemperatureSource: Send + Sync {
    /// Take one reading.
    ///
    /// Failures are transient: callers skip the current cycle.
    fn read_temperature(&self) -> impl Future<Output = Result<f64, SensorError>> + Send;
}

/// Source of ambient light levels.
pub trait LightSource: Send + Sync {
    /// Read one measurement channel.
    fn read_light(
        &self,
        channel: LightChannel,
    ) -> impl Future<Output = Result<f64, SensorError>> + Send;
}

/// A sensor could not produce a reading.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// No reading is available right now (e.g. checksum mismatch).
    #[error("sensor reading unavailable")]
    Unavailable,

    /// The sensor does not expose the requested channel.
    #[error("sensor does not provide {0}")]
    UnsupportedChannel(LightChannel),

    /// Reading the device failed.
    #[error("sensor I/O failed")]
    Io(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<SensorError> for CabinError {
    fn from(err: SensorError) -> Self {
        Self::Hardware(Box::new(err))
    }
}
