//! # cabinhub-adapter-virtual
//!
//! Simulated implementations of every port, used by the daemon when no real
//! hardware is configured and by integration tests.
//!
//! ## Provided devices
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`SimulatedOutput`] | `PwmOutput` | Remembers and logs the last duty cycle |
//! | [`VirtualTemperature`] | `TemperatureSource` | Returns a settable reading |
//! | [`VirtualLight`] | `LightSource` | Returns settable per-channel levels |
//! | [`VirtualForecast`] | `ForecastProvider` | Returns a fixed forecast, or not configured |
//! | [`VirtualRelay`] | `RelaySwitch` | Tracks on/off per paired channel |
//! | [`MemoryEventLog`] | `EventLog` | Keeps the latest records and logs each one |
//!
//! ## Dependency rule
//!
//! Depends on `cabinhub-app` (port traits) and `cabinhub-domain` only.

mod devices;
mod event_log;

pub use devices::{SimulatedOutput, VirtualForecast, VirtualLight, VirtualRelay, VirtualTemperature};
pub use event_log::MemoryEventLog;
