//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the control core and the hardware,
//! sensors and services around it. They are defined here (in `app`) so that
//! both the core and the adapter layer can depend on them without creating
//! circular dependencies.

pub mod event_log;
pub mod forecast;
pub mod output;
pub mod relay;
pub mod sensors;

pub use event_log::{EventLog, EventLogError};
pub use forecast::{ForecastError, ForecastProvider};
pub use output::{ChannelError, PwmOutput};
pub use relay::{RelaySwitch, SwitchError};
pub use sensors::{LightSource, SensorError, TemperatureSource};
