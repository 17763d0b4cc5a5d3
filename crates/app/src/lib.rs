//! # cabinhub-app
//!
//! Control core — actuator supervision, motion coordination, automation
//! rules and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PwmOutput` — one servo output channel
//!   - `TemperatureSource` / `LightSource` — sensor readings
//!   - `ForecastProvider` — today's weather summary
//!   - `RelaySwitch` — heater and auxiliary device sockets
//!   - `EventLog` — append-only trigger/response records
//! - Supervise each covering actuator with a **watchdog** that de-energizes
//!   its output after an idle timeout
//! - Serialize every covering move through the **motion coordinator** so at
//!   most one actuator is energized at a time
//! - Run the **automation scheduler** (heating, occupancy, coverings)
//! - Expose the inbound `ControlService` for user surfaces
//!
//! ## Dependency rule
//! Depends on `cabinhub-domain` only (plus `tokio` for tasks, timers and
//! synchronization). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod coordinator;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod services;
pub mod settings;
pub mod watchdog;
