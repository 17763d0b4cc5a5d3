//! Virtual device implementations — outputs, sensors, forecast, relay.

mod forecast;
mod output;
mod relay;
mod sensor;

pub use forecast::VirtualForecast;
pub use output::SimulatedOutput;
pub use relay::VirtualRelay;
pub use sensor::{VirtualLight, VirtualTemperature};

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
