//! # cabinhub-domain
//!
//! Pure domain model for the cabinhub cabin automation system.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - **Positions** and the servo duty cycle derived from them
//! - **Heating**: modes, hysteresis band, desired-temperature limits
//! - **Devices**: relay channels, light-sensor channels
//! - **Events**: trigger/response records for the event log
//! - **Settings**: the mutable knobs every automation rule reads
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod event;
pub mod forecast;
pub mod heating;
pub mod position;
pub mod settings;
