//! Inbound use-case services.

pub mod control_service;

pub use control_service::ControlService;
