//! # cabinhubd — cabinhub daemon
//!
//! Composition root that wires the actuator fleet, automation rules and
//! adapters together and runs until told to stop.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialize logging
//! - Open one output per covering with the configured driver and spawn its
//!   watchdog
//! - Bring the cabin into a known state: heater and devices off, coverings
//!   closed
//! - Run the automation scheduler and the presence listener
//! - Forward `SIGUSR1` as a presence edge and `SIGUSR2` as a status dump
//! - Handle graceful shutdown (SIGTERM/SIGINT): stop the scheduler and
//!   de-energize every output
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use cabinhub_adapter_pwm_sysfs::SysfsPwm;
use cabinhub_adapter_virtual::{
    MemoryEventLog, SimulatedOutput, VirtualForecast, VirtualLight, VirtualRelay,
    VirtualTemperature,
};
use cabinhub_app::coordinator::MotionCoordinator;
use cabinhub_app::ports::{EventLog, PwmOutput, RelaySwitch, TemperatureSource};
use cabinhub_app::registry::ActuatorRegistry;
use cabinhub_app::scheduler::{
    AutomationScheduler, PresenceSender, SchedulerPorts, presence_channel,
};
use cabinhub_app::services::ControlService;
use cabinhub_app::settings::SharedSettings;
use cabinhub_app::watchdog::ActuatorWatchdog;
use cabinhub_domain::position::Position;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Driver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();
    tracing::info!(driver = %config.actuators.driver, "cabinhubd starting");

    // Actuators
    let registry = Arc::new(build_registry(&config)?);
    let coordinator = Arc::new(MotionCoordinator::new(
        Arc::clone(&registry),
        config.actuators.motion_timings(),
    ));

    // Sensors, relay and event log
    let channels = config.device_channels();
    let settings = SharedSettings::new(config.automation_settings());
    let temperature = Arc::new(VirtualTemperature::new(config.simulation.temperature));
    let light = Arc::new(VirtualLight::full_spectrum(config.simulation.light));
    let forecast = Arc::new(VirtualForecast::new(config.simulation.forecast));
    let relay = Arc::new(VirtualRelay::new([channels.heater, channels.devices]));
    let events = Arc::new(MemoryEventLog::new(config.logging.event_log_capacity));

    let control = ControlService::new(
        Arc::clone(&temperature),
        Arc::clone(&relay),
        Arc::clone(&events),
        Arc::clone(&coordinator),
        settings.clone(),
        channels,
    );

    // Known starting state
    relay.switch(channels.heater, false).await?;
    relay.switch(channels.devices, false).await?;
    tracing::info!(count = registry.len(), "closing all coverings");
    tokio::select! {
        result = coordinator.move_all(Position::CLOSED) => result?,
        () = shutdown_signal() => {
            tracing::warn!("shutdown requested during startup");
            registry.shutdown();
            return Ok(());
        }
    }

    // Automation
    let scheduler = AutomationScheduler::new(
        SchedulerPorts {
            temperature,
            light,
            forecast,
            relay,
            events,
        },
        Arc::clone(&coordinator),
        settings,
        channels,
        config.scheduler.period(),
    );
    let (presence, presence_rx) = presence_channel(8);
    let presence_task = scheduler.spawn_presence_listener(presence_rx);
    let signals_task = tokio::spawn(forward_signals(presence, control));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    let scheduler_result = tokio::select! {
        () = shutdown_signal() => {
            tracing::warn!("shutdown requested, stopping scheduler");
            let _ = shutdown_tx.send(true);
            scheduler_task.await
        }
        result = &mut scheduler_task => result,
    };
    let failure = match scheduler_result {
        Ok(Ok(())) => None,
        Ok(Err(err)) => {
            tracing::error!(%err, "scheduler failed");
            Some(err)
        }
        Err(err) => {
            tracing::error!(%err, "scheduler task panicked");
            None
        }
    };

    tracing::warn!("de-energizing all outputs");
    signals_task.abort();
    presence_task.abort();
    registry.shutdown();

    tracing::info!("cabinhubd stopped");
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Open every configured output and spawn its watchdog, in wiring order.
fn build_registry(config: &Config) -> Result<ActuatorRegistry, Box<dyn std::error::Error>> {
    let timings = config.actuators.watchdog_timings();
    let mut actuators = Vec::with_capacity(config.actuators.coverings.len());
    for covering in &config.actuators.coverings {
        let output: Box<dyn PwmOutput> = match config.actuators.driver {
            Driver::Simulated => Box::new(SimulatedOutput::new(covering.channel)),
            Driver::Sysfs => Box::new(SysfsPwm::open(&config.actuators.sysfs, covering.channel)?),
        };
        actuators.push(ActuatorWatchdog::spawn(
            covering.name.as_str(),
            covering.channel,
            output,
            Position::OPEN,
            timings,
        ));
    }
    Ok(ActuatorRegistry::new(actuators)?)
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// `SIGUSR1` simulates a presence edge, `SIGUSR2` logs the current status.
#[cfg(unix)]
async fn forward_signals<T, R, E>(presence: PresenceSender, control: ControlService<T, R, E>)
where
    T: TemperatureSource,
    R: RelaySwitch,
    E: EventLog,
{
    use tokio::signal::unix::{SignalKind, signal};

    let (mut usr1, mut usr2) = match (
        signal(SignalKind::user_defined1()),
        signal(SignalKind::user_defined2()),
    ) {
        (Ok(usr1), Ok(usr2)) => (usr1, usr2),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(%err, "failed to listen for user signals");
            return;
        }
    };

    loop {
        tokio::select! {
            Some(()) = usr1.recv() => {
                tracing::info!("SIGUSR1 received, simulating presence");
                presence.notify();
            }
            Some(()) = usr2.recv() => log_status(&control).await,
            else => break,
        }
    }
}

#[cfg(not(unix))]
async fn forward_signals<T, R, E>(_presence: PresenceSender, _control: ControlService<T, R, E>)
where
    T: TemperatureSource,
    R: RelaySwitch,
    E: EventLog,
{
    std::future::pending::<()>().await;
}

#[cfg(unix)]
async fn log_status<T, R, E>(control: &ControlService<T, R, E>)
where
    T: TemperatureSource,
    R: RelaySwitch,
    E: EventLog,
{
    let status = control.heating_status().await;
    tracing::info!(
        current_temp = ?status.current_temp,
        desired_temp = status.desired_temp,
        mode = %status.mode,
        heater_on = status.heater_on,
        "heating status"
    );
    for (name, position) in control.covering_positions() {
        tracing::info!(covering = %name, %position, "covering position");
    }
}
