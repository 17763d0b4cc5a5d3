//! Actuator watchdog — one per covering servo.
//!
//! The covering servos are continuous-rotation winches: once a duty cycle is
//! applied they keep pulling until the output is cut. A watchdog owns one
//! servo's state and output, and a background task polls at a fixed cadence
//! and zeroes the output once the idle timeout has elapsed since the last
//! command.
//!
//! ```text
//!          set_position                 poll: elapsed >= idle_timeout
//!  IDLE ─────────────────▶ ARMED ─────────────────────────────────────▶ IDLE
//!                           │ ▲
//!                           └─┘ set_position (re-arm)
//! ```
//!
//! Expiry is checked once per poll interval, so the output may stay
//! energized for up to one interval past the timeout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cabinhub_domain::position::{DutyCycle, Position};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::ports::PwmOutput;

/// Timing parameters shared by every watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogTimings {
    /// How long a commanded output stays energized.
    pub idle_timeout: Duration,
    /// Cadence of the expiry check.
    pub poll_interval: Duration,
}

impl Default for WatchdogTimings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Point-in-time view of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorSnapshot {
    pub position: Position,
    pub duty_cycle: DutyCycle,
    pub active: bool,
    /// `None` until the first command.
    pub last_commanded_at: Option<Instant>,
}

#[derive(Debug)]
struct ActuatorState {
    position: Position,
    duty_cycle: DutyCycle,
    active: bool,
    last_commanded_at: Option<Instant>,
    shut_down: bool,
}

struct Shared {
    name: String,
    channel: u8,
    idle_timeout: Duration,
    output: Box<dyn PwmOutput>,
    state: Mutex<ActuatorState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ActuatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Best-effort write; failures are logged and never retried.
    fn write(&self, duty: DutyCycle) {
        if let Err(err) = self.output.write_duty_cycle(duty) {
            tracing::warn!(
                %err,
                actuator = %self.name,
                channel = self.channel,
                %duty,
                "failed to write duty cycle"
            );
        }
    }

    fn expire_if_due(&self, now: Instant) {
        let mut state = self.lock();
        let due = state
            .last_commanded_at
            .is_some_and(|at| now.saturating_duration_since(at) >= self.idle_timeout);
        if state.active && due {
            self.write(DutyCycle::ZERO);
            state.duty_cycle = DutyCycle::ZERO;
            state.active = false;
            tracing::debug!(
                actuator = %self.name,
                channel = self.channel,
                position = %state.position,
                "idle timeout reached, output zeroed"
            );
        }
    }
}

/// Owner of one actuator's commanded state and output.
///
/// Reads are safe from any task. Commands go through
/// [`MotionCoordinator`](crate::coordinator::MotionCoordinator), which is the
/// only caller of `set_position` outside this crate's tests.
pub struct ActuatorWatchdog {
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ActuatorWatchdog {
    /// Create the watchdog and spawn its polling task.
    ///
    /// The actuator starts idle at `initial` with a zeroed output.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn spawn(
        name: impl Into<String>,
        channel: u8,
        output: Box<dyn PwmOutput>,
        initial: Position,
        timings: WatchdogTimings,
    ) -> Self {
        let shared = Arc::new(Shared {
            name: name.into(),
            channel,
            idle_timeout: timings.idle_timeout,
            output,
            state: Mutex::new(ActuatorState {
                position: initial,
                duty_cycle: DutyCycle::ZERO,
                active: false,
                last_commanded_at: None,
                shut_down: false,
            }),
        });
        shared.write(DutyCycle::ZERO);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(poll_loop(
            Arc::clone(&shared),
            timings.poll_interval,
            shutdown_rx,
        ));

        tracing::debug!(actuator = %shared.name, channel, "actuator watchdog started");

        Self {
            shared,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Actuator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Output channel index.
    #[must_use]
    pub fn channel(&self) -> u8 {
        self.shared.channel
    }

    /// Command a new position and (re-)arm the idle timer.
    ///
    /// Commanding the current position again re-writes the same duty cycle
    /// and restarts the timer. Returns `false` without touching the output
    /// after [`shutdown`](Self::shutdown).
    #[must_use]
    pub(crate) fn set_position(&self, target: Position) -> bool {
        let mut state = self.shared.lock();
        if state.shut_down {
            tracing::warn!(actuator = %self.shared.name, %target, "refusing command after shutdown");
            return false;
        }
        let duty = target.duty_cycle();
        self.shared.write(duty);
        state.position = target;
        state.duty_cycle = duty;
        state.active = true;
        state.last_commanded_at = Some(Instant::now());
        tracing::debug!(
            actuator = %self.shared.name,
            channel = self.shared.channel,
            position = %target,
            %duty,
            "actuator armed"
        );
        true
    }

    /// Last commanded position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.shared.lock().position
    }

    /// Whether the output is currently energized.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    /// Duty cycle currently applied.
    #[must_use]
    pub fn duty_cycle(&self) -> DutyCycle {
        self.shared.lock().duty_cycle
    }

    /// Consistent view of all fields.
    #[must_use]
    pub fn snapshot(&self) -> ActuatorSnapshot {
        let state = self.shared.lock();
        ActuatorSnapshot {
            position: state.position,
            duty_cycle: state.duty_cycle,
            active: state.active,
            last_commanded_at: state.last_commanded_at,
        }
    }

    /// Zero the output and stop the polling task.
    ///
    /// Later calls are no-ops.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.lock();
            if state.shut_down {
                return;
            }
            self.shared.write(DutyCycle::ZERO);
            state.duty_cycle = DutyCycle::ZERO;
            state.active = false;
            state.shut_down = true;
        }
        let _ = self.shutdown.send(true);
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
        tracing::debug!(actuator = %self.shared.name, "actuator watchdog stopped");
    }
}

impl Drop for ActuatorWatchdog {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn poll_loop(shared: Arc<Shared>, poll_interval: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => shared.expire_if_due(Instant::now()),
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
