//! Occupancy rule — auxiliary devices follow presence.
//!
//! A presence edge switches the devices on and restarts the cycle counter.
//! Each scheduler cycle advances the counter; once it reaches the timeout
//! while the devices are on they are switched off. Presence edges arrive on
//! their own task, so the counter is shared behind an async lock held across
//! the relay command.

use std::sync::Arc;

use cabinhub_domain::device::RelayChannel;
use cabinhub_domain::event::{EventRecord, ResponseCode, TriggerCode};
use tokio::sync::{Mutex, mpsc};

use crate::ports::event_log::record_or_warn;
use crate::ports::{EventLog, RelaySwitch};
use crate::settings::SharedSettings;

/// Result of a presence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceOutcome {
    /// Presence automation is disabled.
    Disabled,
    /// The devices were off and have been switched on.
    DevicesOn,
    /// The devices were already on; only the counter restarted.
    AlreadyOn,
    /// The relay rejected the command.
    SwitchFailed,
}

/// Result of one scheduler cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyOutcome {
    /// Presence automation is disabled.
    Disabled,
    /// Still waiting; `cycles` since the last presence edge.
    Counting { cycles: u32 },
    /// Timeout reached and the devices were switched off.
    TimedOut,
    /// The relay rejected the command; retried next cycle.
    SwitchFailed,
}

/// Presence-driven control of the auxiliary devices.
pub struct OccupancyRule<R, E> {
    cycles: Mutex<u32>,
    relay: Arc<R>,
    events: Arc<E>,
    devices: RelayChannel,
    settings: SharedSettings,
}

impl<R, E> OccupancyRule<R, E>
where
    R: RelaySwitch,
    E: EventLog,
{
    #[must_use]
    pub fn new(relay: Arc<R>, events: Arc<E>, devices: RelayChannel, settings: SharedSettings) -> Self {
        Self {
            cycles: Mutex::new(0),
            relay,
            events,
            devices,
            settings,
        }
    }

    /// Cycles counted since the last presence edge (or timeout).
    pub async fn cycles(&self) -> u32 {
        *self.cycles.lock().await
    }

    /// Handle one presence edge.
    pub async fn on_presence(&self) -> PresenceOutcome {
        if !self.settings.read(|s| s.presence.enabled) {
            tracing::debug!("presence automation disabled, ignoring edge");
            return PresenceOutcome::Disabled;
        }

        let mut cycles = self.cycles.lock().await;
        *cycles = 0;
        if self.relay.is_on(self.devices) {
            tracing::debug!("presence detected, devices already on");
            return PresenceOutcome::AlreadyOn;
        }

        if let Err(err) = self.relay.switch(self.devices, true).await {
            tracing::warn!(%err, "failed to switch devices on");
            return PresenceOutcome::SwitchFailed;
        }
        tracing::info!("presence detected, devices on");
        record_or_warn(
            self.events.as_ref(),
            EventRecord::automated(
                TriggerCode::PresenceDetected,
                None,
                ResponseCode::DevicesState,
                "on",
            ),
        )
        .await;
        PresenceOutcome::DevicesOn
    }

    /// Advance the counter by one cycle and apply the timeout.
    pub async fn on_cycle(&self) -> OccupancyOutcome {
        let presence = self.settings.read(|s| s.presence.clone());
        if !presence.enabled {
            return OccupancyOutcome::Disabled;
        }

        let mut cycles = self.cycles.lock().await;
        *cycles = cycles.saturating_add(1);
        if *cycles < presence.timeout_cycles || !self.relay.is_on(self.devices) {
            return OccupancyOutcome::Counting { cycles: *cycles };
        }

        if let Err(err) = self.relay.switch(self.devices, false).await {
            tracing::warn!(%err, "failed to switch devices off");
            return OccupancyOutcome::SwitchFailed;
        }
        tracing::info!(cycles = *cycles, "no presence, devices off");
        *cycles = 0;
        record_or_warn(
            self.events.as_ref(),
            EventRecord::automated(
                TriggerCode::PresenceTimeout,
                Some(presence.timeout_cycles.to_string()),
                ResponseCode::DevicesState,
                "off",
            ),
        )
        .await;
        OccupancyOutcome::TimedOut
    }
}

/// Sending half of the presence channel, handed to the sensor adapter.
#[derive(Debug, Clone)]
pub struct PresenceSender {
    tx: mpsc::Sender<()>,
}

/// Receiving half, consumed by [`listen`].
#[derive(Debug)]
pub struct PresenceReceiver {
    rx: mpsc::Receiver<()>,
}

/// Create a presence channel. Edges beyond `capacity` pending ones coalesce.
#[must_use]
pub fn presence_channel(capacity: usize) -> (PresenceSender, PresenceReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (PresenceSender { tx }, PresenceReceiver { rx })
}

impl PresenceSender {
    /// Report a presence edge without blocking the caller.
    pub fn notify(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("presence listener gone, edge dropped");
            }
        }
    }
}

/// Feed presence edges into `rule` until every sender is dropped.
pub async fn listen<R, E>(rule: Arc<OccupancyRule<R, E>>, mut receiver: PresenceReceiver)
where
    R: RelaySwitch,
    E: EventLog,
{
    while receiver.rx.recv().await.is_some() {
        let outcome = rule.on_presence().await;
        tracing::trace!(?outcome, "presence edge handled");
    }
    tracing::debug!("presence channel closed");
}
