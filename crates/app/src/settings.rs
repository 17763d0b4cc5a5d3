//! Shared, mutable automation settings.
//!
//! The scheduler reads a fresh snapshot every cycle while the control
//! service updates values in place; both hold a clone of the same
//! [`SharedSettings`] handle.

use std::sync::{Arc, PoisonError, RwLock};

use cabinhub_domain::settings::AutomationSettings;

/// Cloneable handle to one [`AutomationSettings`] value.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<AutomationSettings>>,
}

impl SharedSettings {
    #[must_use]
    pub fn new(settings: AutomationSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> AutomationSettings {
        self.read(Clone::clone)
    }

    /// Read through a closure without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&AutomationSettings) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Mutate in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut AutomationSettings) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinhub_domain::heating::HeatingMode;

    #[test]
    fn should_share_updates_between_clones() {
        let settings = SharedSettings::default();
        let other = settings.clone();

        other.update(|s| s.heating.mode = HeatingMode::Auto);

        assert_eq!(settings.snapshot().heating.mode, HeatingMode::Auto);
    }

    #[test]
    fn should_read_without_cloning() {
        let settings = SharedSettings::default();
        let timeout = settings.read(|s| s.presence.timeout_cycles);
        assert_eq!(timeout, 30);
    }
}
