//! # cabinhub-adapter-pwm-sysfs
//!
//! Servo output through the Linux PWM sysfs interface.
//!
//! Each channel lives under `<root>/pwmchip<chip>/pwm<channel>`. Opening a
//! channel exports it when needed, programs a 50 Hz period and enables it
//! with a zero duty cycle. The 16-bit [`DutyCycle`] is scaled linearly onto
//! the period in nanoseconds.
//!
//! ## Dependency rule
//!
//! Depends on `cabinhub-app` (port traits) and `cabinhub-domain` only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cabinhub_app::ports::{ChannelError, PwmOutput};
use cabinhub_domain::position::DutyCycle;
use serde::Deserialize;

/// Where the PWM chip lives and how it is clocked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SysfsPwmConfig {
    /// sysfs PWM class directory.
    pub root: PathBuf,
    /// Chip number, i.e. `pwmchip<chip>`.
    pub chip: u32,
    /// PWM period in nanoseconds.
    pub period_ns: u64,
}

impl Default for SysfsPwmConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/class/pwm"),
            chip: 0,
            period_ns: 20_000_000,
        }
    }
}

impl SysfsPwmConfig {
    fn chip_dir(&self) -> PathBuf {
        self.root.join(format!("pwmchip{}", self.chip))
    }
}

/// Failures talking to the sysfs PWM interface.
#[derive(Debug, thiserror::Error)]
pub enum SysfsPwmError {
    /// The configured chip does not exist.
    #[error("pwm chip not found at {0}")]
    ChipMissing(PathBuf),

    /// Exporting did not create the channel directory.
    #[error("pwm channel {channel} could not be exported from {chip}")]
    Export { chip: PathBuf, channel: u8 },

    /// A sysfs attribute write failed.
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<SysfsPwmError> for ChannelError {
    fn from(err: SysfsPwmError) -> Self {
        Self::Io(Box::new(err))
    }
}

/// One exported, enabled PWM channel.
#[derive(Debug)]
pub struct SysfsPwm {
    channel: u8,
    dir: PathBuf,
    period_ns: u64,
}

impl SysfsPwm {
    /// Export (if needed), configure and enable `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsPwmError`] when the chip is missing, the channel cannot
    /// be exported or an attribute cannot be written.
    pub fn open(config: &SysfsPwmConfig, channel: u8) -> Result<Self, SysfsPwmError> {
        let chip = config.chip_dir();
        if !chip.is_dir() {
            return Err(SysfsPwmError::ChipMissing(chip));
        }

        let dir = chip.join(format!("pwm{channel}"));
        if !dir.is_dir() {
            tracing::debug!(chip = %chip.display(), channel, "exporting pwm channel");
            write_attribute(&chip.join("export"), channel)?;
            if !dir.is_dir() {
                return Err(SysfsPwmError::Export { chip, channel });
            }
        }

        let pwm = Self {
            channel,
            dir,
            period_ns: config.period_ns,
        };
        write_attribute(&pwm.dir.join("period"), pwm.period_ns)?;
        write_attribute(&pwm.dir.join("duty_cycle"), 0)?;
        write_attribute(&pwm.dir.join("enable"), 1)?;
        tracing::info!(channel, dir = %pwm.dir.display(), "pwm channel enabled");
        Ok(pwm)
    }

    #[must_use]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Duty cycle converted to nanoseconds of high time.
    #[must_use]
    pub fn duty_ns(&self, duty: DutyCycle) -> u64 {
        u64::from(duty.raw()) * self.period_ns / u64::from(u16::MAX)
    }
}

impl PwmOutput for SysfsPwm {
    fn write_duty_cycle(&self, duty: DutyCycle) -> Result<(), ChannelError> {
        let ns = self.duty_ns(duty);
        write_attribute(&self.dir.join("duty_cycle"), ns)?;
        tracing::trace!(channel = self.channel, %duty, ns, "pwm duty cycle written");
        Ok(())
    }
}

fn write_attribute(path: &Path, value: impl std::fmt::Display) -> Result<(), SysfsPwmError> {
    fs::write(path, value.to_string()).map_err(|source| SysfsPwmError::Write {
        path: path.to_path_buf(),
        source,
    })
}
