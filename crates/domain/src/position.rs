//! Covering positions and the servo duty cycle derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Commanded position of a window covering.
///
/// The servos accept positions in `10..=20`. `10` rolls the covering fully
/// open, `20` fully closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Position(u8);

impl Position {
    /// Lowest accepted position.
    pub const MIN: u8 = 10;
    /// Highest accepted position.
    pub const MAX: u8 = 20;

    /// Fully open.
    pub const OPEN: Self = Self(Self::MIN);
    /// Fully closed.
    pub const CLOSED: Self = Self(Self::MAX);

    /// Validate a raw position.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PositionOutOfRange`] when `value` is not in
    /// `10..=20`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(ValidationError::PositionOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    /// Raw position value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Duty cycle that drives the servo towards this position.
    #[must_use]
    pub fn duty_cycle(self) -> DutyCycle {
        // 50 Hz servo signal: position / 200 of the 16-bit full scale.
        let raw = u32::from(self.0) * u32::from(u16::MAX) / 200;
        DutyCycle(u16::try_from(raw).unwrap_or(u16::MAX))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::OPEN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<i64> for Position {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Position> for u8 {
    fn from(value: Position) -> Self {
        value.0
    }
}

/// 16-bit PWM duty cycle written to an output channel.
///
/// Zero means the servo is de-energized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DutyCycle(u16);

impl DutyCycle {
    /// Output switched off.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw 16-bit value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw 16-bit value.
    #[must_use]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Whether the output is energized.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Fraction of the full scale, in `0.0..=1.0`.
    #[must_use]
    pub fn ratio(self) -> f64 {
        f64::from(self.0) / f64::from(u16::MAX)
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which coverings a command addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveringTarget {
    /// A single covering by name.
    One(String),
    /// Every covering, in wiring order.
    All,
}

impl CoveringTarget {
    /// Parse a target name; `"all"` addresses the whole fleet.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == "all" {
            Self::All
        } else {
            Self::One(name.to_string())
        }
    }
}

impl fmt::Display for CoveringTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(name) => f.write_str(name),
            Self::All => f.write_str("all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_positions_in_range() {
        for raw in 10..=20 {
            let position = Position::new(raw).unwrap();
            assert_eq!(i64::from(position.value()), raw);
        }
    }

    #[test]
    fn should_reject_positions_below_range() {
        assert!(matches!(
            Position::new(9),
            Err(ValidationError::PositionOutOfRange { value: 9, .. })
        ));
    }

    #[test]
    fn should_reject_positions_above_range() {
        assert!(Position::new(21).is_err());
        assert!(Position::new(-1).is_err());
        assert!(Position::new(300).is_err());
    }

    #[test]
    fn should_compute_duty_cycle_proportionally() {
        assert_eq!(Position::OPEN.duty_cycle().raw(), 3276);
        assert_eq!(Position::CLOSED.duty_cycle().raw(), 6553);
        assert_eq!(Position::new(15).unwrap().duty_cycle().raw(), 4915);
    }

    #[test]
    fn should_never_produce_zero_duty_for_valid_position() {
        for raw in 10..=20 {
            assert!(!Position::new(raw).unwrap().duty_cycle().is_zero());
        }
    }

    #[test]
    fn should_default_to_open() {
        assert_eq!(Position::default(), Position::OPEN);
    }

    #[test]
    fn should_parse_all_target() {
        assert_eq!(CoveringTarget::parse("all"), CoveringTarget::All);
        assert_eq!(
            CoveringTarget::parse("leftdoor"),
            CoveringTarget::One("leftdoor".to_string())
        );
    }

    #[test]
    fn should_deserialize_position_with_validation() {
        #[derive(Deserialize)]
        struct Wrapper {
            position: Position,
        }

        let ok: Wrapper = toml::from_str("position = 12").unwrap();
        assert_eq!(ok.position.value(), 12);

        let bad: Result<Wrapper, _> = toml::from_str("position = 25");
        assert!(bad.is_err());
    }
}
