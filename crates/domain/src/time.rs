//! Time and timestamp helpers.

use chrono::{DateTime, Local, Timelike, Utc};

/// UTC timestamp used for event records.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Hour of the day (`0..24`) on the cabin's local clock.
///
/// Covering windows are expressed in local hours.
#[must_use]
pub fn local_hour() -> u32 {
    Local::now().hour()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_return_hour_of_day() {
        assert!(local_hour() < 24);
    }
}
