use chrono::{DateTime, Utc};

/// Remaining time to the banner expiry, broken into display units. Derived,
/// never stored; recomputed from the absolute `endTime` and whatever clock the
/// viewer has locally, so server/viewer skew cannot make it drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub secs: u64,
}

impl TimeLeft {
    pub const ZERO: TimeLeft = TimeLeft { days: 0, hours: 0, minutes: 0, secs: 0 };

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.secs
    }
}

/// Seconds remaining until `end_time`, floored to whole seconds and clamped to
/// zero at or past expiry.
pub fn remaining_seconds(end_time: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let secs = (end_time - now).num_seconds();
    if secs > 0 {
        secs as u64
    } else {
        0
    }
}

/// Pure projection of (end_time, now) into countdown units. Each unit is
/// computed on the remainder left by the larger ones, so
/// `days*86400 + hours*3600 + minutes*60 + secs` always equals the clamped
/// remaining seconds.
pub fn time_left(end_time: DateTime<Utc>, now: DateTime<Utc>) -> TimeLeft {
    let remaining = remaining_seconds(end_time, now);
    TimeLeft {
        days: remaining / 86_400,
        hours: remaining % 86_400 / 3_600,
        minutes: remaining % 3_600 / 60,
        secs: remaining % 60,
    }
}
