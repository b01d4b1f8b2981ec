//! Shared fixtures and cross-module scenario tests.


use crate::{SleepInterval, SleepStage, Timestamp};
use chrono::DateTime;

/// Wall-clock `HH:MM` on a fixed night, UTC.
///
/// Times from noon onward fall on 2024-03-01 and times before noon on the
/// following morning, so `"23:00"` to `"01:00"` is a two-hour span.
pub(crate) fn at(hhmm: &str) -> Timestamp {
    let hour: u32 = hhmm[..2].parse().expect("hour");
    let day = if hour >= 12 { "01" } else { "02" };
    DateTime::parse_from_rfc3339(&format!("2024-03-{}T{}:00+00:00", day, hhmm)).expect("timestamp")
}

/// Interval between two [`at`] times. Not validated, so tests can build bad data.
pub(crate) fn interval(stage: SleepStage, start: &str, end: &str) -> SleepInterval {
    SleepInterval {
        stage,
        start: at(start),
        end: at(end),
    }
}

/// Interval from full RFC 3339 timestamps.
pub(crate) fn interval_with_offset(stage: SleepStage, start: &str, end: &str) -> SleepInterval {
    SleepInterval {
        stage,
        start: DateTime::parse_from_rfc3339(start).expect("start"),
        end: DateTime::parse_from_rfc3339(end).expect("end"),
    }
}
