//! Logical day computation.
//!
//! A user's day does not have to start at midnight. Every date-sensitive
//! computation in the engine goes through [`logical_date`]: activity before
//! the configured day-start hour belongs to the previous calendar day, so a
//! 1 a.m. journal entry still counts toward "yesterday" when the boundary
//! is 4 a.m.
//!
//! All functions are pure. `now` is caller-supplied (or read once in the
//! `*_today` conveniences), never memoized, so the same calculation is
//! reproducible in tests and cannot drift between two calls within one
//! logical tick.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Timelike};

/// Highest valid day-start hour.
pub const MAX_DAY_START_HOUR: u8 = 23;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Calendar date the instant belongs to, adjusted for the day-start hour.
///
/// If the hour-of-day of `instant` (in its own timezone) is strictly less
/// than `day_start_hour`, the previous calendar date is returned. With
/// `day_start_hour == 0` this is simply the calendar date.
pub fn logical_date<Tz: TimeZone>(instant: &DateTime<Tz>, day_start_hour: u8) -> NaiveDate {
    let date = instant.date_naive();
    if instant.hour() < u32::from(day_start_hour) {
        date - Duration::days(1)
    } else {
        date
    }
}

/// Logical date of the current wall-clock instant.
pub fn logical_today(day_start_hour: u8) -> NaiveDate {
    logical_date(&Local::now(), day_start_hour)
}

/// Logical today shifted by `days` calendar days.
///
/// `logical_date_offset(1, h)` is tomorrow, `-1` yesterday; week windows
/// are built from a range of offsets.
pub fn logical_date_offset(days: i64, day_start_hour: u8) -> NaiveDate {
    logical_today(day_start_hour) + Duration::days(days)
}

/// Whole calendar days from `b` to `a` (`a - b`).
///
/// Independent of any day-start hour: the offset only decides which bucket
/// "now" falls into, it never biases the difference between two dates.
pub fn day_difference(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}

/// Time remaining until the next day-boundary crossing.
///
/// Today's boundary if `now` is still before it, otherwise tomorrow's.
/// Safe to call every second for countdown display.
pub fn reset_countdown<Tz: TimeZone>(now: &DateTime<Tz>, day_start_hour: u8) -> Duration {
    let boundary = i64::from(day_start_hour.min(MAX_DAY_START_HOUR)) * 3600;
    let into_day = i64::from(now.num_seconds_from_midnight());
    let remaining = if into_day < boundary {
        boundary - into_day
    } else {
        boundary + SECONDS_PER_DAY - into_day
    };
    Duration::seconds(remaining)
}
