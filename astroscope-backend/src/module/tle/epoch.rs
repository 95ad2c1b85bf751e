//! TLE epoch conversion
//!
//! The epoch field is `YYDDD.DDDDDDDD`: a two-digit year followed by a
//! fractional day of year where day 1.0 is 1 January 00:00:00 UTC.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Two-digit years below this value belong to the 2000s
pub const CENTURY_PIVOT: u32 = 57;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Map a two-digit epoch year onto a full year (`56` → 2056, `57` → 1957).
pub fn full_year(yy: u32) -> i32 {
    let year = if yy < CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };
    year as i32
}

/// Convert a year and fractional day of year into a UTC instant rounded to
/// the nearest second.
///
/// Returns `None` when the day lies outside the year.
pub fn from_day_of_year(year: i32, day: f64) -> Option<DateTime<Utc>> {
    if !day.is_finite() || day < 1.0 {
        return None;
    }

    let whole_day = day.trunc();
    let ordinal = whole_day as u32;
    // Rejects day 366 in common years as well as anything past 366
    let date = NaiveDate::from_yo_opt(year, ordinal)?;

    let seconds = ((day - whole_day) * SECONDS_PER_DAY).round() as i64;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let instant = midnight.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;

    Some(instant.and_utc())
}
