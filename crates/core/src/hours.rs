//! Clock-time parsing and hour arithmetic.
//!
//! Hours are exposed to the API as `f64` rounded to one decimal, but every
//! comparison and sum goes through integer tenths of an hour so that
//! floating-point noise (`0.1 + 0.2`) can never flip a cap decision.

use chrono::NaiveTime;

/// Accepted clock-time layouts, tried in order.
const CLOCK_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// Parse a wall-clock time such as `"09:00"`, `"9:30"` or `"13:45:00"`.
///
/// Returns `None` for anything that is not a valid time of day.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Canonical `HH:MM` rendering used for storage and responses.
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Whole minutes from `start` to `end`. Negative when `end` is before `start`.
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// Round a non-negative minute count to the nearest tenth of an hour
/// (half-up, so 3 minutes = 0.05h rounds to 0.1h).
pub fn minutes_to_tenths(minutes: i64) -> i64 {
    if minutes <= 0 {
        return 0;
    }
    (minutes * 10 + 30) / 60
}

/// Convert an `f64` hour value into integer tenths.
pub fn hours_to_tenths(hours: f64) -> i64 {
    (hours * 10.0).round() as i64
}

/// Convert integer tenths back into an `f64` hour value.
pub fn tenths_to_hours(tenths: i64) -> f64 {
    tenths as f64 / 10.0
}

/// `round((end - start) / 1h, 1)`; zero when `end` is not after `start`.
pub fn compute_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    tenths_to_hours(minutes_to_tenths(minutes_between(start, end)))
}
