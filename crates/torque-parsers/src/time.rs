//! Time parsing utilities for Torque and Moab output.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Format of a `showq` start time once a year has been appended.
const SHOWQ_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// A duration field did not match `[<days>-]<time>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Torque time could not be parsed: {0}")]
pub struct MalformedDuration(pub String);

/// Parse a Torque duration string into seconds.
///
/// Grammar is `[<days>-]<time>` where `<time>` has one to three
/// `:`-separated fields. The meaning of a short `<time>` depends on
/// whether a day prefix is present:
///
/// | fields | with days        | without days     |
/// |--------|------------------|------------------|
/// | 3      | hours:min:sec    | hours:min:sec    |
/// | 2      | hours:min        | min:sec          |
/// | 1      | hours            | min              |
pub fn parse_duration_secs(s: &str) -> Result<u64, MalformedDuration> {
    let malformed = || MalformedDuration(s.to_string());

    let parts: Vec<&str> = s.split('-').collect();
    let (days, time_part) = match parts.as_slice() {
        [time] => (None, *time),
        [days, time] => (Some(parse_field(days).ok_or_else(malformed)?), *time),
        _ => return Err(malformed()),
    };

    let fields = time_part
        .split(':')
        .map(parse_field)
        .collect::<Option<Vec<u64>>>()
        .ok_or_else(malformed)?;

    let (hours, minutes, seconds) = match (days.is_some(), fields.as_slice()) {
        (_, [h, m, s]) => (*h, *m, *s),
        (true, [h, m]) => (*h, *m, 0),
        (false, [m, s]) => (0, *m, *s),
        (true, [h]) => (*h, 0, 0),
        (false, [m]) => (0, *m, 0),
        _ => return Err(malformed()),
    };

    days.unwrap_or(0)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|total| total.checked_add(hours.checked_mul(3600)?))
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(malformed)
}

/// Digits only; `u64::from_str` alone would also accept a leading `+`.
fn parse_field(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Resolve a `showq` start time (e.g. "Mon Jan 15 10:30:00") in `tz`.
///
/// The output carries no year. The year of `now` is tried first; when the
/// weekday does not match that year, or the result lands more than a day
/// after `now`, the previous year is used instead.
pub fn resolve_showq_time(s: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let year = now.year();

    let in_year = |year: i32| {
        NaiveDateTime::parse_from_str(&format!("{s} {year}"), SHOWQ_TIME_FORMAT)
            .ok()
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
    };

    match in_year(year) {
        Some(dt) if dt <= *now + Duration::days(1) => Some(dt),
        _ => in_year(year - 1),
    }
}
