//! Lenient date parsing and ISO-8601 rendering.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d]+").expect("non-digit pattern is valid"));

static SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})(?:\.(\d{6}))?$").expect("seconds pattern is valid"));

/// A string that could not be read as a date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to parse '{0}' as a date")]
pub struct DateParseError(pub String);

/// Parses a date or date-time written with any non-digit separators.
///
/// The first five digit runs are the year, month, day, hour and minute. The
/// remainder, if any, must be two-digit seconds optionally followed by a dot
/// and exactly six digits of microseconds.
///
/// ```rust
/// use dictize::dates::{isoformat, parse_date_str};
///
/// let dt = parse_date_str("2024/03/01 12:30:05.250000").unwrap();
/// assert_eq!(isoformat(&dt), "2024-03-01T12:30:05.250000");
///
/// let day = parse_date_str("2024-03-01").unwrap();
/// assert_eq!(isoformat(&day), "2024-03-01T00:00:00");
///
/// assert!(parse_date_str("March 1st").is_err());
/// ```
pub fn parse_date_str(input: &str) -> Result<NaiveDateTime, DateParseError> {
    let fail = || DateParseError(input.to_string());
    let parts: Vec<&str> = NON_DIGITS.splitn(input, 6).collect();
    if parts.len() < 3 {
        return Err(fail());
    }

    let mut fields = [0u32; 5];
    for (slot, part) in fields.iter_mut().zip(parts.iter().take(5)) {
        *slot = part.parse().map_err(|_| fail())?;
    }

    let (mut second, mut micro) = (0, 0);
    if let Some(rest) = parts.get(5) {
        let captures = SECONDS.captures(rest).ok_or_else(fail)?;
        second = captures[1].parse().map_err(|_| fail())?;
        if let Some(m) = captures.get(2) {
            micro = m.as_str().parse().map_err(|_| fail())?;
        }
    }

    let [year, month, day, hour, minute] = fields;
    let year = i32::try_from(year).map_err(|_| fail())?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_micro_opt(hour, minute, second, micro))
        .ok_or_else(fail)
}

/// Renders `YYYY-MM-DDTHH:MM:SS`, adding `.ffffff` only when the sub-second
/// part is non-zero.
pub fn isoformat(value: &NaiveDateTime) -> String {
    let base = value.format("%Y-%m-%dT%H:%M:%S").to_string();
    match value.nanosecond() / 1_000 {
        0 => base,
        micros => format!("{base}.{micros:06}"),
    }
}
