//! Text interchange helpers for scalar values.
//!
//! # Responsibility
//! - Convert between the canonical textual encoding used by import/export
//!   and native typed values, both directions.
//!
//! # Invariants
//! - Calendar formats are fixed and locale-independent:
//!   `YYYY-MM-DD` for dates, `YYYY-MM-DDTHH:MM:SS` for date-times.
//! - Malformed input fails with `ConversionError`; helpers never fall back
//!   to a default value or clamp invalid calendar dates.
//! - `parse(render(v)) == v` for every supported value.

use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Recoverable failure for one malformed text field.
///
/// Import pipelines reject or flag the offending record individually instead
/// of silently storing a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    InvalidBool(String),
    InvalidInt(String),
    InvalidDouble(String),
    InvalidDate(String),
    InvalidDateTime(String),
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool(text) => write!(f, "not a boolean: `{text}`"),
            Self::InvalidInt(text) => write!(f, "not an integer: `{text}`"),
            Self::InvalidDouble(text) => write!(f, "not a number: `{text}`"),
            Self::InvalidDate(text) => write!(f, "not a calendar date: `{text}`"),
            Self::InvalidDateTime(text) => write!(f, "not a date-time: `{text}`"),
        }
    }
}

impl Error for ConversionError {}

/// Parses `true`/`false` (any case) or `1`/`0`.
pub fn parse_bool(text: &str) -> Result<bool, ConversionError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConversionError::InvalidBool(text.to_string())),
    }
}

pub fn render_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

pub fn parse_int(text: &str) -> Result<i64, ConversionError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ConversionError::InvalidInt(text.to_string()))
}

pub fn render_int(value: i64) -> String {
    value.to_string()
}

pub fn parse_double(text: &str) -> Result<f64, ConversionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::InvalidDouble(text.to_string()));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| ConversionError::InvalidDouble(text.to_string()))
}

pub fn render_double(value: f64) -> String {
    value.to_string()
}

/// Parses a `YYYY-MM-DD` date; impossible calendar dates are rejected.
pub fn parse_date(text: &str) -> Result<NaiveDate, ConversionError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ConversionError::InvalidDate(text.to_string()))
}

/// Renders a date for storage/interchange, not for display.
pub fn render_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DDTHH:MM:SS` date-time.
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime, ConversionError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
        .map_err(|_| ConversionError::InvalidDateTime(text.to_string()))
}

/// Renders a date-time for storage/interchange, not for display.
pub fn render_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        parse_bool, parse_date, parse_date_time, parse_double, parse_int, render_bool,
        render_date, render_date_time, render_double, render_int, ConversionError,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn bool_accepts_words_and_digits() {
        assert!(parse_bool("TRUE").expect("TRUE should parse"));
        assert!(parse_bool("1").expect("1 should parse"));
        assert!(!parse_bool(" false ").expect("false should parse"));
        assert_eq!(
            parse_bool("yes").expect_err("yes must be rejected"),
            ConversionError::InvalidBool("yes".to_string())
        );
        assert_eq!(render_bool(true), "true");
    }

    #[test]
    fn int_round_trips_including_negatives_and_zero() {
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(
                parse_int(&render_int(value)).expect("rendered int should parse"),
                value
            );
        }
        assert!(parse_int("").is_err());
        assert!(parse_int("12.5").is_err());
    }

    #[test]
    fn double_round_trips_shortest_representation() {
        for value in [0.0, -0.5, 4.75, 1e-12, f64::MAX] {
            assert_eq!(
                parse_double(&render_double(value)).expect("rendered double should parse"),
                value
            );
        }
        assert!(parse_double("").is_err());
        assert!(parse_double("4,5").is_err());
    }

    #[test]
    fn leap_day_parses_and_round_trips() {
        let date = parse_date("2024-02-29").expect("2024 is a leap year");
        assert_eq!(render_date(date), "2024-02-29");
    }

    #[test]
    fn impossible_calendar_date_is_rejected_not_clamped() {
        assert_eq!(
            parse_date("2023-02-30").expect_err("feb 30 must be rejected"),
            ConversionError::InvalidDate("2023-02-30".to_string())
        );
    }

    #[test]
    fn date_boundaries_round_trip() {
        for date in [
            NaiveDate::from_ymd_opt(1, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(9999, 12, 31).expect("valid date"),
        ] {
            assert_eq!(
                parse_date(&render_date(date)).expect("rendered date should parse"),
                date
            );
        }
    }

    #[test]
    fn date_time_round_trips_fixed_format() {
        let stamp: NaiveDateTime = NaiveDate::from_ymd_opt(2026, 8, 6)
            .expect("valid date")
            .and_hms_opt(13, 45, 9)
            .expect("valid time");
        let text = render_date_time(stamp);
        assert_eq!(text, "2026-08-06T13:45:09");
        assert_eq!(
            parse_date_time(&text).expect("rendered stamp should parse"),
            stamp
        );
        assert!(parse_date_time("2026-08-06 13:45:09").is_err());
    }
}
