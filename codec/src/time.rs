//! Timestamp parsing and formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// One accepted timestamp layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// RFC 3339 with optional fractional seconds and a zone offset.
    Rfc3339,
    /// Zone-less date and time (interpreted as UTC).
    DateTime(&'static str),
    /// Date only, at midnight UTC.
    Date(&'static str),
}

/// Formats tried in order by `parse_time`.
pub const DEFAULT_TIME_FORMATS: &[TimeFormat] = &[
    TimeFormat::Rfc3339,
    TimeFormat::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    TimeFormat::DateTime("%Y-%m-%d %H:%M:%S"),
    TimeFormat::Date("%Y-%m-%d"),
];

impl TimeFormat {
    fn parse(&self, s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match self {
            TimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc)),
            TimeFormat::DateTime(fmt) => {
                NaiveDateTime::parse_from_str(s, fmt).map(|t| t.and_utc())
            }
            TimeFormat::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc()),
        }
    }
}

/// Parse a timestamp using the default format list.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    parse_time_with(s, DEFAULT_TIME_FORMATS)
}

/// Parse a timestamp trying each format in order; the first success wins.
///
/// On failure the error of the last attempted format is returned.
pub fn parse_time_with(s: &str, formats: &[TimeFormat]) -> Result<DateTime<Utc>, String> {
    let mut last_err = String::from("no time formats configured");
    for format in formats {
        match format.parse(s) {
            Ok(t) => return Ok(t),
            Err(e) => last_err = e.to_string(),
        }
    }
    Err(last_err)
}

/// Canonical text form: RFC 3339 in UTC with a `Z` suffix.
pub fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
