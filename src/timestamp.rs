//! Timestamp parsing and formatting.
//!
//! Timestamps are read from `[HH:][MM:]SS[,fff|.fff]` strings and rendered as
//! `HH:MM:SS.fff`. The fractional part is read as milliseconds, so `,780` and
//! `.780` are both 0.78 seconds while `.5` is 0.005 seconds.
//!
//! A custom formatter may be registered for the whole process. It replaces the
//! default `HH:MM:SS.fff` rendering for every later [`format_timestamp`] call
//! until [`unregister_formatter`] is called.

use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TranscriptError};

static PATTERN_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(?:(\d+):)?(\d*)(?:[,.](\d*))?$").expect("valid timestamp pattern")
});

const MAX_TIME_FIELDS: usize = 3;

type Formatter = Box<dyn Fn(f64) -> String + Send + Sync>;

static FORMATTER: Lazy<RwLock<Option<Formatter>>> = Lazy::new(|| RwLock::new(None));

/// A value accepted by [`parse_timestamp`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampInput<'a> {
    /// Already in seconds; returned unchanged.
    Seconds(f64),
    Text(&'a str),
}

impl From<f64> for TimestampInput<'_> {
    fn from(value: f64) -> Self {
        TimestampInput::Seconds(value)
    }
}

impl<'a> From<&'a str> for TimestampInput<'a> {
    fn from(value: &'a str) -> Self {
        TimestampInput::Text(value)
    }
}

impl<'a> From<&'a String> for TimestampInput<'a> {
    fn from(value: &'a String) -> Self {
        TimestampInput::Text(value.as_str())
    }
}

/// Parse a timestamp into seconds.
///
/// # Errors
///
/// Returns [`TranscriptError::Timestamp`] when the text does not match the
/// timestamp grammar, has more than three `:` separated fields, has no
/// seconds field, or when a numeric input is NaN.
pub fn parse_timestamp<'a>(value: impl Into<TimestampInput<'a>>) -> Result<f64> {
    match value.into() {
        TimestampInput::Seconds(seconds) if seconds.is_nan() => {
            Err(TranscriptError::timestamp("NaN", "value is not a number"))
        }
        TimestampInput::Seconds(seconds) => Ok(seconds),
        TimestampInput::Text(text) => parse_timestamp_text(text),
    }
}

/// Parse a JSON scalar as a timestamp. Numbers are seconds, strings follow
/// the timestamp grammar; anything else is rejected.
pub fn parse_timestamp_value(value: &serde_json::Value) -> Result<f64> {
    match value {
        serde_json::Value::Number(number) => {
            let seconds = number.as_f64().ok_or_else(|| {
                TranscriptError::timestamp(number.to_string(), "not a finite number")
            })?;
            parse_timestamp(seconds)
        }
        serde_json::Value::String(text) => parse_timestamp(text),
        other => Err(TranscriptError::timestamp(
            other.to_string(),
            format!("cannot parse timestamp of type {}", json_type_name(other)),
        )),
    }
}

fn parse_timestamp_text(value: &str) -> Result<f64> {
    let trimmed = value.trim();

    if trimmed.split(':').count() > MAX_TIME_FIELDS {
        return Err(TranscriptError::timestamp(
            trimmed,
            format!("more than {MAX_TIME_FIELDS} time fields"),
        ));
    }

    let captures = PATTERN_TIMESTAMP
        .captures(trimmed)
        .ok_or_else(|| TranscriptError::timestamp(trimmed, "does not match [HH:][MM:]SS[.fff]"))?;

    let seconds_field = captures.get(3).map(|m| m.as_str()).unwrap_or_default();
    if seconds_field.is_empty() {
        return Err(TranscriptError::timestamp(trimmed, "missing seconds field"));
    }

    let fields: Vec<&str> = [captures.get(1), captures.get(2)]
        .into_iter()
        .flatten()
        .map(|m| m.as_str())
        .chain(std::iter::once(seconds_field))
        .collect();

    let mut timestamp = 0.0;
    for field in &fields {
        timestamp = timestamp * 60.0 + parse_field(trimmed, field)?;
    }

    if let Some(fraction) = captures.get(4).map(|m| m.as_str()) {
        if !fraction.is_empty() {
            let ms = parse_field(trimmed, fraction)?;
            if ms != 0.0 {
                timestamp += ms / 1000.0;
            }
        }
    }

    if timestamp.is_nan() {
        return Err(TranscriptError::timestamp(trimmed, "value is not a number"));
    }
    Ok(timestamp)
}

fn parse_field(timestamp: &str, field: &str) -> Result<f64> {
    field
        .parse::<u64>()
        .map(|v| v as f64)
        .map_err(|e| TranscriptError::timestamp(timestamp, format!("field {field:?}: {e}")))
}

/// Render seconds with the registered formatter, or as `HH:MM:SS.fff`.
pub fn format_timestamp(timestamp: f64) -> String {
    let formatter = FORMATTER.read().unwrap_or_else(|e| e.into_inner());
    match formatter.as_ref() {
        Some(format) => format(timestamp),
        None => default_format(timestamp),
    }
}

/// Render seconds as `HH:MM:SS.fff`.
///
/// Hours are not limited to two digits. Milliseconds are rounded to the
/// nearest integer; negative and non-finite values render as zero.
pub fn default_format(timestamp: f64) -> String {
    let total_ms = if timestamp.is_finite() && timestamp > 0.0 {
        (timestamp * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let seconds = total_ms / 1000 % 60;
    let ms = total_ms % 1000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{ms:03}")
}

/// Replace the timestamp formatter for the whole process.
pub fn register_formatter<F>(formatter: F)
where
    F: Fn(f64) -> String + Send + Sync + 'static,
{
    let mut slot = FORMATTER.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(Box::new(formatter));
}

/// Restore the default `HH:MM:SS.fff` formatter.
pub fn unregister_formatter() {
    let mut slot = FORMATTER.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_seconds(input: &str, expected: f64) {
        let actual = parse_timestamp(input).unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "{input}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn parses_every_field_layout() {
        assert_seconds("00:00:00,780", 0.78);
        assert_seconds("00:00:00.780", 0.78);
        assert_seconds("00:00,780", 0.78);
        assert_seconds("00:00.780", 0.78);
        assert_seconds("00,780", 0.78);
        assert_seconds("0.780", 0.78);
        assert_seconds("01:02:03", 3723.0);
        assert_seconds("02:03", 123.0);
        assert_seconds("03", 3.0);
        assert_seconds("01:02:03,456", 3723.456);
        assert_seconds("  0:30  ", 30.0);
    }

    #[test]
    fn fraction_is_milliseconds() {
        assert_seconds("00:00:01.5", 1.005);
        assert_seconds("00:00:01.000", 1.0);
        assert_seconds("00:00:01.", 1.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_timestamp(12.493).unwrap(), 12.493);
        assert!(parse_timestamp(f64::NAN).is_err());
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in [
            "01;02:03,456",
            "01:02:03/956",
            "03:01:02:03,456",
            "01: :03,456",
            "",
            ",780",
            "01:02:",
        ] {
            let err = parse_timestamp(bad).unwrap_err();
            assert!(err.is_grammar_error(), "{bad:?} gave {err}");
        }
    }

    #[test]
    fn json_values() {
        assert_eq!(parse_timestamp_value(&json!(4.8)).unwrap(), 4.8);
        assert_eq!(parse_timestamp_value(&json!("0:30")).unwrap(), 30.0);
        assert!(parse_timestamp_value(&json!([])).is_err());
        assert!(parse_timestamp_value(&json!(null)).is_err());
    }

    #[test]
    fn default_format_pads_and_rounds() {
        assert_eq!(default_format(0.0), "00:00:00.000");
        assert_eq!(default_format(0.78), "00:00:00.780");
        assert_eq!(default_format(3723.456), "01:02:03.456");
        assert_eq!(default_format(59.9996), "00:01:00.000");
        assert_eq!(default_format(360_000.0), "100:00:00.000");
    }

    #[test]
    fn format_inverts_parse() {
        for text in ["00:00:00.000", "00:00:06.210", "01:02:03.456", "12:59:59.999"] {
            assert_eq!(default_format(parse_timestamp(text).unwrap()), text);
        }
    }
}
