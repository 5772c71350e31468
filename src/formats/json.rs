use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TranscriptError};
use crate::segments::SegmentCombiner;
use crate::speaker::parse_speaker;
use crate::timestamp::{json_type_name, parse_timestamp, parse_timestamp_value};
use crate::{CombineOptions, Segment, TranscriptFormat, TranscriptParser};

const SEGMENTS_KEY: &str = "segments";
const SUBTITLE_KEYS: [&str; 3] = ["start", "end", "text"];

/// An entry of the `{"segments": [...]}` form. Times are seconds, either as
/// numbers or timestamp strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptEntry {
    start_time: Value,
    end_time: Value,
    #[serde(default)]
    speaker: Option<String>,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct Transcript {
    segments: Vec<TranscriptEntry>,
}

/// An entry of the subtitle array form. Times are milliseconds.
#[derive(Debug, Deserialize)]
struct Subtitle {
    start: Value,
    end: Value,
    text: String,
}

/// True when the trimmed data is wrapped in `{}` or `[]`.
pub fn is_json(data: &str) -> bool {
    let data = data.trim();
    (data.starts_with('{') && data.ends_with('}')) || (data.starts_with('[') && data.ends_with(']'))
}

/// Parse JSON data into segments.
///
/// An empty object yields no segments. Entries of the subtitle array form
/// take their speaker from a `Name: ` prefix on the text, carrying the last
/// known speaker forward when there is none.
///
/// # Errors
///
/// [`TranscriptError::Format`] for data that is not an object or array or
/// has an unrecognised shape, [`TranscriptError::Json`] for invalid JSON or
/// mistyped fields, and [`TranscriptError::Timestamp`] for any time that
/// does not parse.
pub fn parse_json(data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
    let data = super::strip_byte_order_mark(data).trim();
    if !is_json(data) {
        return Err(TranscriptError::format(
            TranscriptFormat::Json,
            "data is not a JSON object or array",
        ));
    }

    let value: Value = serde_json::from_str(data)?;
    match value {
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Object(map) => {
            if !map.get(SEGMENTS_KEY).is_some_and(Value::is_array) {
                return Err(TranscriptError::format(
                    TranscriptFormat::Json,
                    "unknown JSON transcript format, expected a segments array",
                ));
            }
            let transcript: Transcript = serde_json::from_value(Value::Object(map))?;
            parse_transcript(transcript, options)
        }
        Value::Array(items) => parse_subtitles(items, options),
        other => Err(TranscriptError::format(
            TranscriptFormat::Json,
            format!("unexpected top level {}", json_type_name(&other)),
        )),
    }
}

fn parse_transcript(transcript: Transcript, options: &CombineOptions) -> Result<Vec<Segment>> {
    let mut combiner = SegmentCombiner::new(options);
    for entry in transcript.segments {
        combiner.push(Segment {
            start_time: parse_timestamp_value(&entry.start_time)?,
            end_time: parse_timestamp_value(&entry.end_time)?,
            speaker: entry.speaker,
            body: entry.body,
        });
    }
    Ok(combiner.finish())
}

fn parse_subtitles(items: Vec<Value>, options: &CombineOptions) -> Result<Vec<Segment>> {
    let mut combiner = SegmentCombiner::new(options);
    let mut last_speaker = String::new();

    for (position, item) in items.into_iter().enumerate() {
        let is_subtitle = item
            .as_object()
            .is_some_and(|map| SUBTITLE_KEYS.iter().all(|key| map.contains_key(*key)));
        if !is_subtitle {
            return Err(TranscriptError::format(
                TranscriptFormat::Json,
                format!(
                    "unknown JSON transcript format, entry {position} is not a start/end/text subtitle"
                ),
            ));
        }

        let subtitle: Subtitle = serde_json::from_value(item)?;
        let line = parse_speaker(&subtitle.text);
        if !line.speaker.is_empty() {
            last_speaker = line.speaker;
        }

        combiner.push(Segment {
            start_time: milliseconds_to_seconds(&subtitle.start)?,
            end_time: milliseconds_to_seconds(&subtitle.end)?,
            speaker: Some(last_speaker.clone()),
            body: line.message,
        });
    }

    Ok(combiner.finish())
}

/// Convert a millisecond count given as a number or numeric string.
fn milliseconds_to_seconds(value: &Value) -> Result<f64> {
    let milliseconds = match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };
    if milliseconds.is_nan() {
        return Err(TranscriptError::timestamp(
            value.to_string(),
            "subtitle time is not a number of milliseconds",
        ));
    }
    parse_timestamp(milliseconds / 1000.0)
}

pub struct JsonParser;

impl TranscriptParser for JsonParser {
    fn format(&self) -> TranscriptFormat {
        TranscriptFormat::Json
    }

    fn parse(&self, data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
        parse_json(data, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_object() {
        let data = r#"{"version":"1.0.0","segments":[
            {"speaker":"Alban","startTime":0.0,"endTime":4.8,"body":"It is so stinking nice to"},
            {"speaker":"Alban","startTime":"00:00:04.800","endTime":"00:00:06.210","body":"see you"}
        ]}"#;
        let segments = parse_json(data, &CombineOptions::default()).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new(0.0, 4.8, "Alban", "It is so stinking nice to"),
                Segment::new(4.8, 6.21, "Alban", "see you"),
            ]
        );
    }

    #[test]
    fn missing_speaker_stays_absent() {
        let data = r#"{"segments":[{"startTime":1,"endTime":2,"body":"hi"}]}"#;
        let segments = parse_json(data, &CombineOptions::default()).unwrap();
        assert_eq!(segments[0].speaker, None);
    }

    #[test]
    fn empty_object_and_array() {
        assert!(parse_json("{}", &CombineOptions::default()).unwrap().is_empty());
        assert!(parse_json(" [ ] ", &CombineOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn subtitle_array() {
        let data = r#"[
            {"start": 1, "end": 5000, "text": "Subtitles: @marlonrock1986 (^^V^^)"},
            {"start": "5000", "end": "7500", "text": "next line"}
        ]"#;
        let segments = parse_json(data, &CombineOptions::default()).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new(0.001, 5.0, "Subtitles", "@marlonrock1986 (^^V^^)"),
                Segment::new(5.0, 7.5, "Subtitles", "next line"),
            ]
        );
    }

    #[test]
    fn unknown_shapes_are_format_errors() {
        for data in [
            r#"{"version":"1.0.0"}"#,
            r#"{"segments":"none"}"#,
            r#"[{"startTime": 1,"endTime": 5000,"body": "Subtitles: @marlonrock1986 (^^V^^)"}]"#,
            r#"[1, 2]"#,
            "<html></html>",
        ] {
            let err = parse_json(data, &CombineOptions::default()).unwrap_err();
            assert!(err.is_format_error(), "{data}: {err}");
        }
    }

    #[test]
    fn non_numeric_subtitle_time_aborts() {
        let data = r#"[{"start": "soon", "end": 5000, "text": "hi"}]"#;
        let err = parse_json(data, &CombineOptions::default()).unwrap_err();
        assert!(err.is_grammar_error(), "{err}");
    }

    #[test]
    fn bad_time_after_valid_entries_aborts_whole_parse() {
        let data = r#"[
            {"start": 1, "end": 5000, "text": "Alban: fine"},
            {"start": 5000, "end": 6000, "text": "still fine"},
            {"start": "x", "end": 7000, "text": "broken"}
        ]"#;
        let err = parse_json(data, &CombineOptions::default()).unwrap_err();
        assert!(
            matches!(&err, TranscriptError::Timestamp { value, .. } if value == "\"x\""),
            "{err}"
        );
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = parse_json(r#"{"segments": [}"#, &CombineOptions::default()).unwrap_err();
        assert!(matches!(err, TranscriptError::Json(_)));
    }
}
