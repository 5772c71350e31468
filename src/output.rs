use serde::Serialize;

use crate::timestamp::format_timestamp;
use crate::{Segment, TranscriptFormat};

/// Serializable segment with times both in seconds and formatted.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    pub start_time: f64,
    pub start_time_formatted: String,
    pub end_time: f64,
    pub end_time_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub body: String,
}

impl From<&Segment> for SegmentRecord {
    fn from(value: &Segment) -> Self {
        Self {
            start_time: value.start_time,
            start_time_formatted: format_timestamp(value.start_time),
            end_time: value.end_time,
            end_time_formatted: format_timestamp(value.end_time),
            speaker: value.speaker.clone(),
            body: value.body.clone(),
        }
    }
}

/// A converted transcript, as written by the command line tool.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TranscriptDocument {
    pub format: TranscriptFormat,
    pub segments: Vec<SegmentRecord>,
}

impl TranscriptDocument {
    pub fn new(format: TranscriptFormat, segments: &[Segment]) -> Self {
        Self {
            format,
            segments: segments.iter().map(SegmentRecord::from).collect(),
        }
    }

    /// Plain text of every segment, one per line.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.body.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
