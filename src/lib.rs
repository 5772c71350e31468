pub mod convert;
pub mod error;
pub mod formats;
pub mod options;
pub mod output;
pub mod segments;
pub mod speaker;
pub mod timestamp;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use convert::{
    combine_single_word_segments, convert_file, convert_file_with_options, determine_format,
};
pub use error::{Result, TranscriptError};
pub use options::{CombineOptions, OptionOverrides};

/// A timed piece of speech.
///
/// `end_time` may be `0` or smaller than `start_time` for a trailing segment
/// whose real end is unknown. `speaker` is `None` once the speaker-change rule
/// has hidden a repeated name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default)]
    pub body: String,
}

impl Segment {
    pub fn new(
        start_time: f64,
        end_time: f64,
        speaker: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            start_time,
            end_time,
            speaker: Some(speaker.into()),
            body: body.into(),
        }
    }

    /// Speaker name, empty when unknown or hidden.
    pub fn speaker_name(&self) -> &str {
        self.speaker.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    Html,
    Json,
    /// [SubRip](https://en.wikipedia.org/wiki/SubRip)
    Srt,
    /// [WebVTT](https://en.wikipedia.org/wiki/WebVTT)
    Vtt,
}

impl TranscriptFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptFormat::Html => "html",
            TranscriptFormat::Json => "json",
            TranscriptFormat::Srt => "srt",
            TranscriptFormat::Vtt => "vtt",
        }
    }
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranscriptFormat {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(TranscriptFormat::Html),
            "json" => Ok(TranscriptFormat::Json),
            "srt" => Ok(TranscriptFormat::Srt),
            "vtt" | "webvtt" => Ok(TranscriptFormat::Vtt),
            _ => Err(TranscriptError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// A parser for one transcript format.
///
/// Every parser feeds the segments it reads through the combination engine
/// using the `options` it is given.
pub trait TranscriptParser {
    fn format(&self) -> TranscriptFormat;

    fn parse(&self, data: &str, options: &CombineOptions) -> Result<Vec<Segment>>;
}
