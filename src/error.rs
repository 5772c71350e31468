//! Error types returned by the transcript conversion pipeline.
//!
//! Errors fall into three families:
//!
//! - **format** errors: the input does not look like the requested or detected
//!   format (wrong magic header, unrecognised JSON shape, no SRT cue where one
//!   was expected). Always fatal to the call.
//! - **grammar** errors: a malformed timestamp or cue. Fatal for the JSON array
//!   form, but the SRT/VTT and HTML parsers log them and skip the offending
//!   cue or element.
//! - **configuration** errors: a recognised option was given a value of the
//!   wrong type. Raised by the setter, never deferred to conversion time.

use crate::TranscriptFormat;

pub type Result<T> = std::result::Result<T, TranscriptError>;

#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("data is not valid {format} format: {message}")]
    Format {
        format: TranscriptFormat,
        message: String,
    },

    #[error("cannot determine transcript format")]
    UndeterminedFormat {
        #[source]
        source: Box<TranscriptError>,
    },

    #[error("unsupported transcript format: {0}")]
    UnsupportedFormat(String),

    #[error("segment body is not a single word: {0:?}")]
    NotSingleWord(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("malformed cue: {0}")]
    Cue(String),

    #[error("invalid type {found} for option {name}, expected {expected}")]
    Configuration {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscriptError {
    pub(crate) fn format(format: TranscriptFormat, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Timestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True when the input did not match the requested or detected format.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Format { .. }
                | Self::UndeterminedFormat { .. }
                | Self::UnsupportedFormat(_)
                | Self::NotSingleWord(_)
                | Self::Json(_)
        )
    }

    /// True for malformed timestamps and cues.
    pub fn is_grammar_error(&self) -> bool {
        matches!(self, Self::Timestamp { .. } | Self::Cue(_))
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
