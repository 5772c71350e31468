//! Transcript format detection and parsers.
//!
//! # Supported Formats
//!
//! ## SRT
//!
//! Numbered cues separated by blank lines:
//! ```text
//! 1
//! 00:00:00,780 --> 00:00:06,210
//! Adam Curry: podcasting 2.0 March
//! ```
//!
//! ## WebVTT
//!
//! Read as an SRT dialect after the `WEBVTT` header, with optional cue numbers.
//!
//! ## JSON
//!
//! Either `{"segments": [{"startTime", "endTime", "speaker", "body"}]}` or an
//! array of `{"start", "end", "text"}` subtitles with times in milliseconds.
//!
//! ## HTML
//!
//! `<cite>Speaker:</cite><time>0:00</time><p>Text</p>` triples inside `<body>`.
//!
//! # Detection
//!
//! [`determine_format`] checks, in order: a `WEBVTT` header, an outer
//! `{}`/`[]` pair, an HTML comment or `<html>` tag, and finally whether the
//! first lines parse as an SRT cue.

pub mod html;
pub mod json;
pub mod srt;
pub mod vtt;

pub use html::HtmlParser;
pub use json::JsonParser;
pub use srt::SrtParser;
pub use vtt::VttParser;

use crate::error::{Result, TranscriptError};
use crate::{TranscriptFormat, TranscriptParser};

/// Number of leading lines inspected when probing for an SRT cue.
pub const SNIFF_LINES: usize = 20;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Classify `data` without fully parsing it.
///
/// # Errors
///
/// [`TranscriptError::UndeterminedFormat`] wrapping the SRT probe failure
/// when no format matches.
pub fn determine_format(data: &str) -> Result<TranscriptFormat> {
    let data = strip_byte_order_mark(data).trim();

    if data.starts_with(vtt::WEBVTT_HEADER) {
        return Ok(TranscriptFormat::Vtt);
    }
    if json::is_json(data) {
        return Ok(TranscriptFormat::Json);
    }
    if html::is_html_document(data) {
        return Ok(TranscriptFormat::Html);
    }

    match srt::probe(data, false) {
        Ok(_) => Ok(TranscriptFormat::Srt),
        Err(e) => Err(TranscriptError::UndeterminedFormat {
            source: Box::new(e),
        }),
    }
}

/// The parser for `format`.
pub fn parser_for(format: TranscriptFormat) -> Box<dyn TranscriptParser> {
    match format {
        TranscriptFormat::Html => Box::new(HtmlParser),
        TranscriptFormat::Json => Box::new(JsonParser),
        TranscriptFormat::Srt => Box::new(SrtParser),
        TranscriptFormat::Vtt => Box::new(VttParser),
    }
}

/// Split on `\n`, dropping a trailing `\r` from each line.
pub(crate) fn split_lines(data: &str) -> impl Iterator<Item = &str> {
    data.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

pub(crate) fn strip_byte_order_mark(data: &str) -> &str {
    data.trim_start_matches(BYTE_ORDER_MARK)
}
