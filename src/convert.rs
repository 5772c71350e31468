//! Entry points for converting transcript text into segments.

use crate::error::{Result, TranscriptError};
use crate::formats::{self, SNIFF_LINES};
use crate::options::{current_options, CombineOptions};
use crate::segments::SegmentCombiner;
use crate::{Segment, TranscriptFormat};

/// Detect the format of `data`. See [`formats::determine_format`].
pub fn determine_format(data: &str) -> Result<TranscriptFormat> {
    formats::determine_format(data)
}

/// Convert `data` using the process-wide options.
///
/// When `format` is `None` it is detected with [`determine_format`]. An
/// explicit format is trusted, and data that does not match it fails with
/// that parser's format error.
pub fn convert_file(data: &str, format: Option<TranscriptFormat>) -> Result<Vec<Segment>> {
    let options = current_options();
    convert_file_with_options(data, format, &options)
}

/// Convert `data` using the given options.
pub fn convert_file_with_options(
    data: &str,
    format: Option<TranscriptFormat>,
    options: &CombineOptions,
) -> Result<Vec<Segment>> {
    let format = match format {
        Some(format) => format,
        None => determine_format(data)?,
    };

    log::debug!("Converting {} bytes as {format}", data.len());
    let segments = formats::parser_for(format).parse(data, options)?;
    log::info!("Converted {format} transcript into {} segments", segments.len());
    Ok(segments)
}

/// Group single-word segments into phrases of at most `max_length`
/// characters.
///
/// Consecutive words from the same speaker are joined with a space; a change
/// of speaker always starts a new phrase. A `max_length` of `0` uses the
/// default of 32.
///
/// # Errors
///
/// [`TranscriptError::NotSingleWord`] when any of the first segments has a
/// body with more than one word.
pub fn combine_single_word_segments(
    segments: &[Segment],
    max_length: usize,
) -> Result<Vec<Segment>> {
    if let Some(segment) = segments
        .iter()
        .take(SNIFF_LINES)
        .find(|segment| segment.body.trim().contains(char::is_whitespace))
    {
        return Err(TranscriptError::NotSingleWord(segment.body.clone()));
    }

    let options = CombineOptions {
        combine_segments: true,
        combine_segments_length: max_length,
        ..CombineOptions::default()
    };
    let mut combiner = SegmentCombiner::new(&options);
    for segment in segments {
        combiner.push(segment.clone());
    }
    Ok(combiner.finish())
}
