use super::srt::{self, CueBlock};
use super::strip_byte_order_mark;
use crate::error::{Result, TranscriptError};
use crate::{CombineOptions, Segment, TranscriptFormat, TranscriptParser};

pub const WEBVTT_HEADER: &str = "WEBVTT";

/// Blocks that carry no cue text.
const METADATA_BLOCKS: [&str; 3] = ["NOTE", "STYLE", "REGION"];

/// Parse WebVTT data into segments.
///
/// The `WEBVTT` line and any header metadata lines after it are skipped,
/// together with `NOTE`, `STYLE` and `REGION` blocks. Cues are then read as
/// SRT with optional cue numbers.
///
/// # Errors
///
/// [`TranscriptError::Format`] when the header is missing or the first cue
/// cannot be parsed.
pub fn parse_vtt(data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
    let unmarked = strip_byte_order_mark(data);
    let trimmed = unmarked.trim_start();
    let leading_lines = unmarked[..unmarked.len() - trimmed.len()].matches('\n').count();

    let rest = trimmed.strip_prefix(WEBVTT_HEADER).ok_or_else(|| {
        TranscriptError::format(TranscriptFormat::Vtt, "missing WEBVTT header")
    })?;

    let (cues, header_lines) = split_header(rest);
    let blocks: Vec<CueBlock<'_>> = srt::cue_blocks(cues, leading_lines + header_lines + 1)
        .into_iter()
        .filter(|block| !is_metadata_block(block))
        .collect();

    srt::parse_cue_blocks(&blocks, TranscriptFormat::Vtt, options)
}

/// Split off the rest of the `WEBVTT` line and the metadata lines that
/// follow it. Returns the remaining text and the number of lines removed.
fn split_header(rest: &str) -> (&str, usize) {
    let lines: Vec<&str> = rest.split_inclusive('\n').collect();

    let mut end = lines.len().min(1);
    while let Some(line) = lines.get(end) {
        let next_is_timing = lines.get(end + 1).is_some_and(|next| next.contains("-->"));
        if line.trim().is_empty() || line.contains("-->") || next_is_timing {
            break;
        }
        end += 1;
    }

    let consumed: usize = lines[..end].iter().map(|line| line.len()).sum();
    (&rest[consumed..], end)
}

fn is_metadata_block(block: &CueBlock<'_>) -> bool {
    let Some(first) = block.lines.first() else {
        return false;
    };
    let first = first.trim();
    METADATA_BLOCKS.iter().any(|keyword| {
        first
            .strip_prefix(*keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

pub struct VttParser;

impl TranscriptParser for VttParser {
    fn format(&self) -> TranscriptFormat {
        TranscriptFormat::Vtt
    }

    fn parse(&self, data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
        parse_vtt(data, options)
    }
}
