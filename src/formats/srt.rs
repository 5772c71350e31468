use super::{split_lines, SNIFF_LINES};
use crate::error::{Result, TranscriptError};
use crate::segments::SegmentCombiner;
use crate::speaker::parse_speaker;
use crate::timestamp::parse_timestamp;
use crate::{CombineOptions, Segment, TranscriptFormat, TranscriptParser};

const TIMESTAMP_SEPARATOR: &str = "-->";

/// A cue as read from SRT text, before speaker carry-forward and combining.
#[derive(Debug, Clone, PartialEq)]
pub struct SrtSegment {
    /// Cue number, `-1` when absent and optional.
    pub index: i64,
    pub start_time: f64,
    pub end_time: f64,
    pub speaker: String,
    pub body: String,
}

/// Lines of one cue with the source line number of its first line.
pub(crate) struct CueBlock<'a> {
    pub first_line: usize,
    pub lines: Vec<&'a str>,
}

/// Parse the lines of a single cue.
///
/// Leading blank lines are skipped. A cue needs an index line, a
/// `start --> end` line and at least one body line. With `index_optional`
/// the index may be missing (reported as `-1`) or be a non-numeric cue
/// identifier, and the body may be empty.
///
/// # Errors
///
/// [`TranscriptError::Cue`] for a missing or invalid index or timestamp line,
/// [`TranscriptError::Timestamp`] when either time does not parse.
pub fn parse_srt_segment(lines: &[&str], index_optional: bool) -> Result<SrtSegment> {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .ok_or_else(|| TranscriptError::Cue("SRT segment lines empty".to_string()))?;
    let lines = &lines[start..];

    let min_line_count = if index_optional { 2 } else { 3 };
    if lines.len() < min_line_count {
        return Err(TranscriptError::Cue(format!(
            "SRT requires at least {min_line_count} lines, {} received",
            lines.len()
        )));
    }

    let (index, timestamp_line) = match lines[0].trim().parse::<i64>() {
        Ok(index) if index != 0 => (index, 1),
        _ if index_optional => {
            let is_identifier = !lines[0].contains(TIMESTAMP_SEPARATOR)
                && lines[1].contains(TIMESTAMP_SEPARATOR);
            (-1, usize::from(is_identifier))
        }
        _ => {
            return Err(TranscriptError::Cue(format!(
                "first line of SRT segment is not a number: {:?}",
                lines[0]
            )))
        }
    };

    let (start_time, end_time) = parse_timing_line(lines[timestamp_line])?;

    let mut body_lines = &lines[timestamp_line + 1..];
    if let Some(blank) = body_lines.iter().position(|line| line.trim().is_empty()) {
        if blank > 0 {
            body_lines = &body_lines[..blank];
        }
    }

    let (speaker, body) = match body_lines.split_first() {
        Some((first, rest)) => {
            let line = parse_speaker(first);
            let body = std::iter::once(line.message.as_str())
                .chain(rest.iter().copied())
                .collect::<Vec<_>>()
                .join("\n");
            (line.speaker, body)
        }
        None => (String::new(), String::new()),
    };

    Ok(SrtSegment {
        index,
        start_time,
        end_time,
        speaker,
        body,
    })
}

fn parse_timing_line(line: &str) -> Result<(f64, f64)> {
    if !line.contains(TIMESTAMP_SEPARATOR) {
        return Err(TranscriptError::Cue(format!(
            "SRT timestamp line does not include {TIMESTAMP_SEPARATOR} separator: {line:?}"
        )));
    }

    let parts: Vec<&str> = line.split(TIMESTAMP_SEPARATOR).collect();
    if parts.len() != 2 {
        return Err(TranscriptError::Cue(format!(
            "SRT timestamp line contains more than one {TIMESTAMP_SEPARATOR} separator: {line:?}"
        )));
    }

    let start_time = parse_timestamp(parts[0].trim())?;
    // WebVTT cue settings (`align:start`, `line:0`) may follow the end time.
    let end = parts[1].split_whitespace().next().unwrap_or_default();
    let end_time = parse_timestamp(end)?;
    Ok((start_time, end_time))
}

/// Group lines into blank-line separated cue blocks.
pub(crate) fn cue_blocks(data: &str, first_line: usize) -> Vec<CueBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<CueBlock<'_>> = None;

    for (offset, line) in split_lines(data).enumerate() {
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
        } else {
            current
                .get_or_insert_with(|| CueBlock {
                    first_line: first_line + offset,
                    lines: Vec::new(),
                })
                .lines
                .push(line);
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Parse the first cue of `data`, reading at most [`SNIFF_LINES`] lines.
pub(crate) fn probe(data: &str, index_optional: bool) -> Result<SrtSegment> {
    let head: Vec<&str> = split_lines(data).take(SNIFF_LINES).collect();
    parse_srt_segment(&head, index_optional)
}

/// Parse cue blocks into combined segments.
///
/// The first block decides whether the data is in `format` at all. After
/// that, cues that fail to parse are logged and skipped.
pub(crate) fn parse_cue_blocks(
    blocks: &[CueBlock<'_>],
    format: TranscriptFormat,
    options: &CombineOptions,
) -> Result<Vec<Segment>> {
    let index_optional = format == TranscriptFormat::Vtt;

    let first = blocks.first().map(|b| b.lines.as_slice()).unwrap_or_default();
    parse_srt_segment(&first[..first.len().min(SNIFF_LINES)], index_optional).map_err(|e| {
        log::error!("Unable to parse data as {format}: {e}");
        TranscriptError::format(format, e.to_string())
    })?;

    let mut combiner = SegmentCombiner::new(options);
    let mut last_speaker = String::new();

    for block in blocks {
        let cue = match parse_srt_segment(&block.lines, index_optional) {
            Ok(cue) => cue,
            Err(e) => {
                log::warn!(
                    "Error parsing {format} segment lines (source line {}): {e}",
                    block.first_line
                );
                log::debug!("Skipped lines: {:?}", block.lines);
                continue;
            }
        };

        if !cue.speaker.is_empty() {
            last_speaker = cue.speaker;
        }
        combiner.push(Segment {
            start_time: cue.start_time,
            end_time: cue.end_time,
            speaker: Some(last_speaker.clone()),
            body: cue.body,
        });
    }

    Ok(combiner.finish())
}

/// Parse SRT data into segments.
///
/// # Errors
///
/// [`TranscriptError::Format`] when the first cue cannot be parsed.
pub fn parse_srt(data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
    let blocks = cue_blocks(super::strip_byte_order_mark(data), 1);
    parse_cue_blocks(&blocks, TranscriptFormat::Srt, options)
}

pub struct SrtParser;

impl TranscriptParser for SrtParser {
    fn format(&self) -> TranscriptFormat {
        TranscriptFormat::Srt
    }

    fn parse(&self, data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
        parse_srt(data, options)
    }
}
