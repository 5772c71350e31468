//! HTML transcripts.
//!
//! The expected layout is a flat run of elements under `<body>`:
//!
//! ```html
//! <cite>Alban:</cite>
//! <time>0:00</time>
//! <p>It is so stinking nice to</p>
//! ```
//!
//! Each `cite`, `time`, `p` triple becomes one segment. A segment has no end
//! time of its own; the previous segment's end is set to the next segment's
//! start, and the last segment keeps an end time of `0`.
//!
//! Elements are found at any depth below the root, so a `<cite>` nested in a
//! wrapper `<div>` is read the same as a direct child.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TranscriptError};
use crate::segments::SegmentCombiner;
use crate::timestamp::parse_timestamp;
use crate::{CombineOptions, Segment, TranscriptFormat, TranscriptParser};

static PATTERN_HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^<\s*html.*?>").expect("valid html tag pattern"));

static PATTERN_HTML_TIME_P: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<time>\d[\d:.,]*?</time>\s*?<p>.*?</p>").expect("valid time/p pattern")
});

static PATTERN_HTML_P_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<p>.*?</p>\s*?<time>\d[\d:.,]*?</time>").expect("valid p/time pattern")
});

static PATTERN_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

static PATTERN_HTML_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<html\b[^>]*>(?P<inner>.*?)(?:</html\s*>|\z)").expect("valid html pattern")
});

static PATTERN_BODY_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(?P<inner>.*?)(?:</body\s*>|\z)").expect("valid body pattern")
});

static PATTERN_TRANSCRIPT_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?is)<cite\b[^>]*>(?P<cite>.*?)</cite\s*>",
        r"|<time\b[^>]*>(?P<time>.*?)</time\s*>",
        r"|<p\b[^>]*>(?P<p>.*?)</p\s*>",
    ))
    .expect("valid transcript element pattern")
});

/// True for data that starts with an HTML comment or an `<html>` tag.
pub fn is_html_document(data: &str) -> bool {
    let data = data.trim();
    data.starts_with("<!--") || PATTERN_HTML_TAG.is_match(data)
}

/// [`is_html_document`], or a fragment with an adjacent `<time>`/`<p>` pair.
pub fn is_html(data: &str) -> bool {
    is_html_document(data)
        || PATTERN_HTML_TIME_P.is_match(data)
        || PATTERN_HTML_P_TIME.is_match(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element<'a> {
    Cite(&'a str),
    Time(&'a str),
    Paragraph(&'a str),
}

/// Elements seen since the last emitted segment.
#[derive(Debug)]
enum Pending<'a> {
    Empty,
    Cite(&'a str),
    CiteAndTime { cite: &'a str, time: &'a str },
}

/// Inner text of `<body>` inside `<html>`, or of `<html>` when there is no
/// body. Fragments without `<html>` are read whole.
fn locate_root(data: &str) -> Result<&str> {
    if let Some(html) = PATTERN_HTML_ELEMENT.captures(data).and_then(|c| c.name("inner")) {
        let html = html.as_str();
        let body = PATTERN_BODY_ELEMENT
            .captures(html)
            .and_then(|c| c.name("inner"))
            .map(|m| m.as_str());
        return Ok(body.unwrap_or(html));
    }

    if PATTERN_HTML_TIME_P.is_match(data) || PATTERN_HTML_P_TIME.is_match(data) {
        return Ok(data);
    }

    Err(TranscriptError::format(
        TranscriptFormat::Html,
        "cannot locate <html> root",
    ))
}

fn elements(root: &str) -> impl Iterator<Item = Element<'_>> {
    PATTERN_TRANSCRIPT_ELEMENT.captures_iter(root).filter_map(|captures| {
        if let Some(cite) = captures.name("cite") {
            Some(Element::Cite(cite.as_str()))
        } else if let Some(time) = captures.name("time") {
            Some(Element::Time(time.as_str()))
        } else {
            captures.name("p").map(|p| Element::Paragraph(p.as_str()))
        }
    })
}

struct HtmlSegments<'o> {
    combiner: SegmentCombiner<'o>,
    last_speaker: String,
}

impl HtmlSegments<'_> {
    fn emit(&mut self, cite: &str, time: &str, body: &str) {
        let start_time = match parse_timestamp(time.trim()) {
            Ok(start_time) => start_time,
            Err(e) => {
                log::warn!("Skipping HTML segment for {:?}: {e}", cite.trim());
                return;
            }
        };

        let speaker = cite.replacen(':', "", 1).trim().to_string();
        if !speaker.is_empty() {
            self.last_speaker = speaker;
        }

        if let Some(previous) = self.combiner.last_mut() {
            previous.end_time = start_time;
        }

        self.combiner.push(Segment {
            start_time,
            end_time: 0.0,
            speaker: Some(self.last_speaker.clone()),
            body: body.to_string(),
        });
    }
}

/// Parse HTML data into segments.
///
/// Out-of-order elements are logged and skipped. A trailing `cite`, `time`
/// pair without a paragraph is kept with an empty body.
///
/// # Errors
///
/// [`TranscriptError::Format`] when the data does not look like HTML or has
/// no `<html>` root to read from.
pub fn parse_html(data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
    let data = super::strip_byte_order_mark(data).trim();
    if !is_html(data) {
        return Err(TranscriptError::format(
            TranscriptFormat::Html,
            "expected an HTML comment, an <html> tag or <time>/<p> elements",
        ));
    }

    let without_comments = PATTERN_COMMENT.replace_all(data, "");
    let root = locate_root(&without_comments)?;

    let mut output = HtmlSegments {
        combiner: SegmentCombiner::new(options),
        last_speaker: String::new(),
    };
    let mut pending = Pending::Empty;

    for element in elements(root) {
        pending = match (pending, element) {
            (Pending::Empty, Element::Cite(cite)) => Pending::Cite(cite),
            (Pending::Cite(previous), Element::Cite(cite)) => {
                log::warn!(
                    "Replacing <cite>{previous}</cite> with <cite>{cite}</cite>, no <time> in between"
                );
                Pending::Cite(cite)
            }
            (Pending::CiteAndTime { cite: previous, .. }, Element::Cite(cite)) => {
                log::warn!(
                    "Dropping <cite>{previous}</cite> without <p>, found <cite>{cite}</cite>"
                );
                Pending::Cite(cite)
            }
            (Pending::Empty, Element::Time(time)) => {
                log::warn!("Ignoring <time>{time}</time> without a preceding <cite>");
                Pending::Empty
            }
            (Pending::Cite(cite), Element::Time(time)) => Pending::CiteAndTime { cite, time },
            (pending @ Pending::CiteAndTime { .. }, Element::Time(time)) => {
                log::warn!("Ignoring extra <time>{time}</time>");
                pending
            }
            (Pending::CiteAndTime { cite, time }, Element::Paragraph(body)) => {
                output.emit(cite, time, body);
                Pending::Empty
            }
            (pending, Element::Paragraph(_)) => {
                log::warn!("Ignoring <p> without a preceding <cite> and <time>");
                pending
            }
        };
    }

    match pending {
        Pending::CiteAndTime { cite, time } => output.emit(cite, time, ""),
        Pending::Cite(cite) => log::warn!("Dropping trailing <cite>{cite}</cite> without <time>"),
        Pending::Empty => {}
    }

    Ok(output.combiner.finish())
}

pub struct HtmlParser;

impl TranscriptParser for HtmlParser {
    fn format(&self) -> TranscriptFormat {
        TranscriptFormat::Html
    }

    fn parse(&self, data: &str, options: &CombineOptions) -> Result<Vec<Segment>> {
        parse_html(data, options)
    }
}
