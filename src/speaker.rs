//! Speaker name extraction from a line of transcript text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `Name: message`, where the name starts with a letter so that clock-like
/// text such as `2: apples` or `starts at 2:30` is left alone.
static PATTERN_SPEAKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<speaker>\p{L}.+?): (?P<body>.*)").expect("valid speaker pattern")
});

/// WebVTT voice span, `<v Name>message` or `<v.class Name>message`.
static PATTERN_VOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<v(?:\.[^\s>]*)?\s+(?P<speaker>[^>]+)>(?P<body>.*)").expect("valid voice pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeakerLine {
    /// Empty when no speaker was found.
    pub speaker: String,
    pub message: String,
}

/// Split a leading `Name: ` or `<v Name>` marker off `data`.
///
/// When neither form matches, the speaker is empty and the message is `data`
/// with leading whitespace removed.
pub fn parse_speaker(data: &str) -> SpeakerLine {
    if let Some(captures) = PATTERN_SPEAKER.captures(data) {
        return SpeakerLine {
            speaker: captures["speaker"].to_string(),
            message: captures["body"].to_string(),
        };
    }

    if let Some(captures) = PATTERN_VOICE.captures(data.trim_start()) {
        let body = &captures["body"];
        let body = body.strip_suffix("</v>").unwrap_or(body);
        return SpeakerLine {
            speaker: captures["speaker"].trim().to_string(),
            message: body.trim_start().to_string(),
        };
    }

    SpeakerLine {
        speaker: String::new(),
        message: data.trim_start().to_string(),
    }
}
