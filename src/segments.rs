//! Segment combination engine.
//!
//! Parsers push every raw segment through a [`SegmentCombiner`]. With no rule
//! enabled a segment is appended unchanged. Otherwise the rules run in a fixed
//! order, each only when the one before it did not merge:
//!
//! 1. `combine_speaker`: merge with the previous segment when the speaker is
//!    the same.
//! 2. `combine_segments`: same, but only while the joined body fits in
//!    `combine_segments_length` characters.
//! 3. `combine_equal_times`: merge when start, end and speaker are all equal,
//!    joining bodies with `combine_equal_times_separator`.
//! 4. `speaker_change`: hide the speaker of a segment that repeats the
//!    previous speaker. This never merges.
//!
//! A merge keeps the previous segment's start time and speaker, takes the new
//! end time, and replaces the previous segment in place. Segments are never
//! reordered and only adjacent segments are merged.
//!
//! Because rule 4 hides speaker names that rules 1 to 3 compare against, the
//! combiner tracks the last speaker name it has seen separately from the
//! displayed `speaker` field of the emitted segments.

use crate::options::{
    CombineOptions, DEFAULT_COMBINE_EQUAL_TIMES_SEPARATOR, DEFAULT_COMBINE_SEGMENTS_LENGTH,
};
use crate::Segment;

/// Characters that attach to the preceding word without a separator.
const HUGGING_PUNCTUATION: &[char] = &['.', ',', '?', '!', ')', ']', '}', '>'];

struct CombineResult {
    segment: Segment,
    /// The segment replaces the last emitted segment instead of being appended.
    replace: bool,
    /// A rule changed the segment.
    combined: bool,
}

impl CombineResult {
    fn unchanged(segment: Segment) -> Self {
        Self {
            segment,
            replace: false,
            combined: false,
        }
    }

    fn merged(segment: Segment) -> Self {
        Self {
            segment,
            replace: true,
            combined: true,
        }
    }
}

/// Accumulates the combined output of a single conversion.
pub struct SegmentCombiner<'o> {
    options: &'o CombineOptions,
    segments: Vec<Segment>,
    last_speaker: Option<String>,
}

impl<'o> SegmentCombiner<'o> {
    pub fn new(options: &'o CombineOptions) -> Self {
        Self {
            options,
            segments: Vec::new(),
            last_speaker: None,
        }
    }

    /// Continue combining after `segments`, recovering the last speaker name
    /// from the most recent segment that still shows one.
    pub fn resume(options: &'o CombineOptions, segments: Vec<Segment>) -> Self {
        let last_speaker = segments.iter().rev().find_map(|s| s.speaker.clone());
        Self {
            options,
            segments,
            last_speaker,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The most recently emitted segment, for formats that learn a segment's
    /// end time only when the next one starts.
    pub fn last_mut(&mut self) -> Option<&mut Segment> {
        self.segments.last_mut()
    }

    pub fn finish(self) -> Vec<Segment> {
        self.segments
    }

    /// Add a segment, appending it or merging it into the last one.
    pub fn push(&mut self, segment: Segment) {
        if !self.options.any_enabled() {
            self.remember_speaker(&segment);
            self.segments.push(segment);
            return;
        }

        let result = match self.segments.last() {
            None => self.combine_no_prior(segment),
            Some(prior) => self.combine_with_prior(segment, prior),
        };

        self.remember_speaker(&result.segment);
        if result.replace {
            if let Some(last) = self.segments.last_mut() {
                *last = result.segment;
                return;
            }
        }
        self.segments.push(result.segment);
    }

    fn remember_speaker(&mut self, segment: &Segment) {
        if let Some(speaker) = &segment.speaker {
            self.last_speaker = Some(speaker.clone());
        }
    }

    /// Last speaker for rule comparisons. Only consulted with `speaker_change`,
    /// the only rule that hides names.
    fn last_speaker(&self) -> Option<Option<&String>> {
        self.options
            .speaker_change
            .then_some(self.last_speaker.as_ref())
    }

    fn same_speaker(&self, new: &Segment, prior: &Segment) -> bool {
        new.speaker == prior.speaker || self.last_speaker() == Some(new.speaker.as_ref())
    }

    fn combine_no_prior(&self, segment: Segment) -> CombineResult {
        if self.options.speaker_change && self.last_speaker() == Some(segment.speaker.as_ref()) {
            return CombineResult {
                segment: Segment {
                    speaker: None,
                    ..segment
                },
                replace: false,
                combined: true,
            };
        }
        CombineResult::unchanged(segment)
    }

    fn combine_with_prior(&self, segment: Segment, prior: &Segment) -> CombineResult {
        let options = self.options;
        let mut result = CombineResult::unchanged(segment);

        if options.combine_speaker {
            result = self.combine_speaker(result.segment, prior);
        }
        if !result.combined && options.combine_segments {
            result = self.combine_segments(result.segment, prior);
        }
        if !result.combined && options.combine_equal_times {
            result = self.combine_equal_times(result.segment, prior);
        }
        // A merged segment already shows the speaker the way `prior` did.
        if options.speaker_change && !result.replace {
            result = self.speaker_change(result.segment, prior);
        }
        result
    }

    fn combine_speaker(&self, segment: Segment, prior: &Segment) -> CombineResult {
        if self.same_speaker(&segment, prior) {
            return CombineResult::merged(join_segments(prior, &segment, " "));
        }
        CombineResult::unchanged(segment)
    }

    fn combine_segments(&self, segment: Segment, prior: &Segment) -> CombineResult {
        let max_length = match self.options.combine_segments_length {
            0 => DEFAULT_COMBINE_SEGMENTS_LENGTH,
            length => length,
        };

        if self.same_speaker(&segment, prior)
            && join_body(&prior.body, &segment.body, " ").chars().count() <= max_length
        {
            return CombineResult::merged(join_segments(prior, &segment, " "));
        }
        CombineResult::unchanged(segment)
    }

    fn combine_equal_times(&self, segment: Segment, prior: &Segment) -> CombineResult {
        let separator = match self.options.combine_equal_times_separator.as_str() {
            "" => DEFAULT_COMBINE_EQUAL_TIMES_SEPARATOR,
            separator => separator,
        };

        if segment.start_time == prior.start_time
            && segment.end_time == prior.end_time
            && self.same_speaker(&segment, prior)
        {
            return CombineResult::merged(join_segments(prior, &segment, separator));
        }
        CombineResult::unchanged(segment)
    }

    fn speaker_change(&self, segment: Segment, prior: &Segment) -> CombineResult {
        let Some(speaker) = segment.speaker.as_ref() else {
            return CombineResult::unchanged(segment);
        };

        if speaker.is_empty()
            || segment.speaker == prior.speaker
            || self.last_speaker.as_ref() == Some(speaker)
        {
            return CombineResult {
                segment: Segment {
                    speaker: None,
                    ..segment
                },
                replace: false,
                combined: true,
            };
        }
        CombineResult::unchanged(segment)
    }
}

/// Add `new_segment` after `prior_segments` under `options`, returning the
/// updated list. The last prior segment may be replaced by a merge.
pub fn add_segment(
    new_segment: Segment,
    prior_segments: Vec<Segment>,
    options: &CombineOptions,
) -> Vec<Segment> {
    let mut combiner = SegmentCombiner::resume(options, prior_segments);
    combiner.push(new_segment);
    combiner.finish()
}

/// Join `addition` onto `body` with `separator`, leaving out the separator
/// when `addition` starts with whitespace or punctuation that attaches to the
/// previous word.
pub fn join_body(body: &str, addition: &str, separator: &str) -> String {
    if body.is_empty() {
        return addition.to_string();
    }

    let hugs = addition.starts_with(char::is_whitespace)
        || addition
            .trim_start_matches(' ')
            .starts_with(HUGGING_PUNCTUATION);
    let separator = if hugs { "" } else { separator };
    format!("{body}{separator}{addition}")
}

fn join_segments(prior: &Segment, new: &Segment, separator: &str) -> Segment {
    Segment {
        start_time: prior.start_time,
        end_time: new.end_time,
        speaker: prior.speaker.clone(),
        body: join_body(&prior.body, &new.body, separator),
    }
}
