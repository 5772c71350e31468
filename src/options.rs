//! Segment combination options.
//!
//! [`CombineOptions`] is a plain value passed to every parser and to the
//! combination engine. A process-wide default instance is kept here for
//! callers that want to configure once and convert many inputs; it is only
//! read by [`crate::convert_file`] and friends, never by the core algorithms.
//!
//! Callers that convert on several threads with different settings should
//! pass their own [`CombineOptions`] to [`crate::convert_file_with_options`]
//! instead of mutating the shared default.

use std::path::Path;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TranscriptError};
use crate::timestamp::json_type_name;

pub const DEFAULT_COMBINE_SEGMENTS_LENGTH: usize = 32;
pub const DEFAULT_COMBINE_EQUAL_TIMES_SEPARATOR: &str = "\n";

pub const COMBINE_EQUAL_TIMES: &str = "combineEqualTimes";
pub const COMBINE_EQUAL_TIMES_SEPARATOR: &str = "combineEqualTimesSeparator";
pub const COMBINE_SEGMENTS: &str = "combineSegments";
pub const COMBINE_SEGMENTS_LENGTH: &str = "combineSegmentsLength";
pub const COMBINE_SPEAKER: &str = "combineSpeaker";
pub const SPEAKER_CHANGE: &str = "speakerChange";

static OPTIONS: Lazy<RwLock<CombineOptions>> = Lazy::new(|| RwLock::new(CombineOptions::default()));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombineOptions {
    /// Merge consecutive segments whose start time, end time and speaker all
    /// match. Bodies are joined with [`Self::combine_equal_times_separator`].
    pub combine_equal_times: bool,
    pub combine_equal_times_separator: String,
    /// Merge consecutive same-speaker segments while the joined body stays
    /// within [`Self::combine_segments_length`] characters.
    pub combine_segments: bool,
    pub combine_segments_length: usize,
    /// Merge every run of consecutive segments from the same speaker.
    pub combine_speaker: bool,
    /// Only keep the speaker on a segment when it differs from the previous one.
    pub speaker_change: bool,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            combine_equal_times: false,
            combine_equal_times_separator: DEFAULT_COMBINE_EQUAL_TIMES_SEPARATOR.to_string(),
            combine_segments: false,
            combine_segments_length: DEFAULT_COMBINE_SEGMENTS_LENGTH,
            combine_speaker: false,
            speaker_change: false,
        }
    }
}

/// Partial set of options. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub combine_equal_times: Option<bool>,
    pub combine_equal_times_separator: Option<String>,
    pub combine_segments: Option<bool>,
    pub combine_segments_length: Option<usize>,
    pub combine_speaker: Option<bool>,
    pub speaker_change: Option<bool>,
}

impl CombineOptions {
    /// True when at least one combination rule is enabled.
    pub fn any_enabled(&self) -> bool {
        self.combine_equal_times
            || self.combine_segments
            || self.combine_speaker
            || self.speaker_change
    }

    pub fn apply(&mut self, overrides: &OptionOverrides) {
        if let Some(value) = overrides.combine_equal_times {
            self.combine_equal_times = value;
        }
        if let Some(value) = &overrides.combine_equal_times_separator {
            self.combine_equal_times_separator = value.clone();
        }
        if let Some(value) = overrides.combine_segments {
            self.combine_segments = value;
        }
        if let Some(value) = overrides.combine_segments_length {
            self.combine_segments_length = value;
        }
        if let Some(value) = overrides.combine_speaker {
            self.combine_speaker = value;
        }
        if let Some(value) = overrides.speaker_change {
            self.speaker_change = value;
        }
    }

    /// Look up an option by its camelCase name.
    pub fn get(&self, name: &str) -> Option<Value> {
        let value = match name {
            COMBINE_EQUAL_TIMES => Value::from(self.combine_equal_times),
            COMBINE_EQUAL_TIMES_SEPARATOR => {
                Value::from(self.combine_equal_times_separator.clone())
            }
            COMBINE_SEGMENTS => Value::from(self.combine_segments),
            COMBINE_SEGMENTS_LENGTH => Value::from(self.combine_segments_length),
            COMBINE_SPEAKER => Value::from(self.combine_speaker),
            SPEAKER_CHANGE => Value::from(self.speaker_change),
            _ => return None,
        };
        Some(value)
    }

    /// Set an option by its camelCase name.
    ///
    /// Unknown names are ignored with a warning.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::Configuration`] when `value` has the wrong type.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            COMBINE_EQUAL_TIMES => self.combine_equal_times = expect_bool(name, value)?,
            COMBINE_EQUAL_TIMES_SEPARATOR => {
                self.combine_equal_times_separator = value
                    .as_str()
                    .ok_or_else(|| configuration_error(name, "string", value))?
                    .to_string();
            }
            COMBINE_SEGMENTS => self.combine_segments = expect_bool(name, value)?,
            COMBINE_SEGMENTS_LENGTH => {
                let length = value
                    .as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| configuration_error(name, "non-negative integer", value))?;
                self.combine_segments_length = length;
            }
            COMBINE_SPEAKER => self.combine_speaker = expect_bool(name, value)?,
            SPEAKER_CHANGE => self.speaker_change = expect_bool(name, value)?,
            _ => log::warn!("Ignoring unknown option {name}"),
        }
        Ok(())
    }

    /// Apply every key of a JSON object. `null` applies nothing.
    pub fn apply_json(&mut self, options: &Value) -> Result<()> {
        match options {
            Value::Null => Ok(()),
            Value::Object(map) => map.iter().try_for_each(|(name, value)| self.set(name, value)),
            other => Err(configuration_error("options", "object", other)),
        }
    }

    /// Load options from a JSON file of camelCase keys. Missing keys keep
    /// their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        let mut options = Self::default();
        options.apply_json(&value)?;
        log::debug!("Loaded combine options from {}: {:?}", path.display(), options);
        Ok(options)
    }
}

fn expect_bool(name: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| configuration_error(name, "boolean", value))
}

fn configuration_error(name: &str, expected: &'static str, found: &Value) -> TranscriptError {
    TranscriptError::Configuration {
        name: name.to_string(),
        expected,
        found: json_type_name(found).to_string(),
    }
}

/// Snapshot of the process-wide options.
pub fn current_options() -> CombineOptions {
    OPTIONS.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Update the process-wide options. With `reset`, every option not named in
/// `overrides` goes back to its default first.
pub fn set_options(overrides: &OptionOverrides, reset: bool) {
    let mut options = OPTIONS.write().unwrap_or_else(|e| e.into_inner());
    if reset {
        *options = CombineOptions::default();
    }
    options.apply(overrides);
}

/// Same as [`set_options`] with the overrides given as a JSON object.
///
/// The shared options are only replaced when every value type checks.
pub fn set_options_from_json(overrides: &Value, reset: bool) -> Result<()> {
    let mut options = OPTIONS.write().unwrap_or_else(|e| e.into_inner());
    let mut updated = if reset {
        CombineOptions::default()
    } else {
        options.clone()
    };
    updated.apply_json(overrides)?;
    *options = updated;
    Ok(())
}

pub fn set_option_by_name(name: &str, value: &Value) -> Result<()> {
    OPTIONS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .set(name, value)
}

pub fn get_option_by_name(name: &str) -> Option<Value> {
    OPTIONS.read().unwrap_or_else(|e| e.into_inner()).get(name)
}

pub fn restore_default_options() {
    *OPTIONS.write().unwrap_or_else(|e| e.into_inner()) = CombineOptions::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let options = CombineOptions::default();
        assert!(!options.any_enabled());
        assert_eq!(options.combine_equal_times_separator, "\n");
        assert_eq!(options.combine_segments_length, 32);
    }

    #[test]
    fn set_by_name_round_trips_through_get() {
        let mut options = CombineOptions::default();
        options.set(COMBINE_EQUAL_TIMES_SEPARATOR, &json!("<br/>")).unwrap();
        options.set(COMBINE_SEGMENTS_LENGTH, &json!(20)).unwrap();
        options.set(SPEAKER_CHANGE, &json!(true)).unwrap();

        assert_eq!(options.get(COMBINE_EQUAL_TIMES_SEPARATOR), Some(json!("<br/>")));
        assert_eq!(options.get(COMBINE_SEGMENTS_LENGTH), Some(json!(20)));
        assert_eq!(options.get(SPEAKER_CHANGE), Some(json!(true)));
        assert!(options.any_enabled());
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut options = CombineOptions::default();
        options.set("combineTime", &json!(true)).unwrap();
        assert_eq!(options, CombineOptions::default());
        assert_eq!(options.get("combineTime"), None);
    }

    #[test]
    fn wrong_types_are_configuration_errors() {
        let cases = [
            json!({ "combineEqualTimes": "true" }),
            json!({ "combineEqualTimesSeparator": 1 }),
            json!({ "combineSegments": "false" }),
            json!({ "combineSegmentsLength": "20" }),
            json!({ "combineSegmentsLength": 20.5 }),
            json!({ "speakerChange": null }),
        ];
        for case in cases {
            let err = CombineOptions::default().apply_json(&case).unwrap_err();
            assert!(err.is_configuration_error(), "{case}: {err}");
        }
    }

    #[test]
    fn apply_overrides_only_touches_named_fields() {
        let mut options = CombineOptions {
            combine_speaker: true,
            ..CombineOptions::default()
        };
        options.apply(&OptionOverrides {
            speaker_change: Some(true),
            ..OptionOverrides::default()
        });
        assert!(options.combine_speaker);
        assert!(options.speaker_change);
    }

    #[test]
    fn deserializes_camel_case() {
        let options: CombineOptions =
            serde_json::from_value(json!({ "combineSegments": true, "combineSegmentsLength": 128 }))
                .unwrap();
        assert!(options.combine_segments);
        assert_eq!(options.combine_segments_length, 128);
        assert_eq!(options.combine_equal_times_separator, "\n");
    }
}
