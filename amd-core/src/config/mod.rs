//! Detection parameters and the shared base configuration.
//!
//! ## Model
//!
//! ```text
//! amd.json ──load──► AmdParameters ──► ParameterStore (Arc snapshot)
//!                                            │ snapshot()
//!                                            ▼
//!                          inline overrides ──► per-session copy
//! ```
//!
//! A session copies the snapshot it started with; `ParameterStore::reload`
//! swaps in a new `Arc` and never touches values already handed out.

pub mod overrides;

pub use overrides::{apply_overrides, OverrideIssue, OverrideOutcome};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

pub const DEFAULT_INITIAL_SILENCE_MS: u32 = 2500;
pub const DEFAULT_GREETING_MS: u32 = 1500;
pub const DEFAULT_AFTER_GREETING_SILENCE_MS: u32 = 800;
pub const DEFAULT_TOTAL_ANALYSIS_TIME_MS: u32 = 5000;
pub const DEFAULT_MIN_WORD_LENGTH_MS: u32 = 100;
pub const DEFAULT_BETWEEN_WORDS_SILENCE_MS: u32 = 50;
pub const DEFAULT_MAXIMUM_NUMBER_OF_WORDS: u32 = 3;
pub const DEFAULT_MAXIMUM_WORD_LENGTH_MS: u32 = 5000;
pub const DEFAULT_SILENCE_THRESHOLD: u32 = 256;

/// Tunables for one detection run. All durations are milliseconds.
///
/// Serialized field names match the persisted configuration schema, so
/// `minimum_word_length` is stored as `min_word_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmdParameters {
    /// Silence before any talk that means a human picked up and is waiting.
    pub initial_silence: u32,
    /// Longest voiced stretch tolerated inside the greeting phase.
    pub greeting: u32,
    /// Silence after the greeting that means a human is waiting for a reply.
    pub after_greeting_silence: u32,
    /// Audio-time budget for the whole analysis. 0 disables the budget.
    pub total_analysis_time: u32,
    /// Shortest voiced stretch that counts as a word.
    #[serde(rename = "min_word_length")]
    pub minimum_word_length: u32,
    /// Silence that separates two words.
    pub between_words_silence: u32,
    /// Word count at which the party is classified as a machine.
    pub maximum_number_of_words: u32,
    /// Voiced stretch long enough to be a recording.
    pub maximum_word_length: u32,
    /// Mean-amplitude score at or above which a frame is voiced.
    pub silence_threshold: u32,
}

impl Default for AmdParameters {
    fn default() -> Self {
        Self {
            initial_silence: DEFAULT_INITIAL_SILENCE_MS,
            greeting: DEFAULT_GREETING_MS,
            after_greeting_silence: DEFAULT_AFTER_GREETING_SILENCE_MS,
            total_analysis_time: DEFAULT_TOTAL_ANALYSIS_TIME_MS,
            minimum_word_length: DEFAULT_MIN_WORD_LENGTH_MS,
            between_words_silence: DEFAULT_BETWEEN_WORDS_SILENCE_MS,
            maximum_number_of_words: DEFAULT_MAXIMUM_NUMBER_OF_WORDS,
            maximum_word_length: DEFAULT_MAXIMUM_WORD_LENGTH_MS,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
        }
    }
}

/// One schema key. Order follows the configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    InitialSilence,
    Greeting,
    AfterGreetingSilence,
    TotalAnalysisTime,
    MinimumWordLength,
    BetweenWordsSilence,
    MaximumNumberOfWords,
    MaximumWordLength,
    SilenceThreshold,
}

impl ParamKey {
    pub const ALL: [ParamKey; 9] = [
        ParamKey::InitialSilence,
        ParamKey::Greeting,
        ParamKey::AfterGreetingSilence,
        ParamKey::TotalAnalysisTime,
        ParamKey::MinimumWordLength,
        ParamKey::BetweenWordsSilence,
        ParamKey::MaximumNumberOfWords,
        ParamKey::MaximumWordLength,
        ParamKey::SilenceThreshold,
    ];

    /// Schema name, as used in the config file and inline overrides.
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::InitialSilence => "initial_silence",
            ParamKey::Greeting => "greeting",
            ParamKey::AfterGreetingSilence => "after_greeting_silence",
            ParamKey::TotalAnalysisTime => "total_analysis_time",
            ParamKey::MinimumWordLength => "min_word_length",
            ParamKey::BetweenWordsSilence => "between_words_silence",
            ParamKey::MaximumNumberOfWords => "maximum_number_of_words",
            ParamKey::MaximumWordLength => "maximum_word_length",
            ParamKey::SilenceThreshold => "silence_threshold",
        }
    }

    /// Case-insensitive lookup. Accepts `minimum_word_length` as an alias.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("minimum_word_length") {
            return Some(ParamKey::MinimumWordLength);
        }
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(raw))
    }
}

impl AmdParameters {
    pub fn get(&self, key: ParamKey) -> u32 {
        match key {
            ParamKey::InitialSilence => self.initial_silence,
            ParamKey::Greeting => self.greeting,
            ParamKey::AfterGreetingSilence => self.after_greeting_silence,
            ParamKey::TotalAnalysisTime => self.total_analysis_time,
            ParamKey::MinimumWordLength => self.minimum_word_length,
            ParamKey::BetweenWordsSilence => self.between_words_silence,
            ParamKey::MaximumNumberOfWords => self.maximum_number_of_words,
            ParamKey::MaximumWordLength => self.maximum_word_length,
            ParamKey::SilenceThreshold => self.silence_threshold,
        }
    }

    pub fn set(&mut self, key: ParamKey, value: u32) {
        let slot = match key {
            ParamKey::InitialSilence => &mut self.initial_silence,
            ParamKey::Greeting => &mut self.greeting,
            ParamKey::AfterGreetingSilence => &mut self.after_greeting_silence,
            ParamKey::TotalAnalysisTime => &mut self.total_analysis_time,
            ParamKey::MinimumWordLength => &mut self.minimum_word_length,
            ParamKey::BetweenWordsSilence => &mut self.between_words_silence,
            ParamKey::MaximumNumberOfWords => &mut self.maximum_number_of_words,
            ParamKey::MaximumWordLength => &mut self.maximum_word_length,
            ParamKey::SilenceThreshold => &mut self.silence_threshold,
        };
        *slot = value;
    }

    /// Replace zero values with built-in defaults.
    ///
    /// `total_analysis_time = 0` is kept: it disables the budget guard.
    pub fn normalize(&mut self) {
        let defaults = Self::default();
        for key in ParamKey::ALL {
            if key == ParamKey::TotalAnalysisTime {
                continue;
            }
            if self.get(key) == 0 {
                warn!(
                    key = key.name(),
                    default = defaults.get(key),
                    "non-positive configuration value replaced with default"
                );
                self.set(key, defaults.get(key));
            }
        }
    }

    /// Parse a JSON document. Missing keys take defaults; the result is normalized.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut params: AmdParameters = serde_json::from_str(raw)?;
        params.normalize();
        Ok(params)
    }

    /// Load from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = ?path, "no AMD configuration file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// Shared, read-mostly base configuration.
///
/// Cloning the store shares the same underlying slot.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    current: Arc<RwLock<Arc<AmdParameters>>>,
}

impl ParameterStore {
    pub fn new(params: AmdParameters) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(params))),
        }
    }

    /// The base configuration new sessions start from.
    pub fn snapshot(&self) -> Arc<AmdParameters> {
        Arc::clone(&self.current.read())
    }

    /// Install a new base configuration. Running sessions keep their copy.
    pub fn reload(&self, params: AmdParameters) {
        *self.current.write() = Arc::new(params);
        info!("AMD configuration reloaded");
    }

    /// Re-read a JSON file and install it. On error the previous value stays.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let params = AmdParameters::load(path)?;
        self.reload(params);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_schema_table() {
        let p = AmdParameters::default();
        assert_eq!(p.initial_silence, 2500);
        assert_eq!(p.greeting, 1500);
        assert_eq!(p.after_greeting_silence, 800);
        assert_eq!(p.total_analysis_time, 5000);
        assert_eq!(p.minimum_word_length, 100);
        assert_eq!(p.between_words_silence, 50);
        assert_eq!(p.maximum_number_of_words, 3);
        assert_eq!(p.maximum_word_length, 5000);
        assert_eq!(p.silence_threshold, 256);
    }

    #[test]
    fn json_uses_schema_names_and_fills_missing_keys() {
        let p = AmdParameters::from_json(r#"{"min_word_length": 120, "greeting": 1000}"#)
            .expect("parse params");
        assert_eq!(p.minimum_word_length, 120);
        assert_eq!(p.greeting, 1000);
        assert_eq!(p.initial_silence, DEFAULT_INITIAL_SILENCE_MS);

        let json = serde_json::to_value(p).expect("serialize params");
        assert_eq!(json["min_word_length"], 120);
        assert!(json.get("minimum_word_length").is_none());
    }

    #[test]
    fn zero_values_fall_back_except_total_analysis_time() {
        let p = AmdParameters::from_json(r#"{"greeting": 0, "total_analysis_time": 0}"#)
            .expect("parse params");
        assert_eq!(p.greeting, DEFAULT_GREETING_MS);
        assert_eq!(p.total_analysis_time, 0);
    }

    #[test]
    fn negative_values_are_rejected_by_the_file_loader() {
        assert!(AmdParameters::from_json(r#"{"greeting": -5}"#).is_err());
    }

    #[test]
    fn key_lookup_is_case_insensitive_with_alias() {
        assert_eq!(ParamKey::parse("INITIAL_SILENCE"), Some(ParamKey::InitialSilence));
        assert_eq!(ParamKey::parse("Min_Word_Length"), Some(ParamKey::MinimumWordLength));
        assert_eq!(
            ParamKey::parse("minimum_word_length"),
            Some(ParamKey::MinimumWordLength)
        );
        assert_eq!(ParamKey::parse("bogus"), None);
    }

    #[test]
    fn reload_does_not_touch_existing_snapshots() {
        let store = ParameterStore::new(AmdParameters::default());
        let before = store.snapshot();

        let mut updated = AmdParameters::default();
        updated.initial_silence = 1000;
        store.reload(updated);

        assert_eq!(before.initial_silence, DEFAULT_INITIAL_SILENCE_MS);
        assert_eq!(store.snapshot().initial_silence, 1000);
    }

    #[test]
    fn reload_from_file_keeps_previous_value_on_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("amd.json");
        let store = ParameterStore::new(AmdParameters::default());

        fs::write(&path, r#"{"after_greeting_silence": 600}"#).expect("write config");
        store.reload_from(&path).expect("reload");
        assert_eq!(store.snapshot().after_greeting_silence, 600);

        fs::write(&path, "not json").expect("write config");
        assert!(store.reload_from(&path).is_err());
        assert_eq!(store.snapshot().after_greeting_silence, 600);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let params = AmdParameters::load(&dir.path().join("absent.json")).expect("load");
        assert_eq!(params, AmdParameters::default());
    }
}
