//! Configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_VOICE: &str = "en-US-DavisNeural";
pub const DEFAULT_NO_INPUT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_COMPLETE_TIMEOUT_MS: u64 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { var: &'static str, value: String },
}

/// Settings handed to the speech capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    pub locale: String,
    pub voice: String,
    /// Silence after which `ASR_NOINPUT` is reported; zero waits forever
    pub no_input_timeout: Duration,
    /// Trailing silence that ends an utterance. Only streaming recognisers
    /// use it; `TerminalSpeech` treats Enter as the end of an utterance.
    pub complete_timeout: Duration,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            no_input_timeout: Duration::from_millis(DEFAULT_NO_INPUT_TIMEOUT_MS),
            complete_timeout: Duration::from_millis(DEFAULT_COMPLETE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueConfig {
    pub speech: SpeechSettings,
    /// JSON lexicon replacing the built-in one
    pub lexicon_path: Option<PathBuf>,
    pub log_json: bool,
}

impl DialogueConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = SpeechSettings::default();
        let millis = |var: &'static str, default: Duration| match lookup(var) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidMillis { var, value }),
            None => Ok(default),
        };

        let speech = SpeechSettings {
            no_input_timeout: millis("APPOINTMENT_NOINPUT_TIMEOUT_MS", defaults.no_input_timeout)?,
            complete_timeout: millis("APPOINTMENT_COMPLETE_TIMEOUT_MS", defaults.complete_timeout)?,
            locale: lookup("APPOINTMENT_LOCALE").unwrap_or(defaults.locale),
            voice: lookup("APPOINTMENT_VOICE").unwrap_or(defaults.voice),
        };

        Ok(Self {
            speech,
            lexicon_path: lookup("APPOINTMENT_LEXICON")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            log_json: lookup("APPOINTMENT_LOG_JSON").is_some_and(|v| !v.is_empty() && v != "0"),
        })
    }
}
