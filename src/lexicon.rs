//! Fixed vocabulary for slot values and yes/no answers
//!
//! Keys are literal tokens matched case-insensitively. There is no fuzzy or
//! partial matching: an utterance either is a key or it is not.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const PEOPLE: &[(&str, &str)] = &[
    ("vlad", "Vladislav Maraev"),
    ("bora", "Bora Kara"),
    ("tal", "Talha Bedir"),
    ("tom", "Tom Södahl Bladsjö"),
];

const DAYS: &[(&str, &str)] = &[
    ("monday", "Monday"),
    ("tuesday", "Tuesday"),
    ("wednesday", "Wednesday"),
    ("thursday", "Thursday"),
    ("friday", "Friday"),
];

const TIMES: &[(&str, &str)] = &[
    ("10", "10:00"),
    ("11", "11:00"),
    ("12", "12:00"),
    ("13", "13:00"),
    ("14", "14:00"),
    ("15", "15:00"),
    ("16", "16:00"),
    ("17", "17:00"),
];

const AFFIRMATIVE: &[&str] = &["yes", "yeah", "yep", "ok", "okay", "sure"];
const AFFIRMATIVE_PHRASES: &[&str] = &["of course", "absolutely"];
const NEGATIVE: &[&str] = &["no", "nope", "nah"];
const NEGATIVE_PHRASES: &[&str] = &["no way", "absolutely not"];

/// Slot values a single lexicon key maps to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl LexiconEntry {
    fn person(value: impl Into<String>) -> Self {
        Self {
            person: Some(value.into()),
            ..Self::default()
        }
    }

    fn day(value: impl Into<String>) -> Self {
        Self {
            day: Some(value.into()),
            ..Self::default()
        }
    }

    fn time(value: impl Into<String>) -> Self {
        Self {
            time: Some(value.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid lexicon {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("lexicon key '{0}' is defined more than once")]
    DuplicateKey(String),
}

/// On-disk lexicon layout, one map per slot kind
#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    people: HashMap<String, String>,
    #[serde(default)]
    days: HashMap<String, String>,
    #[serde(default)]
    times: HashMap<String, String>,
}

/// Token to slot-value vocabulary
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    /// The appointment vocabulary: four people, weekdays, and hours 10 to 17
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for (key, name) in PEOPLE {
            entries.insert((*key).to_string(), LexiconEntry::person(*name));
        }
        for (key, day) in DAYS {
            entries.insert((*key).to_string(), LexiconEntry::day(*day));
        }
        for (key, time) in TIMES {
            entries.insert((*key).to_string(), LexiconEntry::time(*time));
        }
        Self { entries }
    }

    /// Build a lexicon from per-slot sections. Keys share one namespace, so
    /// a key appearing twice (in any section, ignoring case) is rejected.
    pub fn from_sections<I, K, V>(people: I, days: I, times: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = HashMap::new();
        let sections: [(I, fn(String) -> LexiconEntry); 3] = [
            (people, |v| LexiconEntry::person(v)),
            (days, |v| LexiconEntry::day(v)),
            (times, |v| LexiconEntry::time(v)),
        ];

        for (section, make) in sections {
            for (key, value) in section {
                let key = normalize(key.as_ref());
                if entries.contains_key(&key) {
                    return Err(LexiconError::DuplicateKey(key));
                }
                entries.insert(key, make(value.into()));
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON lexicon of the form
    /// `{"people": {..}, "days": {..}, "times": {..}}`
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile =
            serde_json::from_str(json).map_err(|source| LexiconError::Parse {
                path: origin.to_string(),
                source,
            })?;
        Self::from_sections(file.people, file.days, file.times)
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_json_str(&json, &origin)
    }

    /// Slot values for an utterance; empty when the utterance is not a key
    pub fn lookup(&self, utterance: &str) -> LexiconEntry {
        self.entries
            .get(&normalize(utterance))
            .cloned()
            .unwrap_or_default()
    }

    pub fn person(&self, utterance: &str) -> Option<String> {
        self.lookup(utterance).person
    }

    pub fn day(&self, utterance: &str) -> Option<String> {
        self.lookup(utterance).day
    }

    pub fn time(&self, utterance: &str) -> Option<String> {
        self.lookup(utterance).time
    }

    /// Whether the utterance is a key, whatever slot it fills
    pub fn is_known(&self, utterance: &str) -> bool {
        self.entries.contains_key(&normalize(utterance))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(utterance: &str) -> String {
    utterance.to_lowercase()
}

/// Lower-case and drop everything but ASCII letters and digits, so that
/// "Monday." and " monday " resolve to the same key.
pub fn strip_punctuation(utterance: &str) -> String {
    utterance
        .trim()
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

pub fn is_affirmative(utterance: &str) -> bool {
    let u = utterance.trim().to_lowercase();
    AFFIRMATIVE.contains(&u.as_str()) || AFFIRMATIVE_PHRASES.iter().any(|p| u.contains(p))
}

pub fn is_negative(utterance: &str) -> bool {
    let u = utterance.trim().to_lowercase();
    NEGATIVE.contains(&u.as_str()) || NEGATIVE_PHRASES.iter().any(|p| u.contains(p))
}

/// Yes/no classification. `None` means the answer was neither.
///
/// "absolutely not" contains "absolutely", so the negative phrase is checked
/// before the affirmative substring match.
pub fn classify(utterance: &str) -> Option<bool> {
    let u = utterance.trim().to_lowercase();
    if NEGATIVE_PHRASES.iter().any(|p| u.contains(p)) {
        return Some(false);
    }
    if is_affirmative(&u) {
        Some(true)
    } else if is_negative(&u) {
        Some(false)
    } else {
        None
    }
}
