//! Events that drive the dialogue

use serde::{Deserialize, Serialize};

/// Events from the speech capability and the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    // Speech capability events
    #[serde(rename = "ASRTTS_READY")]
    AsrTtsReady,
    SpeakComplete,
    ListenComplete,
    Recognised {
        /// Ranked best-first; only the first is consulted
        hypotheses: Vec<Hypothesis>,
    },
    /// Listening timed out without detecting any speech
    #[serde(rename = "ASR_NOINPUT")]
    AsrNoInput,

    // UI events
    Click,
}

impl Event {
    /// Recognition of a single utterance at full confidence
    pub fn recognised(utterance: impl Into<String>) -> Self {
        Event::Recognised {
            hypotheses: vec![Hypothesis::new(utterance, 1.0)],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::AsrTtsReady => "ASRTTS_READY",
            Event::SpeakComplete => "SPEAK_COMPLETE",
            Event::ListenComplete => "LISTEN_COMPLETE",
            Event::Recognised { .. } => "RECOGNISED",
            Event::AsrNoInput => "ASR_NOINPUT",
            Event::Click => "CLICK",
        }
    }
}

/// One candidate transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub utterance: String,
    pub confidence: f64,
}

impl Hypothesis {
    pub fn new(utterance: impl Into<String>, confidence: f64) -> Self {
        Self {
            utterance: utterance.into(),
            confidence,
        }
    }
}
