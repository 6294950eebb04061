//! Dialogue state types

use super::event::Hypothesis;
use crate::lexicon::Lexicon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Turn steps and phases
// ============================================================================

/// A question the dialogue asks, each run as one prompt/listen turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Greeting,
    AskPerson,
    AskDay,
    AskWholeDay,
    AskTime,
    ConfirmWholeDay,
    ConfirmTimed,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Greeting,
        Step::AskPerson,
        Step::AskDay,
        Step::AskWholeDay,
        Step::AskTime,
        Step::ConfirmWholeDay,
        Step::ConfirmTimed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::Greeting => "Greeting",
            Step::AskPerson => "AskPerson",
            Step::AskDay => "AskDay",
            Step::AskWholeDay => "AskWholeDay",
            Step::AskTime => "AskTime",
            Step::ConfirmWholeDay => "ConfirmWholeDay",
            Step::ConfirmTimed => "ConfirmTimed",
        }
    }
}

/// Position inside a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Speaking the step's question
    #[default]
    Prompt,
    /// Speaking the retry for "heard nothing"
    NoInput,
    /// Speaking the retry for "heard something unusable"
    NotRecognised,
    /// Listening for the answer
    Ask,
}

impl TurnPhase {
    pub fn name(self) -> &'static str {
        match self {
            TurnPhase::Prompt => "Prompt",
            TurnPhase::NoInput => "NoInput",
            TurnPhase::NotRecognised => "NotRecognised",
            TurnPhase::Ask => "Ask",
        }
    }
}

// ============================================================================
// Dialogue State
// ============================================================================

/// Dialogue state
///
/// There is no resting `Done` state: entering it resets the session and
/// falls straight through to the greeting, see `transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueState {
    /// Waiting for the speech capability to become ready
    #[default]
    Prepare,

    /// Idle until the UI sends the start signal
    WaitToStart,

    /// Inside a question turn
    Turn { step: Step, phase: TurnPhase },

    /// Appointment confirmed, announcing success
    Created,

    /// Echoing the last utterance and whether the lexicon knows it
    CheckGrammar,
}

impl DialogueState {
    /// Entry point of a turn
    pub fn turn(step: Step) -> Self {
        DialogueState::Turn {
            step,
            phase: TurnPhase::Prompt,
        }
    }

    /// Display label for the UI, e.g. `AskPerson.NotRecognised`
    pub fn label(self) -> String {
        match self {
            DialogueState::Prepare => "Prepare".to_string(),
            DialogueState::WaitToStart => "WaitToStart".to_string(),
            DialogueState::Turn { step, phase } => format!("{}.{}", step.name(), phase.name()),
            DialogueState::Created => "Created".to_string(),
            DialogueState::CheckGrammar => "CheckGrammar".to_string(),
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Slot values collected during one appointment session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Hypotheses from the most recent recognition, if any
    pub last_result: Option<Vec<Hypothesis>>,
    pub meeting_with: Option<String>,
    pub date: Option<String>,
    /// `None` until answered; `Some(false)` routes to the time question
    pub whole_day: Option<bool>,
    pub time: Option<String>,
}

impl SessionContext {
    /// New context with the patch merged in; fields the patch leaves alone
    /// keep their values.
    #[must_use]
    pub fn apply(&self, patch: ContextPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.last_result {
            next.last_result = v;
        }
        if let Some(v) = patch.meeting_with {
            next.meeting_with = v;
        }
        if let Some(v) = patch.date {
            next.date = v;
        }
        if let Some(v) = patch.whole_day {
            next.whole_day = v;
        }
        if let Some(v) = patch.time {
            next.time = v;
        }
        next
    }

    pub fn has_result(&self) -> bool {
        self.last_result.is_some()
    }

    /// Top-ranked utterance of the last recognition
    pub fn last_utterance(&self) -> Option<&str> {
        self.last_result
            .as_ref()
            .and_then(|hyps| hyps.first())
            .map(|h| h.utterance.as_str())
    }
}

/// Partial update to a `SessionContext`
///
/// Outer `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPatch {
    pub last_result: Option<Option<Vec<Hypothesis>>>,
    pub meeting_with: Option<Option<String>>,
    pub date: Option<Option<String>>,
    pub whole_day: Option<Option<bool>>,
    pub time: Option<Option<String>>,
}

impl ContextPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that clears every field
    pub fn reset() -> Self {
        Self {
            last_result: Some(None),
            meeting_with: Some(None),
            date: Some(None),
            whole_day: Some(None),
            time: Some(None),
        }
    }

    #[must_use]
    pub fn last_result(mut self, value: Option<Vec<Hypothesis>>) -> Self {
        self.last_result = Some(value);
        self
    }

    #[must_use]
    pub fn meeting_with(mut self, value: Option<String>) -> Self {
        self.meeting_with = Some(value);
        self
    }

    #[must_use]
    pub fn date(mut self, value: Option<String>) -> Self {
        self.date = Some(value);
        self
    }

    #[must_use]
    pub fn whole_day(mut self, value: Option<bool>) -> Self {
        self.whole_day = Some(value);
        self
    }

    #[must_use]
    pub fn time(mut self, value: Option<String>) -> Self {
        self.time = Some(value);
        self
    }
}

// ============================================================================
// Dialogue Context
// ============================================================================

/// Immutable configuration shared by every transition
#[derive(Debug, Clone)]
pub struct DialogueContext {
    pub lexicon: Arc<Lexicon>,
}

impl DialogueContext {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }
}

impl Default for DialogueContext {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}
