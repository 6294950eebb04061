//! Effects produced by state transitions

use crate::appointment::AppointmentDraft;

/// Commands to be carried out after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the speech capability to get ready
    Prepare,

    /// Synthesize an utterance
    Speak { utterance: String },

    /// Start one recognition
    Listen,

    /// Session confirmed; record the appointment
    AppointmentCreated { appointment: AppointmentDraft },

    /// Slots were cleared and a new session begins
    SessionReset,
}

impl Effect {
    pub fn speak(utterance: impl Into<String>) -> Self {
        Effect::Speak {
            utterance: utterance.into(),
        }
    }

    /// The utterance if this effect speaks
    pub fn utterance(&self) -> Option<&str> {
        match self {
            Effect::Speak { utterance } => Some(utterance),
            _ => None,
        }
    }
}
