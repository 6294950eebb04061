//! Pure state transition function
//!
//! Given the same state, session and event, `transition` always returns the
//! same result and performs no I/O. Speech and bookkeeping are described as
//! `Effect`s for the runtime to execute.

use super::state::{ContextPatch, DialogueContext, DialogueState, SessionContext, Step};
use super::turn::{phase_utterance, turn_transition};
use super::{Effect, Event};
use crate::appointment::AppointmentDraft;
use thiserror::Error;

const CREATED_UTTERANCE: &str = "Your appointment has been created!";

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub session: SessionContext,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState, session: SessionContext) -> Self {
        Self {
            new_state: state,
            session,
            effects: vec![],
        }
    }

    /// Remain in `state` without running any entry effects
    pub fn stay(state: DialogueState, session: SessionContext) -> Self {
        Self::new(state, session)
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The current state has no transition for the event. Callers drop the
    /// event and keep their state.
    #[error("No transition from {state} on {event}")]
    Unhandled { state: String, event: &'static str },
}

/// Initial state of a fresh machine, with its entry effects
pub fn start(ctx: &DialogueContext) -> TransitionResult {
    enter(DialogueState::Prepare, SessionContext::default(), ctx)
}

/// Pure transition function
pub fn transition(
    state: &DialogueState,
    session: &SessionContext,
    ctx: &DialogueContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Session lifecycle
        // ============================================================
        (DialogueState::Prepare, Event::AsrTtsReady) => {
            Ok(enter(DialogueState::WaitToStart, session.clone(), ctx))
        }

        (DialogueState::WaitToStart, Event::Click) => {
            Ok(enter(DialogueState::turn(Step::Greeting), session.clone(), ctx))
        }

        // Once the success or echo message has been spoken the session is over
        (DialogueState::Created | DialogueState::CheckGrammar, Event::SpeakComplete) => {
            Ok(finish_session(session, ctx))
        }

        // ============================================================
        // Question turns
        // ============================================================
        (DialogueState::Turn { step, phase }, event) => {
            turn_transition(*step, *phase, session, ctx, event)
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::Unhandled {
            state: state.label(),
            event: event.name(),
        }),
    }
}

/// Enter `target`, producing its entry effects
pub(crate) fn enter(
    target: DialogueState,
    session: SessionContext,
    ctx: &DialogueContext,
) -> TransitionResult {
    match target {
        DialogueState::Prepare => {
            TransitionResult::new(target, session).with_effect(Effect::Prepare)
        }

        DialogueState::WaitToStart => TransitionResult::new(target, session),

        DialogueState::Turn { step, phase } => {
            let effect = match phase_utterance(step, phase, &session) {
                Some(utterance) => Effect::speak(utterance),
                None => Effect::Listen,
            };
            TransitionResult::new(target, session).with_effect(effect)
        }

        DialogueState::Created => {
            let recorded = AppointmentDraft::from_session(&session)
                .map(|appointment| Effect::AppointmentCreated { appointment });
            TransitionResult::new(target, session)
                .with_effects(recorded)
                .with_effect(Effect::speak(CREATED_UTTERANCE))
        }

        DialogueState::CheckGrammar => {
            let utterance = session.last_utterance().unwrap_or_default();
            let verdict = if ctx.lexicon.is_known(utterance) {
                "is"
            } else {
                "is not"
            };
            let echo = format!("You just said: {utterance}. And it {verdict} in the grammar.");
            TransitionResult::new(target, session).with_effect(Effect::speak(echo))
        }
    }
}

/// Clear every slot and start over at the greeting
fn finish_session(session: &SessionContext, ctx: &DialogueContext) -> TransitionResult {
    let session = session.apply(ContextPatch::reset());
    let greeting = enter(DialogueState::turn(Step::Greeting), session, ctx);
    TransitionResult::new(greeting.new_state, greeting.session)
        .with_effect(Effect::SessionReset)
        .with_effects(greeting.effects)
}
