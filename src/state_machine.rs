//! Core dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` maps (state, session, event) to a new state, a new session
//! and a list of effects, and the runtime executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;
mod turn;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, Hypothesis};
pub use state::{
    ContextPatch, DialogueContext, DialogueState, SessionContext, Step, TurnPhase,
};
pub use transition::{start, transition, TransitionError, TransitionResult};
