//! The prompt/listen turn shared by every question
//!
//! A turn speaks its prompt, listens, and on `LISTEN_COMPLETE` runs a fixed
//! cascade: the step's own outcome guard first, then "something was heard
//! but not understood", then "nothing was heard". Each step only supplies a
//! `TurnScript`; the phase handling lives in `turn_transition`.

use super::state::{ContextPatch, DialogueContext, DialogueState, SessionContext, Step, TurnPhase};
use super::transition::{enter, TransitionError, TransitionResult};
use super::Event;
use crate::lexicon::{self, Lexicon};

/// What happens when the opening prompt finishes
#[derive(Debug, Clone, Copy)]
pub(crate) enum AfterPrompt {
    /// Start listening
    Listen,
    /// Move on without listening
    Advance(DialogueState),
}

/// Per-step configuration of a turn
pub(crate) struct TurnScript {
    pub prompt: fn(&SessionContext) -> String,
    pub no_input: &'static str,
    /// `None` for turns that never report "not recognised"
    pub not_recognised: Option<&'static str>,
    pub after_prompt: AfterPrompt,
    /// Slot updates for the top-ranked utterance; `last_result` is set by the
    /// caller
    pub interpret: fn(&Lexicon, &str) -> ContextPatch,
    /// Where the turn goes once its slot is satisfied
    pub outcome: fn(&SessionContext) -> Option<DialogueState>,
    /// Slots cleared along with `last_result` on `ASR_NOINPUT`
    pub on_no_input: fn() -> ContextPatch,
}

const YES_OR_NO: &str = "I didn't understand. Please answer yes or no.";

static GREETING: TurnScript = TurnScript {
    prompt: |_| "Hi, let's create an appointment.".to_string(),
    no_input: "I can't hear you!",
    not_recognised: None,
    after_prompt: AfterPrompt::Advance(DialogueState::Turn {
        step: Step::AskPerson,
        phase: TurnPhase::Prompt,
    }),
    interpret: |_, _| ContextPatch::new(),
    outcome: |s| s.has_result().then_some(DialogueState::CheckGrammar),
    on_no_input: ContextPatch::new,
};

static ASK_PERSON: TurnScript = TurnScript {
    prompt: |_| "Who are you meeting with?".to_string(),
    no_input: "I can't hear you. Who are you meeting with?",
    not_recognised: Some(
        "I didn't recognise the person you are meeting with. Try Vladislav, Bora, Talha or Tom.",
    ),
    after_prompt: AfterPrompt::Listen,
    interpret: |lex, utt| ContextPatch::new().meeting_with(lex.person(utt)),
    outcome: |s| {
        s.meeting_with
            .is_some()
            .then_some(DialogueState::turn(Step::AskDay))
    },
    on_no_input: || ContextPatch::new().meeting_with(None),
};

static ASK_DAY: TurnScript = TurnScript {
    prompt: |_| "Perfect, on which day is your meeting?".to_string(),
    no_input: "I can't hear you. On which day is your meeting?",
    not_recognised: Some(
        "I heard you, but I didn't recognize the day. Try Monday, Tuesday, Wednesday, Thursday, or Friday.",
    ),
    after_prompt: AfterPrompt::Listen,
    interpret: |lex, utt| ContextPatch::new().date(lex.day(&lexicon::strip_punctuation(utt))),
    outcome: |s| {
        s.date
            .is_some()
            .then_some(DialogueState::turn(Step::AskWholeDay))
    },
    on_no_input: || ContextPatch::new().date(None),
};

static ASK_WHOLE_DAY: TurnScript = TurnScript {
    prompt: |_| "Will it take the whole day?".to_string(),
    no_input: "I can't hear you! Is it going to last the whole day?",
    not_recognised: Some(YES_OR_NO),
    after_prompt: AfterPrompt::Listen,
    interpret: |_, utt| {
        let answer = lexicon::classify(utt);
        let patch = ContextPatch::new().whole_day(answer);
        // A whole-day meeting has no start time, even one left from a
        // rejected confirmation
        if answer == Some(true) {
            patch.time(None)
        } else {
            patch
        }
    },
    outcome: |s| match s.whole_day {
        Some(true) => Some(DialogueState::turn(Step::ConfirmWholeDay)),
        Some(false) => Some(DialogueState::turn(Step::AskTime)),
        None => None,
    },
    on_no_input: || ContextPatch::new().whole_day(None),
};

static ASK_TIME: TurnScript = TurnScript {
    prompt: |_| "What time is your meeting?".to_string(),
    no_input: "I can't hear you. What time is your meeting?",
    not_recognised: Some("I didn't recognize the time. Try 10, 11, 12, 13, 14, 15, 16 or 17."),
    after_prompt: AfterPrompt::Listen,
    interpret: |lex, utt| ContextPatch::new().time(lex.time(utt)),
    outcome: |s| {
        s.time
            .is_some()
            .then_some(DialogueState::turn(Step::ConfirmTimed))
    },
    on_no_input: || ContextPatch::new().time(None),
};

static CONFIRM_WHOLE_DAY: TurnScript = TurnScript {
    prompt: |s| {
        format!(
            "Do you want me to create an appointment with {} on {} for the whole day?",
            slot(s.meeting_with.as_deref()),
            slot(s.date.as_deref()),
        )
    },
    no_input: "I can't hear you! Please say yes or no.",
    not_recognised: Some(YES_OR_NO),
    after_prompt: AfterPrompt::Listen,
    interpret: |_, _| ContextPatch::new(),
    outcome: confirmation_outcome,
    on_no_input: ContextPatch::new,
};

static CONFIRM_TIMED: TurnScript = TurnScript {
    prompt: |s| {
        format!(
            "Do you want me to create an appointment with {} on {} at {}?",
            slot(s.meeting_with.as_deref()),
            slot(s.date.as_deref()),
            slot(s.time.as_deref()),
        )
    },
    no_input: "I can't hear you! Please say yes or no.",
    not_recognised: Some(YES_OR_NO),
    after_prompt: AfterPrompt::Listen,
    interpret: |_, _| ContextPatch::new(),
    outcome: confirmation_outcome,
    on_no_input: ContextPatch::new,
};

pub(crate) fn script(step: Step) -> &'static TurnScript {
    match step {
        Step::Greeting => &GREETING,
        Step::AskPerson => &ASK_PERSON,
        Step::AskDay => &ASK_DAY,
        Step::AskWholeDay => &ASK_WHOLE_DAY,
        Step::AskTime => &ASK_TIME,
        Step::ConfirmWholeDay => &CONFIRM_WHOLE_DAY,
        Step::ConfirmTimed => &CONFIRM_TIMED,
    }
}

/// "Yes" creates the appointment, "no" starts collecting again from the
/// person. Slots are kept; the next answers overwrite them.
fn confirmation_outcome(session: &SessionContext) -> Option<DialogueState> {
    let utterance = session.last_utterance().unwrap_or_default();
    match lexicon::classify(utterance) {
        Some(true) => Some(DialogueState::Created),
        Some(false) => Some(DialogueState::turn(Step::AskPerson)),
        None => None,
    }
}

fn slot(value: Option<&str>) -> &str {
    value.unwrap_or("undefined")
}

/// Utterance spoken on entering a phase of a step
pub(crate) fn phase_utterance(
    step: Step,
    phase: TurnPhase,
    session: &SessionContext,
) -> Option<String> {
    let script = script(step);
    match phase {
        TurnPhase::Prompt => Some((script.prompt)(session)),
        TurnPhase::NoInput => Some(script.no_input.to_string()),
        TurnPhase::NotRecognised => script.not_recognised.map(str::to_string),
        TurnPhase::Ask => None,
    }
}

/// Target of the `LISTEN_COMPLETE` cascade
fn listen_complete_target(step: Step, session: &SessionContext) -> DialogueState {
    let script = script(step);
    if let Some(target) = (script.outcome)(session) {
        return target;
    }
    let phase = if script.not_recognised.is_some() && session.has_result() {
        TurnPhase::NotRecognised
    } else {
        TurnPhase::NoInput
    };
    DialogueState::Turn { step, phase }
}

/// Move to `target`, unless it is the phase the turn is already in: a
/// retry prompt that is already playing is not restarted.
fn go(
    current: DialogueState,
    target: DialogueState,
    session: SessionContext,
    ctx: &DialogueContext,
) -> TransitionResult {
    if target == current {
        TransitionResult::stay(current, session)
    } else {
        enter(target, session, ctx)
    }
}

/// Transitions for a state inside a turn
pub(crate) fn turn_transition(
    step: Step,
    phase: TurnPhase,
    session: &SessionContext,
    ctx: &DialogueContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let current = DialogueState::Turn { step, phase };
    let script = script(step);

    match (phase, event) {
        // Handled in every phase
        (_, Event::ListenComplete) => {
            let target = listen_complete_target(step, session);
            Ok(go(current, target, session.clone(), ctx))
        }

        (_, Event::AsrNoInput) => {
            let session = session
                .apply((script.on_no_input)())
                .apply(ContextPatch::new().last_result(None));
            let target = DialogueState::Turn {
                step,
                phase: TurnPhase::NoInput,
            };
            Ok(go(current, target, session, ctx))
        }

        (TurnPhase::Prompt, Event::SpeakComplete) => {
            let target = match script.after_prompt {
                AfterPrompt::Listen => DialogueState::Turn {
                    step,
                    phase: TurnPhase::Ask,
                },
                AfterPrompt::Advance(target) => target,
            };
            Ok(enter(target, session.clone(), ctx))
        }

        (TurnPhase::NoInput | TurnPhase::NotRecognised, Event::SpeakComplete) => Ok(enter(
            DialogueState::Turn {
                step,
                phase: TurnPhase::Ask,
            },
            session.clone(),
            ctx,
        )),

        (TurnPhase::Ask, Event::Recognised { hypotheses }) => {
            let utterance = hypotheses
                .first()
                .map(|h| h.utterance.clone())
                .unwrap_or_default();
            let patch = (script.interpret)(&ctx.lexicon, &utterance);
            let session = session
                .apply(ContextPatch::new().last_result(Some(hypotheses)))
                .apply(patch);
            Ok(TransitionResult::stay(current, session))
        }

        (_, event) => Err(TransitionError::Unhandled {
            state: current.label(),
            event: event.name(),
        }),
    }
}
