//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::lexicon::{self, Lexicon};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> DialogueContext {
    DialogueContext::default()
}

fn listening(step: Step) -> DialogueState {
    DialogueState::Turn {
        step,
        phase: TurnPhase::Ask,
    }
}

/// Recognise `utterance` and complete the listen, from the step's Ask phase
fn answer_at(step: Step, session: &SessionContext, utterance: &str) -> TransitionResult {
    let ctx = test_context();
    let heard = transition(&listening(step), session, &ctx, Event::recognised(utterance))
        .expect("Ask phase accepts RECOGNISED");
    transition(&heard.new_state, &heard.session, &ctx, Event::ListenComplete)
        .expect("LISTEN_COMPLETE is handled in every turn")
}

/// Flip the case of characters selected by `mask`
fn mixed_case(s: &str, mask: &[bool]) -> String {
    s.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Greeting),
        Just(Step::AskPerson),
        Just(Step::AskDay),
        Just(Step::AskWholeDay),
        Just(Step::AskTime),
        Just(Step::ConfirmWholeDay),
        Just(Step::ConfirmTimed),
    ]
}

fn arb_phase() -> impl Strategy<Value = TurnPhase> {
    prop_oneof![
        Just(TurnPhase::Prompt),
        Just(TurnPhase::NoInput),
        Just(TurnPhase::NotRecognised),
        Just(TurnPhase::Ask),
    ]
}

fn arb_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Prepare),
        Just(DialogueState::WaitToStart),
        Just(DialogueState::Created),
        Just(DialogueState::CheckGrammar),
        (arb_step(), arb_phase()).prop_map(|(step, phase)| DialogueState::Turn { step, phase }),
    ]
}

fn arb_hypothesis() -> impl Strategy<Value = Hypothesis> {
    ("[a-zA-Z0-9 ]{0,12}", 0.0f64..=1.0).prop_map(|(u, c)| Hypothesis::new(u, c))
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::AsrTtsReady),
        Just(Event::Click),
        Just(Event::SpeakComplete),
        Just(Event::ListenComplete),
        Just(Event::AsrNoInput),
        proptest::collection::vec(arb_hypothesis(), 0..3)
            .prop_map(|hypotheses| Event::Recognised { hypotheses }),
    ]
}

fn arb_slot(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    proptest::option::of(proptest::sample::select(values).prop_map(str::to_string))
}

fn arb_session() -> impl Strategy<Value = SessionContext> {
    (
        proptest::option::of(proptest::collection::vec(arb_hypothesis(), 1..3)),
        arb_slot(&["Vladislav Maraev", "Bora Kara", "Talha Bedir"]),
        arb_slot(&["Monday", "Wednesday", "Friday"]),
        proptest::option::of(any::<bool>()),
        arb_slot(&["10:00", "14:00", "17:00"]),
    )
        .prop_map(|(last_result, meeting_with, date, whole_day, time)| SessionContext {
            last_result,
            meeting_with,
            date,
            whole_day,
            time,
        })
}

fn arb_person_key() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(vec!["vlad", "bora", "tal", "tom"])
}

fn arb_utterance() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,15}",
        Just("yes".to_string()),
        Just("no".to_string()),
        Just("absolutely not".to_string()),
        Just("of course".to_string()),
        Just("Nope".to_string()),
        Just("maybe".to_string()),
    ]
}

/// Utterances that are neither lexicon keys nor yes/no answers
fn arb_unknown_utterance() -> impl Strategy<Value = String> {
    "[a-z]{3,10}".prop_filter("must not be a lexicon key or yes/no", |u| {
        !Lexicon::builtin().is_known(u) && lexicon::classify(u).is_none()
    })
}

// ============================================================================
// Lexicon Properties
// ============================================================================

proptest! {
    /// Lookup ignores case
    #[test]
    fn prop_lookup_case_insensitive(u in "[a-zA-Z0-9]{0,10}") {
        let lexicon = Lexicon::builtin();
        prop_assert_eq!(lexicon.lookup(&u), lexicon.lookup(&u.to_lowercase()));
    }

    /// Known keys resolve regardless of how they are capitalised
    #[test]
    fn prop_known_keys_any_case(
        key in proptest::sample::select(vec!["vlad", "monday", "friday", "14", "tom"]),
        mask in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let lexicon = Lexicon::builtin();
        let spoken = mixed_case(key, &mask);
        prop_assert!(lexicon.is_known(&spoken));
        prop_assert_eq!(lexicon.lookup(&spoken), lexicon.lookup(key));
    }

    /// Yes and no never both win
    #[test]
    fn prop_classify_consistent(u in arb_utterance()) {
        match lexicon::classify(&u) {
            Some(true) => prop_assert!(lexicon::is_affirmative(&u)),
            Some(false) => prop_assert!(lexicon::is_negative(&u)),
            None => {
                prop_assert!(!lexicon::is_affirmative(&u));
                prop_assert!(!lexicon::is_negative(&u));
            }
        }
    }
}

// ============================================================================
// Transition Properties
// ============================================================================

proptest! {
    /// The transition function never panics, and an unhandled event never
    /// reports a state change
    #[test]
    fn prop_transition_total(
        state in arb_state(),
        session in arb_session(),
        event in arb_event(),
    ) {
        let ctx = test_context();
        match transition(&state, &session, &ctx, event) {
            Ok(result) => {
                prop_assert!(result.effects.len() <= 3);
            }
            Err(TransitionError::Unhandled { state: label, .. }) => {
                prop_assert_eq!(label, state.label());
            }
        }
    }

    /// Pure: the same inputs always produce the same outputs
    #[test]
    fn prop_transition_deterministic(
        state in arb_state(),
        session in arb_session(),
        event in arb_event(),
    ) {
        let ctx = test_context();
        let first = transition(&state, &session, &ctx, event.clone());
        let second = transition(&state, &session, &ctx, event);
        prop_assert_eq!(first, second);
    }

    /// Every person key fills `meeting_with` with the mapped name and moves on
    #[test]
    fn prop_person_keys_advance(
        key in arb_person_key(),
        mask in proptest::collection::vec(any::<bool>(), 1..5),
        session in arb_session(),
    ) {
        let spoken = mixed_case(key, &mask);
        let result = answer_at(Step::AskPerson, &session, &spoken);
        prop_assert_eq!(result.session.meeting_with, Lexicon::builtin().person(key));
        prop_assert_eq!(result.new_state, DialogueState::turn(Step::AskDay));
    }

    /// Finishing a session always clears every slot
    #[test]
    fn prop_reset_idempotent(
        session in arb_session(),
        from in prop_oneof![Just(DialogueState::Created), Just(DialogueState::CheckGrammar)],
    ) {
        let ctx = test_context();
        let result = transition(&from, &session, &ctx, Event::SpeakComplete).unwrap();
        prop_assert_eq!(&result.session, &SessionContext::default());
        prop_assert_eq!(result.new_state, DialogueState::turn(Step::Greeting));
        prop_assert_eq!(&result.effects[0], &Effect::SessionReset);
    }

    /// `whole_day` follows the yes/no classification exactly
    #[test]
    fn prop_whole_day_tri_state(u in arb_utterance(), session in arb_session()) {
        let session = session.apply(ContextPatch::new().whole_day(None));
        let result = answer_at(Step::AskWholeDay, &session, &u);
        prop_assert_eq!(result.session.whole_day, lexicon::classify(&u));
        if result.session.whole_day == Some(true) {
            prop_assert!(result.session.time.is_none());
        }
        let expected = match lexicon::classify(&u) {
            Some(true) => DialogueState::turn(Step::ConfirmWholeDay),
            Some(false) => DialogueState::turn(Step::AskTime),
            None => DialogueState::Turn {
                step: Step::AskWholeDay,
                phase: TurnPhase::NotRecognised,
            },
        };
        prop_assert_eq!(result.new_state, expected);
    }

    /// No-input at the whole-day question leaves it unanswered
    #[test]
    fn prop_whole_day_no_input_unsets(session in arb_session(), phase in arb_phase()) {
        let ctx = test_context();
        let state = DialogueState::Turn { step: Step::AskWholeDay, phase };
        let result = transition(&state, &session, &ctx, Event::AsrNoInput).unwrap();
        prop_assert_eq!(result.session.whole_day, None);
        prop_assert_eq!(result.session.last_result, None);
        prop_assert_eq!(
            result.new_state,
            DialogueState::Turn { step: Step::AskWholeDay, phase: TurnPhase::NoInput }
        );
    }

    /// A heard but unusable answer is "not recognised", never "no input"
    #[test]
    fn prop_guard_cascade_order(
        step in prop_oneof![
            Just(Step::AskPerson),
            Just(Step::AskDay),
            Just(Step::AskWholeDay),
            Just(Step::AskTime),
            Just(Step::ConfirmWholeDay),
            Just(Step::ConfirmTimed),
        ],
        u in arb_unknown_utterance(),
    ) {
        let result = answer_at(step, &SessionContext::default(), &u);
        prop_assert_eq!(
            result.new_state,
            DialogueState::Turn { step, phase: TurnPhase::NotRecognised }
        );
    }

    /// Slot values only change through recognition, no-input or reset
    #[test]
    fn prop_speak_complete_keeps_slots(
        step in arb_step(),
        phase in arb_phase(),
        session in arb_session(),
    ) {
        let ctx = test_context();
        let state = DialogueState::Turn { step, phase };
        if let Ok(result) = transition(&state, &session, &ctx, Event::SpeakComplete) {
            prop_assert_eq!(result.session, session);
        }
    }
}
