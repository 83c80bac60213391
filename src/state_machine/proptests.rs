//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::{ConvState, TurnKind};
use super::transition::{transition, TransitionError, REPLY_FAILED_MESSAGE};
use super::{Effect, Event};
use crate::backend::{BackendError, MessageRole, SiteAnalysis, UrlData};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_analysis() -> UrlData {
    UrlData::new(SiteAnalysis {
        url: "https://example.com".to_string(),
        title: Some("Example".to_string()),
        main_topic: None,
        summary_paragraph: None,
        key_points: vec![],
        extra: serde_json::Map::new(),
    })
}

/// Apply `event`, mirroring the runtime: the log only changes through
/// `AppendMessage`, and a rejected event changes nothing.
fn apply(
    state: &mut ConvState,
    log: &mut Vec<MessageRole>,
    requests: &mut usize,
    event: Event,
) -> Result<(), TransitionError> {
    let result = transition(state, event)?;
    *state = result.new_state;
    for effect in result.effects {
        match effect {
            Effect::AppendMessage { role, .. } => log.push(role),
            Effect::RequestReply { .. } => *requests += 1,
            Effect::DiscardSession => log.clear(),
            Effect::Notify(_) => {}
        }
    }
    Ok(())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_user_message_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{1,30}".prop_map(|text| Event::UserMessage { text }),
        "[ \t\n]{0,5}".prop_map(|text| Event::UserMessage { text }),
    ]
}

fn arb_reply_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{0,30}".prop_map(|text| Event::ReplyReceived { text }),
        "[a-zA-Z ]{1,30}".prop_map(|message| Event::ReplyFailed {
            error: BackendError::transport(message),
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_user_message_event(),
        4 => arb_reply_event(),
        1 => Just(Event::Initialize { analysis: Some(test_analysis()) }),
        1 => Just(Event::Initialize { analysis: None }),
        1 => Just(Event::Reset),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // No user message is accepted while a reply is pending
    #[test]
    fn prop_busy_rejects_every_message(
        messages in proptest::collection::vec(arb_user_message_event(), 1..10)
    ) {
        let mut state = ConvState::Uninitialized;
        let mut log = Vec::new();
        let mut requests = 0;
        apply(&mut state, &mut log, &mut requests, Event::Initialize {
            analysis: Some(test_analysis()),
        }).unwrap();
        let len_before = log.len();

        for message in messages {
            let result = apply(&mut state, &mut log, &mut requests, message);
            prop_assert!(matches!(
                result,
                Err(TransitionError::Busy | TransitionError::EmptyInput)
            ));
        }
        prop_assert_eq!(log.len(), len_before);
        prop_assert_eq!(requests, 1);
        prop_assert!(state.is_pending());
    }

    // Initialization yields exactly the announcement plus one reply or error
    #[test]
    fn prop_initialize_yields_two_messages(reply in arb_reply_event()) {
        let mut state = ConvState::Uninitialized;
        let mut log = Vec::new();
        let mut requests = 0;
        apply(&mut state, &mut log, &mut requests, Event::Initialize {
            analysis: Some(test_analysis()),
        }).unwrap();
        apply(&mut state, &mut log, &mut requests, reply).unwrap();

        prop_assert_eq!(log.len(), 2);
        prop_assert_eq!(log[0], MessageRole::System);
        prop_assert!(matches!(log[1], MessageRole::Assistant | MessageRole::System));
        prop_assert!(!state.is_pending());
    }

    // Every accepted user turn grows the log by exactly two entries
    #[test]
    fn prop_user_turn_grows_log_by_two(
        text in "[a-zA-Z]{1,20}",
        reply in arb_reply_event(),
    ) {
        let mut state = ConvState::Idle { analysis: std::sync::Arc::new(test_analysis()) };
        let mut log = Vec::new();
        let mut requests = 0;

        apply(&mut state, &mut log, &mut requests, Event::UserMessage { text }).unwrap();
        apply(&mut state, &mut log, &mut requests, reply).unwrap();

        prop_assert_eq!(log.len(), 2);
        prop_assert_eq!(log[0], MessageRole::User);
        prop_assert!(!state.is_pending());
    }

    // Across arbitrary event sequences: at most one request in flight, the
    // log only grows between resets, and requests are always answered
    // before the next one starts
    #[test]
    fn prop_single_flight_and_append_only(
        events in proptest::collection::vec(arb_event(), 0..40)
    ) {
        let mut state = ConvState::Uninitialized;
        let mut log = Vec::new();
        let mut requests = 0usize;
        let mut replies = 0usize;

        for event in events {
            let is_reset = matches!(event, Event::Reset);
            let is_reply = matches!(event, Event::ReplyReceived { .. } | Event::ReplyFailed { .. });
            let before = log.clone();
            let requests_before = requests;

            if apply(&mut state, &mut log, &mut requests, event).is_ok() {
                if is_reset {
                    prop_assert!(log.is_empty());
                    requests = 0;
                    replies = 0;
                } else {
                    prop_assert!(log.starts_with(&before), "log was rewritten");
                }
                if is_reply {
                    replies += 1;
                }
            } else {
                prop_assert_eq!(&log, &before);
                prop_assert_eq!(requests, requests_before);
            }

            let in_flight = requests - replies;
            prop_assert!(in_flight <= 1);
            prop_assert_eq!(in_flight == 1, state.is_pending());
        }
    }

    // A failed turn always surfaces the same fixed notice
    #[test]
    fn prop_failure_message_is_fixed(message in "[a-zA-Z ]{1,30}") {
        let state = ConvState::AwaitingReply {
            analysis: std::sync::Arc::new(test_analysis()),
            turn: TurnKind::User,
        };
        let result = transition(&state, Event::ReplyFailed {
            error: BackendError::http(503, message),
        }).unwrap();
        prop_assert_eq!(&result.effects[0], &Effect::append_system(REPLY_FAILED_MESSAGE));
    }
}
