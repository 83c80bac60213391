//! Pure state transition function

use super::state::TurnKind;
use super::{ConvState, Effect, Event, SessionNotice};
use std::sync::Arc;
use thiserror::Error;

/// Shown in the log whenever a turn fails; the details go to the log file
pub const REPLY_FAILED_MESSAGE: &str = "Sorry, I couldn't get a response. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("Still waiting for the previous reply")]
    Busy,
    #[error("No site analysis for this session; submit a URL first")]
    MissingAnalysis,
    #[error("Session already initialized (reset first)")]
    AlreadyInitialized,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Announcement appended when a session starts
pub fn announcement(subject: &str) -> String {
    format!("Chat session started for \"{subject}\". Ask anything about this website.")
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// Rejected events leave the state untouched.
pub fn transition(state: &ConvState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Session lifecycle
        // ============================================================
        (_, Event::Initialize { analysis: None }) => Err(TransitionError::MissingAnalysis),

        (ConvState::Uninitialized, Event::Initialize { analysis: Some(data) }) => {
            let text = announcement(data.analysis.subject());
            let analysis = Arc::new(data);
            Ok(TransitionResult::new(ConvState::AwaitingReply {
                analysis,
                turn: TurnKind::Summary,
            })
            .with_effect(Effect::append_system(text))
            .with_effect(Effect::RequestReply {
                turn: TurnKind::Summary,
            }))
        }

        (_, Event::Initialize { .. }) => Err(TransitionError::AlreadyInitialized),

        (_, Event::Reset) => Ok(TransitionResult::new(ConvState::Uninitialized)
            .with_effect(Effect::DiscardSession)
            .with_effect(Effect::Notify(SessionNotice::Reset))),

        // ============================================================
        // User turns
        // ============================================================
        (_, Event::UserMessage { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyInput)
        }

        (ConvState::Uninitialized, Event::UserMessage { .. }) => {
            Err(TransitionError::MissingAnalysis)
        }

        (ConvState::AwaitingReply { .. }, Event::UserMessage { .. }) => Err(TransitionError::Busy),

        (ConvState::Idle { analysis }, Event::UserMessage { text }) => {
            Ok(TransitionResult::new(ConvState::AwaitingReply {
                analysis: Arc::clone(analysis),
                turn: TurnKind::User,
            })
            .with_effect(Effect::append_user(text.trim()))
            .with_effect(Effect::RequestReply {
                turn: TurnKind::User,
            }))
        }

        // ============================================================
        // Reply handling (shared by summary and user turns)
        // ============================================================
        (ConvState::AwaitingReply { analysis, .. }, Event::ReplyReceived { text })
            if !text.trim().is_empty() =>
        {
            Ok(TransitionResult::new(ConvState::Idle {
                analysis: Arc::clone(analysis),
            })
            .with_effect(Effect::append_assistant(text))
            .with_effect(Effect::notify_turn_completed()))
        }

        // An empty reply can't be shown as an assistant message
        (ConvState::AwaitingReply { analysis, .. }, Event::ReplyReceived { .. })
        | (ConvState::AwaitingReply { analysis, .. }, Event::ReplyFailed { .. }) => {
            Ok(TransitionResult::new(ConvState::Idle {
                analysis: Arc::clone(analysis),
            })
            .with_effect(Effect::append_system(REPLY_FAILED_MESSAGE))
            .with_effect(Effect::notify_turn_completed()))
        }

        (state, Event::ReplyReceived { .. } | Event::ReplyFailed { .. }) => {
            Err(TransitionError::InvalidTransition(format!(
                "reply arrived with no request in flight (state: {})",
                state.name()
            )))
        }
    }
}
