//! Effects produced by state transitions

use super::state::TurnKind;
use crate::backend::MessageRole;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the log (the runtime stamps id and time, then
    /// emits `SessionNotice::LogChanged`)
    AppendMessage { role: MessageRole, content: String },

    /// Send the chat request for this turn
    RequestReply { turn: TurnKind },

    /// Drop the log and invalidate any request still in flight
    DiscardSession,

    /// Notify the presentation layer
    Notify(SessionNotice),
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    /// The log grew; scroll to the newest entry
    LogChanged { len: usize },
    /// A request resolved; return focus to the input
    TurnCompleted,
    /// The session was discarded; go back to URL entry
    Reset,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn append_system(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn notify_turn_completed() -> Self {
        Effect::Notify(SessionNotice::TurnCompleted)
    }
}
