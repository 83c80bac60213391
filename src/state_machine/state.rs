//! Conversation state types

use crate::backend::{ChatRequest, ChatTurn, MessageRole, UrlData};
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;

/// Fixed prompt for the automatic turn that opens every session
pub const SUMMARY_PROMPT: &str = "Give me a summary of this website";

/// What started the request currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// System-initiated summary right after initialization
    Summary,
    /// A message typed by the user
    User,
}

/// Conversation controller state
///
/// The analysis is shared, never mutated, and present in every state but
/// `Uninitialized`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConvState {
    /// No session; the front-end belongs on the URL page
    #[default]
    Uninitialized,

    /// Session active, ready for user input
    Idle { analysis: Arc<UrlData> },

    /// Exactly one chat request in flight
    AwaitingReply {
        analysis: Arc<UrlData>,
        turn: TurnKind,
    },
}

impl ConvState {
    /// True while a request is outstanding; new turns are rejected
    pub fn is_pending(&self) -> bool {
        matches!(self, ConvState::AwaitingReply { .. })
    }

    pub fn analysis(&self) -> Option<&Arc<UrlData>> {
        match self {
            ConvState::Uninitialized => None,
            ConvState::Idle { analysis } | ConvState::AwaitingReply { analysis, .. } => {
                Some(analysis)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Uninitialized => "uninitialized",
            ConvState::Idle { .. } => "idle",
            ConvState::AwaitingReply { .. } => "awaiting_reply",
        }
    }
}

/// Entry in the session's message log
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Local wall-clock time, for display only
    pub fn display_time(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }

    /// Conversational content as sent to the backend; `None` for notices
    pub fn to_chat_turn(&self) -> Option<ChatTurn> {
        match self.role {
            MessageRole::System => None,
            role => Some(ChatTurn {
                role,
                content: self.content.clone(),
            }),
        }
    }
}

/// Point-in-time view of a session for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub analysis: Option<Arc<UrlData>>,
}

/// Build the `/api/chat` request for a turn.
///
/// Sends the whole conversational log; system notices are left out. The
/// summary turn appends its synthetic prompt here only, so it never shows up
/// in the log.
pub fn build_chat_request(messages: &[Message], analysis: &UrlData, turn: TurnKind) -> ChatRequest {
    let mut turns: Vec<ChatTurn> = messages.iter().filter_map(Message::to_chat_turn).collect();
    if turn == TurnKind::Summary {
        turns.push(ChatTurn::user(SUMMARY_PROMPT));
    }

    ChatRequest {
        messages: turns,
        url_data: analysis.clone(),
    }
}
