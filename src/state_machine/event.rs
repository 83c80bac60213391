//! Events that can occur in a conversation

use crate::backend::{BackendError, UrlData};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Session lifecycle
    Initialize {
        /// `None` when the front-end reached the chat page without an analysis
        analysis: Option<UrlData>,
    },
    Reset,

    // User events
    UserMessage {
        text: String,
    },

    // Backend events
    ReplyReceived {
        text: String,
    },
    ReplyFailed {
        error: BackendError,
    },
}
