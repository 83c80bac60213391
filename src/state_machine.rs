//! Conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` decides, the runtime applies the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, SessionNotice};
pub use event::Event;
pub use state::{build_chat_request, ConvState, Message, SessionState};
pub use transition::{transition, TransitionError};
