//! Runtime for executing conversations
//!
//! Applies the effects returned by the state machine: appends to the log,
//! dispatches backend requests, and notifies the presentation layer.

mod controller;
mod lifecycle;

#[cfg(test)]
pub mod testing;

pub use controller::ConversationController;
pub use lifecycle::{dispatch, SingleFlight};
