//! Conversation controller
//!
//! Owns one session's message log and drives each turn's request. All state
//! changes go through `transition`; this module only applies effects.

use super::lifecycle::dispatch;
use crate::backend::{BackendService, ChatRequest, UrlData};
use crate::state_machine::{
    build_chat_request, transition, ConvState, Effect, Event, Message, SessionNotice,
    SessionState, TransitionError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

const NOTICE_CAPACITY: usize = 64;

/// Controller for one analysis-to-chat session at a time
///
/// Methods return as soon as the state change is applied; replies arrive on
/// a spawned task, so they must be called from within a Tokio runtime.
pub struct ConversationController<B>
where
    B: BackendService + 'static,
{
    shared: Arc<Shared<B>>,
}

struct Shared<B> {
    backend: B,
    timeout: Duration,
    session: Mutex<Session>,
    notice_tx: broadcast::Sender<SessionNotice>,
}

struct Session {
    state: ConvState,
    messages: Vec<Message>,
    /// Cancelled when the session is torn down; replies for a cancelled
    /// session are dropped instead of applied
    lifecycle: CancellationToken,
}

/// Work to do once the session lock is released
#[derive(Default)]
struct Outcome {
    notices: Vec<SessionNotice>,
    request: Option<(ChatRequest, CancellationToken)>,
}

impl<B> ConversationController<B>
where
    B: BackendService + 'static,
{
    pub fn new(backend: B, timeout: Duration) -> Self {
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                backend,
                timeout,
                session: Mutex::new(Session {
                    state: ConvState::Uninitialized,
                    messages: Vec::new(),
                    lifecycle: CancellationToken::new(),
                }),
                notice_tx,
            }),
        }
    }

    /// Subscribe to presentation notices
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.shared.notice_tx.subscribe()
    }

    /// Start a session and its automatic summary turn.
    ///
    /// `None` fails with `MissingAnalysis`; the caller should return to URL
    /// entry.
    pub fn initialize(&self, analysis: Option<UrlData>) -> Result<(), TransitionError> {
        self.shared.handle(Event::Initialize { analysis }, None)
    }

    /// Append a user message and request the reply
    pub fn send_user_message(&self, text: &str) -> Result<(), TransitionError> {
        self.shared.handle(
            Event::UserMessage {
                text: text.to_string(),
            },
            None,
        )
    }

    /// Discard the session; a reply still in flight will be ignored
    pub fn reset(&self) {
        if let Err(e) = self.shared.handle(Event::Reset, None) {
            tracing::warn!(error = %e, "Reset rejected");
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.shared.session.lock().unwrap().messages.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.shared.session.lock().unwrap().state.is_pending()
    }

    pub fn analysis(&self) -> Option<Arc<UrlData>> {
        self.shared.session.lock().unwrap().state.analysis().cloned()
    }

    pub fn snapshot(&self) -> SessionState {
        let session = self.shared.session.lock().unwrap();
        SessionState {
            messages: session.messages.clone(),
            pending: session.state.is_pending(),
            analysis: session.state.analysis().cloned(),
        }
    }
}

impl<B> Drop for ConversationController<B>
where
    B: BackendService + 'static,
{
    fn drop(&mut self) {
        if let Ok(session) = self.shared.session.lock() {
            session.lifecycle.cancel();
        }
    }
}

impl<B> Shared<B>
where
    B: BackendService + 'static,
{
    /// Run one event through the state machine and apply its effects.
    ///
    /// `origin` is the lifecycle token of the session a reply belongs to;
    /// checked under the same lock `reset` takes, so a reply can never land
    /// in a session that was torn down after its request was issued.
    fn handle(
        self: &Arc<Self>,
        event: Event,
        origin: Option<&CancellationToken>,
    ) -> Result<(), TransitionError> {
        let outcome = {
            let mut session = self.session.lock().unwrap();

            if origin.is_some_and(CancellationToken::is_cancelled) {
                tracing::debug!("Session torn down, dropping reply");
                return Ok(());
            }

            let result = transition(&session.state, event)?;
            tracing::debug!(
                from = session.state.name(),
                to = result.new_state.name(),
                effects = result.effects.len(),
                "Session transition"
            );
            session.state = result.new_state;

            let mut outcome = Outcome::default();
            for effect in result.effects {
                apply_effect(&mut session, effect, &mut outcome);
            }
            outcome
        };

        for notice in outcome.notices {
            // No subscribers is fine
            let _ = self.notice_tx.send(notice);
        }

        if let Some((request, lifecycle)) = outcome.request {
            self.spawn_request(request, lifecycle);
        }

        Ok(())
    }

    fn spawn_request(self: &Arc<Self>, request: ChatRequest, lifecycle: CancellationToken) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let event = match dispatch(shared.timeout, shared.backend.chat(&request)).await {
                Ok(text) => Event::ReplyReceived { text },
                Err(error) => {
                    tracing::warn!(
                        kind = ?error.kind,
                        error = %error.message,
                        "Chat turn failed"
                    );
                    Event::ReplyFailed { error }
                }
            };

            if let Err(e) = shared.handle(event, Some(&lifecycle)) {
                tracing::error!(error = %e, "Failed to apply reply");
            }
        });
    }
}

fn apply_effect(session: &mut Session, effect: Effect, outcome: &mut Outcome) {
    match effect {
        Effect::AppendMessage { role, content } => {
            session.messages.push(Message::new(role, content));
            outcome.notices.push(SessionNotice::LogChanged {
                len: session.messages.len(),
            });
        }
        Effect::RequestReply { turn } => {
            if let Some(analysis) = session.state.analysis() {
                let request = build_chat_request(&session.messages, analysis, turn);
                outcome.request = Some((request, session.lifecycle.clone()));
            } else {
                tracing::error!("Reply requested without an analysis");
            }
        }
        Effect::DiscardSession => {
            session.messages.clear();
            session.lifecycle.cancel();
            session.lifecycle = CancellationToken::new();
        }
        Effect::Notify(notice) => outcome.notices.push(notice),
    }
}
