//! Mock implementations for testing
//!
//! These mocks enable testing the initializer and controller without real I/O.

use crate::backend::{BackendError, BackendService, ChatRequest, SiteAnalysis, UrlData};
use crate::state_machine::SessionNotice;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Fixtures
// ============================================================================

pub fn sample_url_data(url: &str, title: Option<&str>) -> UrlData {
    UrlData {
        analysis: SiteAnalysis {
            url: url.to_string(),
            title: title.map(str::to_string),
            main_topic: Some("Examples".to_string()),
            summary_paragraph: Some("A domain reserved for documentation.".to_string()),
            key_points: vec!["reserved".to_string(), "illustrative".to_string()],
            extra: serde_json::Map::new(),
        },
        scraped_data: serde_json::json!({"paragraphs": ["p1"], "links": [], "images": []}),
    }
}

/// Wait until the in-flight turn resolves
pub async fn wait_for_turn(rx: &mut broadcast::Receiver<SessionNotice>) {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(SessionNotice::TurnCompleted) => return,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("notice channel closed"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("turn did not complete");
}

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that returns queued responses
pub struct MockBackend {
    analyses: Mutex<VecDeque<Result<UrlData, BackendError>>>,
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    /// Record of all URLs submitted
    pub urls: Mutex<Vec<String>>,
    /// Record of all chat requests made
    pub chat_requests: Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            analyses: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
            urls: Mutex::new(Vec::new()),
            chat_requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful analysis
    pub fn queue_analysis(&self, data: UrlData) {
        self.analyses.lock().unwrap().push_back(Ok(data));
    }

    pub fn queue_analysis_error(&self, error: BackendError) {
        self.analyses.lock().unwrap().push_back(Err(error));
    }

    /// Queue a successful chat reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_reply_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn recorded_chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendService for MockBackend {
    async fn process_url(&self, url: &str) -> Result<UrlData, BackendError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.analyses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::transport("No mock analysis queued")))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::transport("No mock reply queued")))
    }
}

// ============================================================================
// Delayed Mock Backend (for single-flight and teardown testing)
// ============================================================================

/// Mock backend with configurable delay
pub struct DelayedMockBackend {
    pub inner: MockBackend,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockBackend::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl BackendService for DelayedMockBackend {
    async fn process_url(&self, url: &str) -> Result<UrlData, BackendError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.process_url(url).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.chat(request).await
    }
}
