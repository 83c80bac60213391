//! Session initializer
//!
//! Takes the URL the user typed, gets it analyzed, and remembers it.

mod recent;

pub use recent::{RecentUrlCache, MAX_RECENT_URLS, RECENT_URLS_KEY};

use crate::backend::{BackendError, BackendErrorKind, BackendService, UrlData};
use crate::runtime::{dispatch, SingleFlight};
use crate::store::{KeyValueStore, StoreResult};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Why a submission produced no analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Please enter a URL")]
    EmptyInput,
    #[error("Already analyzing a URL, please wait")]
    Busy,
    #[error("{message}")]
    Backend { message: String },
    #[error("Unexpected response from the analysis service: {message}")]
    MalformedResponse { message: String },
    #[error("The analysis service did not answer within {}s", .after.as_secs())]
    Timeout { after: Duration },
}

impl From<BackendError> for AnalysisError {
    fn from(error: BackendError) -> Self {
        match error.kind {
            BackendErrorKind::Http { .. } | BackendErrorKind::Transport => {
                AnalysisError::Backend {
                    message: error.message,
                }
            }
            BackendErrorKind::Malformed => AnalysisError::MalformedResponse {
                message: error.message,
            },
            BackendErrorKind::Timeout { after } => AnalysisError::Timeout { after },
        }
    }
}

/// Trim and default the scheme to `https://`; `None` for blank input.
///
/// Anything else about the URL is left for the backend to judge.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

/// URL entry, submission, and recent-URL history
pub struct SessionInitializer<B, S> {
    backend: B,
    store: S,
    timeout: Duration,
    flight: SingleFlight,
    input: Mutex<String>,
    recent: Mutex<RecentUrlCache>,
}

impl<B, S> SessionInitializer<B, S>
where
    B: BackendService,
    S: KeyValueStore,
{
    pub fn new(backend: B, store: S, timeout: Duration) -> Self {
        let recent = RecentUrlCache::load(&store).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load recent URLs");
            RecentUrlCache::new()
        });

        Self {
            backend,
            store,
            timeout,
            flight: SingleFlight::new(),
            input: Mutex::new(String::new()),
            recent: Mutex::new(recent),
        }
    }

    /// Analyze `raw_url`; on success the normalized URL joins the history.
    pub async fn submit(&self, raw_url: &str) -> Result<UrlData, AnalysisError> {
        let url = normalize_url(raw_url).ok_or(AnalysisError::EmptyInput)?;
        let _guard = self.flight.try_begin().ok_or(AnalysisError::Busy)?;

        tracing::info!(url = %url, "Submitting URL for analysis");
        let data = dispatch(self.timeout, self.backend.process_url(&url)).await?;

        self.remember(&url);
        Ok(data)
    }

    /// Submit whatever is currently in the input field
    pub async fn submit_input(&self) -> Result<UrlData, AnalysisError> {
        let raw = self.input();
        self.submit(&raw).await
    }

    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    /// Most recent first, at most `MAX_RECENT_URLS`
    pub fn list_recent(&self) -> Vec<String> {
        self.recent.lock().unwrap().urls().to_vec()
    }

    /// Forget the history, including its persisted copy
    pub fn clear_recent(&self) -> StoreResult<()> {
        self.recent.lock().unwrap().clear();
        self.store.remove(RECENT_URLS_KEY)
    }

    /// Put `url` in the input field without submitting it
    pub fn select_recent(&self, url: &str) {
        self.set_input(url);
    }

    pub fn input(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    pub fn set_input(&self, value: &str) {
        *self.input.lock().unwrap() = value.to_string();
    }

    fn remember(&self, url: &str) {
        let mut recent = self.recent.lock().unwrap();
        recent.insert(url);
        // The analysis already succeeded; losing history isn't worth failing it
        if let Err(e) = recent.save(&self.store) {
            tracing::warn!(error = %e, "Failed to persist recent URLs");
        }
    }
}
