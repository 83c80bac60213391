//! Analysis backend abstraction
//!
//! The backend scrapes a page, analyzes it, and answers chat turns about it.
//! Everything behind `/api/*` is opaque to this crate.

mod error;
mod http;
mod types;

pub use error::{BackendError, BackendErrorKind};
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the analysis backend
#[async_trait]
pub trait BackendService: Send + Sync {
    /// Scrape and analyze a (normalized) URL
    async fn process_url(&self, url: &str) -> Result<UrlData, BackendError>;

    /// Ask a question about an analyzed site, returning the reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

#[async_trait]
impl<T: BackendService + ?Sized> BackendService for Arc<T> {
    async fn process_url(&self, url: &str) -> Result<UrlData, BackendError> {
        (**self).process_url(url).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        (**self).chat(request).await
    }
}

/// Logging wrapper for backend services
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: BackendService> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: BackendService> BackendService for LoggingBackend<B> {
    async fn process_url(&self, url: &str) -> Result<UrlData, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.process_url(url).await;
        let duration = start.elapsed();

        match &result {
            Ok(data) => {
                tracing::info!(
                    url = %url,
                    duration_ms = %duration.as_millis(),
                    key_points = data.analysis.key_points.len(),
                    "Site analysis completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    url = %url,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Site analysis failed"
                );
            }
        }

        result
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    turns = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    reply_chars = reply.chars().count(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    turns = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
