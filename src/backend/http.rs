//! HTTP implementation of the analysis backend

use super::types::{ChatReply, ChatRequest, ErrorBody, ProcessUrlRequest, UrlData};
use super::{BackendError, BackendService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const PROCESS_URL_PATH: &str = "/api/process-url";
const CHAT_PATH: &str = "/api/chat";

/// Backend reached over HTTP (`POST /api/process-url`, `POST /api/chat`)
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::timeout(self.timeout)
                } else if e.is_connect() {
                    BackendError::transport(format!("Connection failed: {e}"))
                } else {
                    BackendError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::timeout(self.timeout)
            } else {
                BackendError::transport(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(error_from_status(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| BackendError::malformed(format!("Unexpected response from {path}: {e}")))
    }
}

/// Prefer the backend's own `{"error": ...}` message when it sent one
fn error_from_status(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
    BackendError::http(status.as_u16(), message)
}

#[async_trait]
impl BackendService for HttpBackend {
    async fn process_url(&self, url: &str) -> Result<UrlData, BackendError> {
        self.post(PROCESS_URL_PATH, &ProcessUrlRequest { url }).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let reply: ChatReply = self.post(CHAT_PATH, request).await?;
        Ok(reply.message)
    }
}
