//! Wire types for the analysis backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured analysis of a scraped website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAnalysis {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub main_topic: Option<String>,
    #[serde(default, rename = "paragraph")]
    pub summary_paragraph: Option<String>,
    /// Backend relevance order
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Fields we don't interpret (e.g. `raw_data`), echoed back on chat
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteAnalysis {
    /// Name used when announcing the session: the title, or the URL if the
    /// backend found none.
    pub fn subject(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.url.as_str())
    }
}

/// Full `/api/process-url` success body; sent back as `url_data` on chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlData {
    pub analysis: SiteAnalysis,
    #[serde(default)]
    pub scraped_data: Value,
}

impl UrlData {
    pub fn new(analysis: SiteAnalysis) -> Self {
        Self {
            analysis,
            scraped_data: Value::Null,
        }
    }

    /// Counts of scraped paragraphs, links and images, when the backend
    /// returned them.
    pub fn scraped_counts(&self) -> Option<ScrapedCounts> {
        let obj = self.scraped_data.as_object()?;
        let count = |key: &str| obj.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        Some(ScrapedCounts {
            paragraphs: count("paragraphs"),
            links: count("links"),
            images: count("images"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapedCounts {
    pub paragraphs: usize,
    pub links: usize,
    pub images: usize,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    /// Session-lifecycle notices; never sent as conversation content
    System,
}

/// One conversational turn as sent to `/api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// `/api/chat` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    pub url_data: UrlData,
}

/// `/api/chat` success body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatReply {
    pub message: String,
}

/// `/api/process-url` request body
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProcessUrlRequest<'a> {
    pub url: &'a str,
}

/// Error body returned by the backend on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
