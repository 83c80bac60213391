//! SiteLens - chat with an AI about any website
//!
//! A terminal client for the SiteLens analysis service: submit a URL, read
//! the structured analysis, then hold a conversation about the page.

mod backend;
mod config;
mod initializer;
mod repl;
mod runtime;
mod state_machine;
mod store;

use backend::{HttpBackend, LoggingBackend};
use config::AppConfig;
use initializer::SessionInitializer;
use runtime::ConversationController;
use std::sync::Arc;
use store::{KeyValueStore, MemoryStore, SqliteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitelens=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = AppConfig::from_env();

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let store: Arc<dyn KeyValueStore> = match SqliteStore::open(&config.db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "Recent URLs will not persist this run");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(
        url = %config.backend_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Using analysis backend"
    );
    let backend = Arc::new(LoggingBackend::new(HttpBackend::new(
        &config.backend_url,
        config.request_timeout,
    )?));

    let initializer = SessionInitializer::new(backend.clone(), store, config.request_timeout);
    let controller = ConversationController::new(backend, config.request_timeout);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(&initializer, &controller, stdin, &mut std::io::stdout()).await?;

    Ok(())
}
