//! Runtime configuration from the environment

use std::path::PathBuf;
use std::time::Duration;

/// Port the reference Flask backend listens on by default
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the analysis backend (`/api/*` is appended)
    pub backend_url: String,
    /// Upper bound on every backend request
    pub request_timeout: Duration,
    /// SQLite file holding recent URLs
    pub db_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("SITELENS_BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let timeout_secs = lookup("SITELENS_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let db_path = lookup("SITELENS_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.sitelens/sitelens.db"))
            },
            PathBuf::from,
        );

        Self {
            backend_url,
            request_timeout: Duration::from_secs(timeout_secs),
            db_path,
        }
    }
}
