//! Serializable client settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client settings, typically a section of an application's TOML config.
///
/// ```toml
/// [alloha]
/// api_token = "..."
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct AllohaConfig {
    /// API token (required).
    pub api_token: String,
    /// Base API URL (default: `DEFAULT_BASE_URL`).
    pub base_url: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    pub timeout_secs: Option<u64>,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
    /// `Accept-Language` override.
    pub accept_language: Option<String>,
    /// `User-Agent` override.
    pub user_agent: Option<String>,
}

impl AllohaConfig {
    /// Per-request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
