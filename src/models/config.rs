//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_redirect_delay_ms() -> u64 {
    2000
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for the booking client.
pub struct ClientConfig {
    /// Base URL of the booking API, e.g. `http://localhost:8080/api`.
    pub api_url: String,
    /// SQLite file used as local storage.
    pub storage_url: String,
    /// Per-request timeout. Absent means requests never time out.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Delay before leaving the confirmation for the appointments list.
    #[serde(default = "default_redirect_delay_ms")]
    pub success_redirect_delay_ms: u64,
}
