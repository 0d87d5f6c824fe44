//! Request counter configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Fixed-window request counting per client IP
///
/// Counting never rejects a request. Clients over `max_requests` are logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the counter middleware is installed
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Window length in milliseconds (default: 15 minutes)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Requests per window before a client is reported
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// How often expired windows are evicted, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

const fn default_window_ms() -> u64 {
    15 * 60 * 1000
}

const fn default_max_requests() -> u32 {
    100
}

const fn default_cleanup_interval() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}
