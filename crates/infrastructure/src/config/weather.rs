//! Upstream weather provider configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// OpenWeatherMap settings
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherAppConfig {
    /// OpenWeatherMap API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Weather API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Geocoding API base URL
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,

    /// History API base URL
    #[serde(default = "default_history_base_url")]
    pub history_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_history_base_url() -> String {
    "https://history.openweathermap.org/data/2.5/history".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl std::fmt::Debug for WeatherAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAppConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("base_url", &self.base_url)
            .field("geo_base_url", &self.geo_base_url)
            .field("history_base_url", &self.history_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for WeatherAppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            geo_base_url: default_geo_base_url(),
            history_base_url: default_history_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl WeatherAppConfig {
    /// Get the API key as a string reference (for API calls)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|k| !k.is_empty())
    }

    /// Client settings for the OpenWeatherMap integration
    #[must_use]
    pub fn client_config(&self) -> integration_weather::WeatherConfig {
        integration_weather::WeatherConfig {
            api_key: self.api_key_str().map(str::to_string),
            base_url: self.base_url.clone(),
            geo_base_url: self.geo_base_url.clone(),
            history_base_url: self.history_base_url.clone(),
            timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }
}
