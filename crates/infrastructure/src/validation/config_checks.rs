//! Configuration checks run at startup

use std::fmt;

use crate::config::AppConfig;

/// Severity level for configuration warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Informational - no action required
    Info,
    /// Warning - should be addressed
    Warning,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// A configuration warning with severity and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Severity level of the warning
    pub severity: WarningSeverity,
    /// Short code identifying the warning type
    pub code: &'static str,
    /// Human-readable description of the issue
    pub message: String,
}

impl ConfigWarning {
    fn new(severity: WarningSeverity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

/// Validates application configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and return all warnings, most severe first
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if config.weather.api_key_str().is_none() {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Warning,
                "CFG001",
                "OPENWEATHER_API_KEY is not set; weather requests will fail with 401",
            ));
        }

        if config.is_production()
            && config.server.cors_enabled
            && config.server.allowed_origins.is_empty()
        {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Warning,
                "CFG002",
                "Production mode without allowed_origins rejects every cross-origin request",
            ));
        }

        if config.rate_limit.window_ms == 0 {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Info,
                "CFG003",
                "Rate limit window is zero; request counting is effectively disabled",
            ));
        }

        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
        warnings
    }

    /// Log all warnings using tracing
    pub fn log_warnings(warnings: &[ConfigWarning]) {
        for warning in warnings {
            match warning.severity {
                WarningSeverity::Warning => {
                    tracing::warn!(code = warning.code, message = %warning.message, "Configuration warning");
                },
                WarningSeverity::Info => {
                    tracing::info!(code = warning.code, message = %warning.message, "Configuration notice");
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::Environment;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.weather.api_key = Some(SecretString::from("key".to_string()));
        config
    }

    #[test]
    fn clean_config_has_no_warnings() {
        assert!(ConfigValidator::validate(&configured()).is_empty());
    }

    #[test]
    fn missing_api_key_warns() {
        let warnings = ConfigValidator::validate(&AppConfig::default());
        assert!(warnings.iter().any(|w| w.code == "CFG001"));
    }

    #[test]
    fn production_without_origins_warns() {
        let mut config = configured();
        config.environment = Environment::Production;
        let warnings = ConfigValidator::validate(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "CFG002");
    }

    #[test]
    fn production_with_origins_is_clean() {
        let mut config = configured();
        config.environment = Environment::Production;
        config.server.allowed_origins = vec!["https://app.example".to_string()];
        assert!(ConfigValidator::validate(&config).is_empty());
    }

    #[test]
    fn warnings_sorted_by_severity() {
        let mut config = AppConfig::default();
        config.rate_limit.window_ms = 0;
        let warnings = ConfigValidator::validate(&config);
        assert_eq!(warnings[0].severity, WarningSeverity::Warning);
        assert_eq!(warnings.last().map(|w| w.severity), Some(WarningSeverity::Info));
    }

    #[test]
    fn display_includes_code() {
        let warning = ConfigWarning::new(WarningSeverity::Info, "CFG003", "zero window");
        assert_eq!(warning.to_string(), "[INFO] CFG003: zero window");
    }
}
