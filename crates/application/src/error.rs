//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Neither a location nor a full coordinate pair was supplied
    #[error("Location or coordinates are required")]
    LocationRequired,

    /// No upstream credential configured
    #[error("API key is required but was not provided")]
    MissingApiKey,

    /// Upstream refused the configured credential
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// Geocoding returned no usable candidate
    #[error("Location not found")]
    LocationNotFound,

    /// Geocoding endpoint answered with an unexpected status
    #[error("Geocoding error {0}")]
    Geocoding(u16),

    /// Weather endpoint answered with a non-success status
    #[error("{message}")]
    UpstreamHttp { status: u16, message: String },

    /// Upstream payload could not be normalized
    #[error("Invalid weather data received from API: {0}")]
    InvalidUpstreamData(String),

    /// Transport failure or timeout talking to the upstream provider
    #[error("Weather service is currently unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream rate limit hit
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Storage lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an error, stable across message wording
///
/// The HTTP layer turns this into a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied something unusable
    BadRequest,
    /// Upstream credential missing or rejected
    Unauthorized,
    /// Requested entity or location does not exist
    NotFound,
    /// Too many requests
    RateLimited,
    /// Everything else
    Internal,
}

impl ApplicationError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DomainError::NotFound { .. })
            | Self::LocationNotFound
            | Self::NotFound(_)
            | Self::UpstreamHttp { status: 404, .. } => ErrorKind::NotFound,
            Self::Domain(_) | Self::LocationRequired => ErrorKind::BadRequest,
            Self::MissingApiKey | Self::InvalidApiKey(_) => ErrorKind::Unauthorized,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Geocoding(_)
            | Self::UpstreamHttp { .. }
            | Self::InvalidUpstreamData(_)
            | Self::ServiceUnavailable(_)
            | Self::Configuration(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_not_found_is_not_found() {
        let err = ApplicationError::Domain(DomainError::not_found("WeatherObservation", "1"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn upstream_not_found_stays_not_found() {
        let err = ApplicationError::UpstreamHttp {
            status: 404,
            message: "city not found".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = ApplicationError::UpstreamHttp {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn invalid_location_is_bad_request() {
        let err = ApplicationError::Domain(DomainError::InvalidLocation("bad".to_string()));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn location_required_is_bad_request() {
        assert_eq!(
            ApplicationError::LocationRequired.kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn credential_errors_are_unauthorized() {
        assert_eq!(ApplicationError::MissingApiKey.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            ApplicationError::InvalidApiKey("nope".to_string()).kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn upstream_failures_are_internal() {
        assert_eq!(ApplicationError::Geocoding(500).kind(), ErrorKind::Internal);
        assert_eq!(
            ApplicationError::UpstreamHttp {
                status: 502,
                message: "bad gateway".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            ApplicationError::ServiceUnavailable("timeout".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn rate_limited_kind() {
        assert_eq!(ApplicationError::RateLimited.kind(), ErrorKind::RateLimited);
    }

    #[test]
    fn location_not_found_message() {
        assert_eq!(
            ApplicationError::LocationNotFound.to_string(),
            "Location not found"
        );
    }

    #[test]
    fn geocoding_message_carries_status() {
        assert_eq!(
            ApplicationError::Geocoding(503).to_string(),
            "Geocoding error 503"
        );
    }

    #[test]
    fn upstream_http_message_is_verbatim() {
        let err = ApplicationError::UpstreamHttp {
            status: 400,
            message: "wrong latitude".to_string(),
        };
        assert_eq!(err.to_string(), "wrong latitude");
    }

    #[test]
    fn missing_api_key_message() {
        assert_eq!(
            ApplicationError::MissingApiKey.to_string(),
            "API key is required but was not provided"
        );
    }
}
