//! Error types for locator_agent.

use locator_types::{ActionKind, FailureKind};
use std::fmt;

/// Locator error types.
#[derive(Debug)]
pub enum LocatorError {
    /// HTTP request failed.
    Http(reqwest::Error),
    /// JSON serialization/deserialization error.
    Json(serde_json::Error),
    /// IO error (cache and usage files).
    Io(std::io::Error),
    /// Missing required field in response.
    MissingField(&'static str),
    /// Invalid field type or value in response.
    InvalidField(&'static str),
    /// Remote API returned an error status.
    Remote(String),
    /// LLM provider rejected the request.
    Llm(String),
    /// Feature not enabled or configured.
    NotConfigured(&'static str),
    /// Page driver error.
    Driver(String),
    /// Fill or select requested without a payload.
    MissingData {
        /// The resolved action.
        action: ActionKind,
        /// The instruction being executed.
        instruction: String,
    },
    /// Rate limit exceeded.
    RateLimited,
    /// Timeout.
    Timeout,
}

impl LocatorError {
    /// Classify the error, if it is one a resolution step degrades on.
    ///
    /// Driver and IO errors are not classified: they are infrastructure
    /// failures the caller has to see.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Http(_)
            | Self::Remote(_)
            | Self::Llm(_)
            | Self::NotConfigured(_)
            | Self::RateLimited
            | Self::Timeout => Some(FailureKind::TransportFailure),
            Self::Json(_) | Self::MissingField(_) | Self::InvalidField(_) => {
                Some(FailureKind::SchemaViolation)
            }
            Self::MissingData { .. } => Some(FailureKind::MissingRequiredData),
            Self::Io(_) | Self::Driver(_) => None,
        }
    }
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::MissingField(field) => write!(f, "Missing field: {}", field),
            Self::InvalidField(field) => write!(f, "Invalid field: {}", field),
            Self::Remote(msg) => write!(f, "Remote error: {}", msg),
            Self::Llm(msg) => write!(f, "LLM error: {}", msg),
            Self::NotConfigured(what) => write!(f, "Not configured: {}", what),
            Self::Driver(msg) => write!(f, "Driver error: {}", msg),
            Self::MissingData {
                action,
                instruction,
            } => write!(
                f,
                "No data provided for {} action in prompt \"{}\"",
                action, instruction
            ),
            Self::RateLimited => write!(f, "Rate limit exceeded"),
            Self::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for LocatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LocatorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

impl From<serde_json::Error> for LocatorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for LocatorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result type for locator operations.
pub type LocatorResult<T> = Result<T, LocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_error_display_variants() {
        let err = LocatorError::MissingField("selector");
        assert_eq!(format!("{}", err), "Missing field: selector");

        let err = LocatorError::InvalidField("action");
        assert_eq!(format!("{}", err), "Invalid field: action");

        let err = LocatorError::Remote("HTTP 500".into());
        assert_eq!(format!("{}", err), "Remote error: HTTP 500");

        let err = LocatorError::NotConfigured("api_key");
        assert_eq!(format!("{}", err), "Not configured: api_key");

        let err = LocatorError::Driver("no such window".into());
        assert_eq!(format!("{}", err), "Driver error: no such window");

        let err = LocatorError::MissingData {
            action: ActionKind::Select,
            instruction: "select sort order".into(),
        };
        assert_eq!(
            format!("{}", err),
            "No data provided for select action in prompt \"select sort order\""
        );

        assert_eq!(format!("{}", LocatorError::RateLimited), "Rate limit exceeded");
        assert_eq!(format!("{}", LocatorError::Timeout), "Request timed out");
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            LocatorError::Timeout.kind(),
            Some(FailureKind::TransportFailure)
        );
        assert_eq!(
            LocatorError::Remote("x".into()).kind(),
            Some(FailureKind::TransportFailure)
        );
        assert_eq!(
            LocatorError::MissingField("action").kind(),
            Some(FailureKind::SchemaViolation)
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            LocatorError::from(json_err).kind(),
            Some(FailureKind::SchemaViolation)
        );
        assert_eq!(LocatorError::Driver("gone".into()).kind(), None);
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        assert!(LocatorError::Json(json_err).source().is_some());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(LocatorError::from(io_err).source().is_some());

        assert!(LocatorError::Timeout.source().is_none());
    }
}
