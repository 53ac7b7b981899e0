//! Error Types
//!
//! One error surface for every boundary the client touches: the page, the
//! prediction service, speech synthesis and speech recognition.

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CivicError>;

#[derive(Debug, Error)]
pub enum CivicError {
    /// A page element the flow depends on does not exist
    #[error("Element not found: #{id}")]
    ElementNotFound { id: String },

    /// The request never produced a response (connect failure, timeout, ...)
    #[error("Prediction request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body was not valid JSON
    #[error("Failed to parse prediction response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The prediction service answered with a non-success status
    #[error("Prediction service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    /// Recognition finished without producing a transcript
    #[error("No speech was recognized")]
    NoSpeech,

    #[error("No speech detected within {}s", .0.as_secs_f32())]
    ListenTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CivicError {
    pub fn element_not_found(id: impl Into<String>) -> Self {
        Self::ElementNotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_message() {
        let err = CivicError::element_not_found("traffic");
        assert_eq!(err.to_string(), "Element not found: #traffic");
    }

    #[test]
    fn test_service_error_message() {
        let err = CivicError::Service {
            status: 400,
            message: "Missing field: traffic".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Prediction service error (400): Missing field: traffic"
        );
    }

    #[test]
    fn test_listen_timeout_message() {
        let err = CivicError::ListenTimeout(Duration::from_millis(2500));
        assert_eq!(err.to_string(), "No speech detected within 2.5s");
    }

    #[test]
    fn test_parse_error_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: CivicError = json_err.into();
        assert!(err.to_string().contains("parse"));
    }
}
