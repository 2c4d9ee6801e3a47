//! Error types for the blood request client.

use thiserror::Error;

use crate::form::FieldErrors;

/// Result type alias using the blood request error type.
pub type Result<T> = std::result::Result<T, BloodRequestError>;

/// Main error type for the blood request client.
#[derive(Error, Debug)]
pub enum BloodRequestError {
    /// One or more form fields failed validation
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// The form was submitted before it finished loading
    #[error("Form is not ready for submission")]
    FormNotReady,

    /// The owning view was torn down while the operation was in flight
    #[error("Operation cancelled: view was torn down")]
    Cancelled,

    /// The API answered with a non-success HTTP status
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client error
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BloodRequestError {
    /// True for failures of the transport itself (network, status, body parsing),
    /// as opposed to validation, lifecycle or configuration problems.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BloodRequestError::HttpClient(_)
                | BloodRequestError::UnexpectedStatus { .. }
                | BloodRequestError::Serialization(_)
                | BloodRequestError::Other(_)
        )
    }
}
