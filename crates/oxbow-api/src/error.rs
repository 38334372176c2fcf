//! Control-plane API error types

use thiserror::Error;

/// Errors produced by the control-plane API client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

impl ApiError {
    /// Numeric HTTP status carried by this error, if any.
    ///
    /// Retry classification keys off this value; errors without a status
    /// are never considered transient.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
