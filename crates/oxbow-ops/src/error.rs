//! Operation tracking error types

use oxbow_api::ApiError;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while tracking operations or retrying actions
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("operation {operation_id}: status polling failed {attempts} times in a row: {source}")]
    PollingFailed {
        operation_id: String,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("operations still unfinished after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl OpsError {
    /// Numeric HTTP status carried by the underlying API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            OpsError::Api(err) => err.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
