//! Client configuration

use crate::error::{ApiError, Result};

/// Default public endpoint for the Oxbow control plane
pub const DEFAULT_API_BASE: &str = "https://api.oxbow.cloud/v2";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API endpoint (staging, local mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create ApiConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OXBOW_API_KEY")
            .map_err(|_| ApiError::MissingEnvVar("OXBOW_API_KEY".to_string()))?;
        let base_url =
            std::env::var("OXBOW_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self { api_key, base_url })
    }
}
