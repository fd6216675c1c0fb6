//! Error taxonomy for provider calls

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    /// No credential is set for any known provider. Not retryable.
    #[error("no AI provider configured: set one of {0}")]
    Configuration(String),

    /// The active provider rejected the credential
    #[error("{provider} rejected the API key; check {env_var}")]
    Auth {
        provider: &'static str,
        env_var: &'static str,
    },

    /// Upstream throttling; the caller may retry later
    #[error("{provider} rate limit exceeded")]
    RateLimit { provider: &'static str },

    /// Any other upstream failure, including timeouts and malformed responses
    #[error("{provider} request failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

impl AiError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        AiError::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::RateLimit { .. })
    }
}

pub type Result<T> = std::result::Result<T, AiError>;
