//! Errors surfaced by an [`LLMProvider`](super::LLMProvider).
//!
//! A small, named-variant enum covering only what the single `invoke(prompt) -> String`
//! contract can actually produce.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    #[error("rate limit exceeded, retry after {retry_after_secs:?}s")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    #[error("request to {provider} timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    #[error("network error talking to {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("{provider} returned status {status}: {message}")]
    Api { provider: String, status: u16, message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("failed to parse provider response: {message}")]
    Parse { message: String },

    #[error("{provider}: {message}")]
    Other { provider: String, message: String },
}

impl LLMError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication { message: message.into() }
    }

    pub fn rate_limit(retry_after_secs: Option<u64>) -> Self {
        Self::RateLimitExceeded { retry_after_secs }
    }

    pub fn timeout(provider: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout { provider: provider.into(), timeout_secs }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network { provider: provider.into(), message: message.into() }
    }

    pub fn api(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api { provider: provider.into(), status, message: message.into() }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }

    pub fn other(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other { provider: provider.into(), message: message.into() }
    }

    /// Whether a retry with backoff is worth attempting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. } | Self::Timeout { .. } | Self::Network { .. })
    }
}

pub type LLMResult<T> = Result<T, LLMError>;

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout { provider: "http".to_string(), timeout_secs: 0 }
        } else {
            LLMError::Network { provider: "http".to_string(), message: err.to_string() }
        }
    }
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        LLMError::Parse { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = LLMError::api("openai-compatible", 429, "rate limited");
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn retryable_classification() {
        assert!(LLMError::rate_limit(Some(2)).is_retryable());
        assert!(LLMError::timeout("openai-compatible", 30).is_retryable());
        assert!(!LLMError::invalid_request("bad prompt").is_retryable());
    }
}
