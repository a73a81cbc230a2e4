//! Provider error types.
//!
//! Defined in `nepqgen-core` so the question generator can downcast provider
//! failures and decide whether to retry or fall back without string matching.

use thiserror::Error;

/// Errors that can occur when calling a generative model.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The API key was missing, invalid, or lacks permission.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model does not exist for this provider.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The model refused to answer (safety filter or similar).
    #[error("response blocked: {0}")]
    Blocked(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response arrived but could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::ModelNotFound(_)
                | ProviderError::Blocked(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::Blocked("SAFETY".into()).is_permanent());
        assert!(!ProviderError::Timeout(30).is_permanent());
        assert!(!ProviderError::RateLimited { retry_after_ms: 10 }.is_permanent());
    }

    #[test]
    fn retry_hint_only_for_rate_limits() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(ProviderError::NetworkError("reset".into()).retry_after_ms(), None);
    }
}
