//! Crate-level error type.
//!
//! Store and AI failures keep their own error enums close to where they
//! arise; [`EnrichError`] is the umbrella surfaced by engine entry
//! points.

use thiserror::Error;

use crate::ai::AiError;
use crate::directory::StoreError;

/// Convenience alias for engine-level results.
pub type EnrichResult<T> = Result<T, EnrichError>;

/// Top-level error surfaced by the enrichment engine.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The AI fallback failed on a path that surfaces provider errors.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// An internal invariant was violated.
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl EnrichError {
    /// Builds an internal error from any displayable message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the failure came from a store.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// True when the failure came from the AI provider.
    #[must_use]
    pub const fn is_ai(&self) -> bool {
        matches!(self, Self::Ai(_))
    }

    /// True when retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Ai(err) => err.is_transient(),
            Self::Store(_) | Self::Internal { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: EnrichError = StoreError::NotFound("acme.com".to_string()).into();
        assert!(err.is_store());
        assert!(!err.is_ai());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_ai_error_converts_and_classifies() {
        let err: EnrichError = AiError::Transport("refused".to_string()).into();
        assert!(err.is_ai());
        assert!(err.is_retryable());

        let err: EnrichError = AiError::Http {
            status: 429,
            body: String::new(),
        }
        .into();
        assert!(err.is_ai());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_internal_error_message() {
        let err = EnrichError::internal("bad state");
        assert_eq!(err.to_string(), "internal error: bad state");
        assert!(!err.is_retryable());
    }
}
