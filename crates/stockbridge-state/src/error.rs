//! # State Store Error Types
//!
//! Error types for shared state operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend error (redis::RedisError, serde_json::Error)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StateError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError::State (engine) ← journaled at the per-event boundary       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Shared state store errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// Could not reach the backend.
    ///
    /// ## When This Occurs
    /// - Redis is down or the URL points nowhere
    /// - Connection dropped and could not be re-established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The state URL scheme is not supported.
    #[error("Unsupported state store URL: {0}")]
    UnsupportedUrl(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization failed for key '{key}': {message}")]
    Serialization { key: String, message: String },

    /// A counter key holds something that is not an integer.
    #[error("Value at '{0}' is not an integer")]
    NotAnInteger(String),

    /// Command rejected by the backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StateError {
    /// Creates a Serialization error for a given key.
    pub fn serialization(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StateError::Serialization {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if the backend could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, StateError::ConnectionFailed(_))
    }
}

/// Convert redis errors to StateError.
///
/// ## Error Mapping
/// ```text
/// connection refused / dropped / timeout → StateError::ConnectionFailed
/// Other                                  → StateError::Backend
/// ```
impl From<redis::RedisError> for StateError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            StateError::ConnectionFailed(err.to_string())
        } else {
            StateError::Backend(err.to_string())
        }
    }
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_carries_key() {
        let err = StateError::serialization("inventory:primary:A1", "expected value");
        assert!(err.to_string().contains("inventory:primary:A1"));
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_connection_error_category() {
        assert!(StateError::ConnectionFailed("refused".into()).is_connection_error());
        assert!(!StateError::Backend("WRONGTYPE".into()).is_connection_error());
    }
}
