//! # Error Types
//!
//! Domain-specific error types for stockbridge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbridge-core errors (this file)                                   │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Identifier / config value failures             │
//! │                                                                         │
//! │  stockbridge-state errors (separate crate)                             │
//! │  └── StateError       - State store failures                           │
//! │                                                                         │
//! │  stockbridge-sync errors (separate crate)                              │
//! │  └── SyncError        - Engine, adapter and config failures            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → operator / logs       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A store name did not map to either side of the pair.
    #[error("Unknown store: '{0}'. Valid options: primary, secondary")]
    UnknownStore(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownStore("tertiary".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown store: 'tertiary'. Valid options: primary, secondary"
        );

        let err = ValidationError::OutOfRange {
            field: "lock_ttl_secs".to_string(),
            min: 20,
            max: 30,
        };
        assert_eq!(err.to_string(), "lock_ttl_secs must be between 20 and 30");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "tag".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
