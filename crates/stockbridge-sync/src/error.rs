//! # Sync Error Types
//!
//! Error types for engine operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Store API     │  │     Enrollment          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  StoreApi       │  │  NotInCatalog           │ │
//! │  │  ConfigLoad     │  │  (adapter call) │  │  NotEnrolled            │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │   State Store   │  │    Internal     │                              │
//! │  │                 │  │                 │                              │
//! │  │  State          │  │  ChannelError   │                              │
//! │  │  Serialization  │  │  ShuttingDown   │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scope skips (wrong location, echo lock, untagged product, zero delta) are
//! not errors and never show up here.

use stockbridge_core::{CoreError, StoreKey, ValidationError};
use stockbridge_state::StateError;
use thiserror::Error;

use crate::adapter::StoreApiError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering every engine failure.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// A store adapter call failed.
    #[error(transparent)]
    StoreApi(#[from] StoreApiError),

    /// Operator supplied a malformed cross-store identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The identifier is not part of the source store's tagged catalog.
    #[error("'{identifier}' is not in the tagged catalog of {store}")]
    NotInCatalog { store: StoreKey, identifier: String },

    /// The counterpart store has no tagged product for the identifier.
    #[error("'{identifier}' is not enrolled in {store}")]
    NotEnrolled { store: StoreKey, identifier: String },

    // =========================================================================
    // State Errors
    // =========================================================================
    /// Shared state store failure.
    #[error("State store error: {0}")]
    State(#[from] StateError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Engine is shutting down.
    #[error("Sync engine is shutting down")]
    ShuttingDown,

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        SyncError::InvalidConfig(err.to_string())
    }
}

impl From<ValidationError> for SyncError {
    fn from(err: ValidationError) -> Self {
        SyncError::InvalidConfig(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if a store adapter call failed.
    pub fn is_store_api_error(&self) -> bool {
        matches!(self, SyncError::StoreApi(_))
    }

    /// Returns true if the identifier is outside the synchronized catalog on
    /// either side.
    pub fn is_enrollment_error(&self) -> bool {
        matches!(
            self,
            SyncError::NotInCatalog { .. } | SyncError::NotEnrolled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(SyncError::InvalidConfig("bad".into()).is_config_error());
        assert!(SyncError::ConfigLoadFailed("io".into()).is_config_error());

        let api: SyncError = StoreApiError::new("set_inventory_level", "HTTP 502").into();
        assert!(api.is_store_api_error());
        assert!(!api.is_config_error());

        let missing = SyncError::NotEnrolled {
            store: StoreKey::Secondary,
            identifier: "0123".into(),
        };
        assert!(missing.is_enrollment_error());
        assert!(!missing.is_store_api_error());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::NotInCatalog {
            store: StoreKey::Primary,
            identifier: "4006381333931".into(),
        };
        assert!(err.to_string().contains("4006381333931"));
        assert!(err.to_string().contains("primary"));

        let api: SyncError = StoreApiError::new("adjust_inventory_level", "timeout").into();
        assert!(api.to_string().contains("adjust_inventory_level"));
    }

    #[test]
    fn test_validation_maps_to_config_error() {
        let err: SyncError = ValidationError::Required { field: "tag".into() }.into();
        assert!(err.is_config_error());
    }
}
