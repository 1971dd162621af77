//! # Validation Module
//!
//! Validation of identifiers and tunables before they reach the engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport                                                    │
//! │  └── Signature checks, payload normalization (out of scope)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Config load / operator input                                 │
//! │  └── THIS MODULE: tags, identifiers, TTLs, windows                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine filters                                               │
//! │  └── location, echo-lock, tag, identifier presence                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_LOCK_TTL_SECS, MIN_LOCK_TTL_SECS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a cross-store identifier (GTIN-14 plus generous slack
/// for custom barcodes).
const MAX_IDENTIFIER_LEN: usize = 64;

/// Maximum length of a catalog tag.
const MAX_TAG_LEN: usize = 255;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and normalizes a cross-store identifier.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 64 characters
/// - No whitespace or `:` inside (the identifier is embedded in state keys)
///
/// ## Example
/// ```rust
/// use stockbridge_core::validation::validate_cross_store_id;
///
/// assert_eq!(validate_cross_store_id(" 0012345 ").unwrap(), "0012345");
/// assert!(validate_cross_store_id("").is_err());
/// assert!(validate_cross_store_id("a:b").is_err());
/// ```
pub fn validate_cross_store_id(id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "identifier".to_string(),
        });
    }

    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: "identifier".to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    if id.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(ValidationError::InvalidFormat {
            field: "identifier".to_string(),
            reason: "must not contain whitespace or ':'".to_string(),
        });
    }

    Ok(id.to_string())
}

/// Validates the sync tag.
pub fn validate_tag(tag: &str) -> ValidationResult<()> {
    let tag = tag.trim();

    if tag.is_empty() {
        return Err(ValidationError::Required {
            field: "tag".to_string(),
        });
    }

    if tag.len() > MAX_TAG_LEN {
        return Err(ValidationError::TooLong {
            field: "tag".to_string(),
            max: MAX_TAG_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the echo-lock TTL.
///
/// ## Rules
/// - Between 20 and 30 seconds inclusive
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  too short (< 20s)          │ echo of our own write arrives after the  │
/// │                             │ lock expired → feedback loop             │
/// │  too long  (> 30s)          │ genuine rapid edits on the target are    │
/// │                             │ swallowed as echoes                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_lock_ttl(secs: u64) -> ValidationResult<()> {
    if !(MIN_LOCK_TTL_SECS..=MAX_LOCK_TTL_SECS).contains(&secs) {
        return Err(ValidationError::OutOfRange {
            field: "lock_ttl_secs".to_string(),
            min: MIN_LOCK_TTL_SECS as i64,
            max: MAX_LOCK_TTL_SECS as i64,
        });
    }

    Ok(())
}

/// Validates a TTL or window that must be non-zero.
pub fn validate_positive(field: &str, value: u64) -> ValidationResult<()> {
    if value == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a location id (store APIs use positive numeric ids).
pub fn validate_location_id(field: &str, location_id: i64) -> ValidationResult<()> {
    if location_id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
