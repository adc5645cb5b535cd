//! # Validation Module
//!
//! Input validation utilities for the Bento platform.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API layer (out of scope here)                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  └── Runs before any row is touched inside a workflow                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (PostgreSQL)                                        │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (claim ids, membership pairs)                  │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a region reference.
///
/// Merchant approval requires a valid positive region id before touching
/// any row.
pub fn validate_region_id(region_id: i64) -> ValidationResult<()> {
    if region_id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "region_id".to_string(),
        });
    }
    Ok(())
}

/// Validates a money amount for ledger operations.
///
/// Ledger operations take the magnitude of the change; the workflow
/// applies the sign. Zero and negative magnitudes are rejected.
pub fn validate_amount_cents(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount_cents".to_string(),
        });
    }
    Ok(())
}

/// Validates an order item quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a display name (dish, merchant, customization group).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an external claim id (refund idempotency key).
pub fn validate_claim_id(claim_id: &str) -> ValidationResult<()> {
    let claim_id = claim_id.trim();

    if claim_id.is_empty() {
        return Err(ValidationError::Required {
            field: "claim_id".to_string(),
        });
    }

    if claim_id.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "claim_id".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id() {
        assert!(validate_region_id(1).is_ok());
        assert!(validate_region_id(0).is_err());
        assert!(validate_region_id(-7).is_err());
    }

    #[test]
    fn test_amount_cents() {
        assert!(validate_amount_cents(1).is_ok());
        assert!(validate_amount_cents(0).is_err());
        assert!(validate_amount_cents(-100).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("  ").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_claim_id() {
        assert!(validate_claim_id("claim-2026-000123").is_ok());
        assert!(validate_claim_id("").is_err());
        assert!(validate_claim_id(&"x".repeat(101)).is_err());
    }
}
