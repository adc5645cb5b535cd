//! # Error Types
//!
//! Domain-specific error types for bento-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bento-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bento-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → API layer → caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (dish id, counts, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every variant aborts its entire compound transaction

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations raised inside a
/// transaction workflow. Any of them rolls the whole transaction back -
/// there is no partial-success path anywhere in this layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Membership or wallet balance does not cover the requested amount.
    ///
    /// ## When This Occurs
    /// - `consume_membership` with amount > balance
    /// - Order creation paying with wallet funds the member doesn't have
    #[error("Insufficient balance: available {available_cents}, requested {requested_cents}")]
    InsufficientBalance {
        available_cents: i64,
        requested_cents: i64,
    },

    /// Rider deposit does not cover the requested deduction.
    #[error("Insufficient deposit: available {available_cents}, requested {requested_cents}")]
    InsufficientDeposit {
        available_cents: i64,
        requested_cents: i64,
    },

    /// Daily inventory cannot cover the requested quantity.
    ///
    /// ## When This Occurs
    /// - Payment processing when `total - sold < requested` for a dish
    ///   whose inventory is not unlimited (`total != -1`)
    #[error("Insufficient inventory for dish {dish_id}: available {available}, requested {requested}")]
    InsufficientInventory {
        dish_id: String,
        available: i64,
        requested: i64,
    },

    /// Voucher template is deactivated.
    #[error("Voucher {0} is not active")]
    VoucherInactive(String),

    /// Voucher validity window has not started yet.
    #[error("Voucher {0} is not yet valid")]
    VoucherNotStarted(String),

    /// Voucher (or user voucher) is past its expiry.
    #[error("Voucher {0} has expired")]
    VoucherExpired(String),

    /// The user already holds a claim for this voucher.
    ///
    /// A user may claim a given voucher at most once; this is enforced
    /// both by an in-transaction existence check and a unique index.
    #[error("Voucher {voucher_id} already claimed by user {user_id}")]
    VoucherAlreadyClaimed {
        voucher_id: String,
        user_id: String,
    },

    /// The user voucher has already been redeemed.
    #[error("User voucher {0} has already been used")]
    VoucherAlreadyUsed(String),

    /// Order is not in a status that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Processing payment for an order that is not `created`
    /// - Replayed payment callbacks
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
    },

    /// Table still has future reservations pending against it.
    ///
    /// Fatal for the delete workflow, never retried.
    #[error("Table {table_id} has {count} future reservation(s)")]
    TableHasReservations { table_id: String, count: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any row is touched.
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

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientInventory {
            dish_id: "dish-1".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient inventory for dish dish-1: available 2, requested 3"
        );

        let err = CoreError::InsufficientBalance {
            available_cents: 1000,
            requested_cents: 2500,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: available 1000, requested 2500"
        );
    }

    #[test]
    fn test_table_guard_message() {
        let err = CoreError::TableHasReservations {
            table_id: "t-9".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "Table t-9 has 2 future reservation(s)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "region_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
