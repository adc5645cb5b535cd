//! # bento-db: Transactional Data Layer for the Bento Platform
//!
//! This crate provides PostgreSQL access for Bento and carries the
//! platform's atomic business workflows: every compound operation
//! (order creation, payment, ledger mutations, voucher lifecycle,
//! refunds, merchant approval) runs inside exactly one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bento Data Flow                                  │
//! │                                                                         │
//! │  API layer (out of scope)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bento-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  tx workflows │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (tx/*.rs)    │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ PgPool        │◄───│ create_order  │    │ 001_initial_ │  │   │
//! │  │   │ DbConfig      │    │ claim_refund  │    │ schema.sql   │  │   │
//! │  │   │ within_tx     │    │ delete_table  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                        ┌───────▼───────┐                       │   │
//! │  │                        │  repository/  │ single-row accessors  │   │
//! │  │                        │  (tx-scoped)  │ + FOR UPDATE locks    │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Single-row accessors, scoped to a transaction
//! - [`tx`] - Compound all-or-nothing workflows (the public surface)
//!
//! ## Usage
//! ```rust,ignore
//! use bento_db::{Database, DbConfig};
//! use bento_db::tx::refund::ClaimRefundParams;
//!
//! let db = Database::connect(DbConfig::from_env()?).await?;
//!
//! let outcome = db
//!     .claim_refund(ClaimRefundParams {
//!         claim_id: "claim-2026-000123".into(),
//!         user_id: user.id,
//!         amount_cents: 3000,
//!         source: None,
//!         note: None,
//!     })
//!     .await?;
//! assert!(!outcome.replayed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod tx;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Workflow parameter/result types for convenience
pub use tx::dish::{
    CreateDishParams, CustomizationTree, DishOutcome, NewCustomizationGroup,
    NewCustomizationOption, UpdateDishParams,
};
pub use tx::membership::{
    JoinMembershipParams, MembershipLedgerOutcome, MembershipLedgerParams,
};
pub use tx::merchant::{
    ApproveApplicationOutcome, ApproveApplicationParams, ResetApplicationOutcome,
};
pub use tx::order::{
    CreateOrderOutcome, CreateOrderParams, NewOrderItem, PaymentOutcome,
};
pub use tx::refund::{
    ClaimRefundOutcome, ClaimRefundParams, DeductRiderDepositOutcome, DeductRiderDepositParams,
};
pub use tx::table::DeleteTableOutcome;
pub use tx::user::{CreateUserOutcome, CreateUserParams};
pub use tx::voucher::{ClaimVoucherParams, UseVoucherParams, VoucherOutcome};
