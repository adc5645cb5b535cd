//! # bento-core: Pure Business Logic for the Bento Platform
//!
//! This crate is the **heart** of Bento, a local-services commerce platform
//! (food ordering, delivery dispatch, merchant/member wallets, vouchers).
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Bento Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Request / API Layer (external)                 │   │
//! │  │     create_order, process_payment, claim_voucher, ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                bento-db (transaction workflows)                 │   │
//! │  │      one Postgres transaction per compound operation            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bento-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    eta    │  │ validation│  │   │
//! │  │   │  Order    │  │   Money   │  │  prepare  │  │   rules   │  │   │
//! │  │   │  Voucher  │  │  (cents)  │  │  transit  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Voucher, MerchantMembership, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`eta`] - Delivery ETA estimation and pool priority tiers
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod eta;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// Sentinel value for daily inventory with unlimited stock.
pub const UNLIMITED_INVENTORY: i64 = -1;

/// Maximum quantity of a single dish per order item.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Role name assigned to every newly registered user.
pub const DEFAULT_USER_ROLE: &str = "user";

/// Role name granted when a merchant application is approved.
pub const MERCHANT_ROLE: &str = "merchant";
