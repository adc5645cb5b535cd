//! # Repository Module
//!
//! Single-row data accessors for the Bento platform.
//!
//! ## Accessor Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Accessor Pattern Explained                           │
//! │                                                                         │
//! │  Every function here is one table operation: read, read-with-lock,     │
//! │  insert, update, delete, or count. None of them opens a transaction;   │
//! │  they all take `&mut PgConnection` and only ever run inside a          │
//! │  transaction handed out by the executor in `tx::mod`.                  │
//! │                                                                         │
//! │  Workflow (tx/order.rs)                                                │
//! │       │                                                                 │
//! │       │  inventory::get_for_update(&mut *tx, ...)                      │
//! │       ▼                                                                 │
//! │  SELECT ... FOR UPDATE ← row lock held until COMMIT/ROLLBACK           │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place per resource                           │
//! │  • Lock scope is always the enclosing transaction, never longer        │
//! │  • Compound workflows compose accessors, never raw SQL                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delete Semantics
//!
//! Delete helpers return the affected-row count and callers treat zero
//! as success, not as not-found.

pub mod balance;
pub mod delivery;
pub mod dish;
pub mod inventory;
pub mod membership;
pub mod merchant;
pub mod order;
pub mod table;
pub mod user;
pub mod voucher;
