//! # Transaction Workflows
//!
//! Compound all-or-nothing business operations. Every workflow in the
//! submodules runs inside exactly one Postgres transaction: all of its
//! writes commit together or none of them do.
//!
//! ## Execution Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Workflow Execution                                  │
//! │                                                                         │
//! │  db.process_order_payment(params)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  within_tx(|tx| ...)                                                    │
//! │       │                                                                 │
//! │       ├── BEGIN                                                         │
//! │       │                                                                 │
//! │       ├── workflow body                                                 │
//! │       │     ├── repository accessors on the SAME transaction           │
//! │       │     ├── SELECT ... FOR UPDATE row locks                         │
//! │       │     └── domain checks (CoreError aborts everything)            │
//! │       │                                                                 │
//! │       ├── Ok(_)  → COMMIT                                               │
//! │       └── Err(_) → ROLLBACK                                             │
//! │                                                                         │
//! │  Locks are held only for the lifetime of the transaction; no           │
//! │  workflow performs network I/O while holding one.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! 1. Workflow bodies receive `&mut PgTransaction`, never the `Database` -
//!    nested `within_tx` invocation is impossible by construction.
//! 2. Workflows that lock multiple rows of the same resource class acquire
//!    the locks in a fixed global order (inventory: ascending dish id).
//! 3. Cross-resource lock order is also fixed: voucher before membership
//!    in order creation, rider deposit before user wallet in refunds.

use futures::future::BoxFuture;
use tracing::warn;

use crate::error::{DbError, DbResult};
use crate::pool::Database;

pub mod dish;
pub mod membership;
pub mod merchant;
pub mod order;
pub mod refund;
pub mod table;
pub mod user;
pub mod voucher;

/// A transaction handle scoped to one workflow invocation.
pub type PgTransaction = sqlx::Transaction<'static, sqlx::Postgres>;

impl Database {
    /// Runs `body` inside one Postgres transaction.
    ///
    /// Commits when the body returns `Ok`, rolls back when it returns
    /// `Err`. Exactly one commit or one rollback happens per call; no
    /// write from a failed body is ever visible to other transactions.
    pub(crate) async fn within_tx<T, F>(&self, body: F) -> DbResult<T>
    where
        F: for<'t> FnOnce(&'t mut PgTransaction) -> BoxFuture<'t, DbResult<T>>,
    {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match body(&mut tx).await {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                // The error already describes the failure; a rollback
                // failure only gets logged so it doesn't mask it.
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after workflow error");
                }
                Err(err)
            }
        }
    }
}
