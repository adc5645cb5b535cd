//! # Claim-Refund Workflows
//!
//! Idempotent wallet credits keyed by an externally supplied claim id,
//! plus the rider-deposit debit-then-credit composite.
//!
//! ## Idempotency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Claim-Refund Idempotency                              │
//! │                                                                         │
//! │  lock user wallet (insert-if-absent, then FOR UPDATE)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  prior ledger row with this claim id?                                   │
//! │       ├── yes → return stored row + current balance (replayed = true)  │
//! │       │         NO mutation - replay is success, not error             │
//! │       └── no  → credit wallet, append ledger row carrying claim id     │
//! │                                                                         │
//! │  Backstop: UNIQUE partial index on user_balance_logs.claim_id -        │
//! │  a racing duplicate loses with a unique violation and rolls back.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rider variant locks the rider deposit FIRST, then the target
//! wallet - a fixed cross-resource order shared by every caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::balance;
use bento_core::{
    validation, BalanceLogKind, CoreError, Money, Rider, UserBalance, UserBalanceLog,
};

// =============================================================================
// Parameters & Results
// =============================================================================

/// Parameters for [`Database::claim_refund`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRefundParams {
    /// External idempotency key; at most one effective mutation per id.
    pub claim_id: String,

    pub user_id: String,
    pub amount_cents: i64,

    /// Where the money came from.
    pub source: Option<String>,
    pub note: Option<String>,
}

/// Result of [`Database::claim_refund`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRefundOutcome {
    /// Wallet snapshot after the call (unchanged on replay).
    pub balance: UserBalance,

    /// The ledger row for this claim id (the stored one on replay).
    pub log: UserBalanceLog,

    /// True when the claim id had already been applied.
    pub replayed: bool,
}

/// Parameters for [`Database::deduct_rider_deposit_and_refund`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductRiderDepositParams {
    pub claim_id: String,
    pub rider_id: String,

    /// User whose wallet receives the refund.
    pub user_id: String,

    pub amount_cents: i64,
    pub note: Option<String>,
}

/// Result of [`Database::deduct_rider_deposit_and_refund`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductRiderDepositOutcome {
    /// Rider snapshot after the call (unchanged on replay).
    pub rider: Rider,

    pub balance: UserBalance,
    pub log: UserBalanceLog,
    pub replayed: bool,
}

// =============================================================================
// Workflows
// =============================================================================

impl Database {
    /// Credits a user's wallet for an external claim, exactly once per
    /// claim id. Replaying the same claim id returns the stored state
    /// unchanged.
    pub async fn claim_refund(&self, params: ClaimRefundParams) -> DbResult<ClaimRefundOutcome> {
        validation::validate_claim_id(&params.claim_id)?;
        validation::validate_amount_cents(params.amount_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();
                let wallet = balance::get_or_init_for_update(&mut *tx, &params.user_id).await?;

                if let Some(prior) = balance::find_log_by_claim(&mut *tx, &params.claim_id).await?
                {
                    info!(claim_id = %params.claim_id, "Claim already applied, replaying");
                    return Ok(ClaimRefundOutcome {
                        balance: wallet,
                        log: prior,
                        replayed: true,
                    });
                }

                let (balance, log) = credit_wallet(
                    &mut *tx,
                    &wallet,
                    &params.claim_id,
                    params.amount_cents,
                    params.source,
                    params.note,
                    now,
                )
                .await?;

                Ok(ClaimRefundOutcome {
                    balance,
                    log,
                    replayed: false,
                })
            })
        })
        .await
    }

    /// Deducts an amount from a rider's deposit and credits it to a
    /// user's wallet, atomically and exactly once per claim id.
    ///
    /// ## Errors
    /// * `InsufficientDeposit` - deposit does not cover the amount; no
    ///   row is mutated
    pub async fn deduct_rider_deposit_and_refund(
        &self,
        params: DeductRiderDepositParams,
    ) -> DbResult<DeductRiderDepositOutcome> {
        validation::validate_claim_id(&params.claim_id)?;
        validation::validate_amount_cents(params.amount_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                // Rider deposit first, wallet second - fixed order.
                let rider = balance::get_rider_for_update(&mut *tx, &params.rider_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Rider", &params.rider_id))?;
                let wallet = balance::get_or_init_for_update(&mut *tx, &params.user_id).await?;

                if let Some(prior) = balance::find_log_by_claim(&mut *tx, &params.claim_id).await?
                {
                    info!(claim_id = %params.claim_id, "Claim already applied, replaying");
                    return Ok(DeductRiderDepositOutcome {
                        rider,
                        balance: wallet,
                        log: prior,
                        replayed: true,
                    });
                }

                let deposit = Money::from_cents(rider.deposit_cents);
                if !deposit.covers(Money::from_cents(params.amount_cents)) {
                    return Err(CoreError::InsufficientDeposit {
                        available_cents: rider.deposit_cents,
                        requested_cents: params.amount_cents,
                    }
                    .into());
                }

                info!(
                    rider_id = %rider.id,
                    claim_id = %params.claim_id,
                    amount_cents = params.amount_cents,
                    "Deducting rider deposit for refund"
                );

                let updated_rider = balance::set_rider_deposit(
                    &mut *tx,
                    &rider.id,
                    rider.deposit_cents - params.amount_cents,
                    now,
                )
                .await?;

                let (balance, log) = credit_wallet(
                    &mut *tx,
                    &wallet,
                    &params.claim_id,
                    params.amount_cents,
                    Some(format!("rider_deposit:{}", rider.id)),
                    params.note,
                    now,
                )
                .await?;

                Ok(DeductRiderDepositOutcome {
                    rider: updated_rider,
                    balance,
                    log,
                    replayed: false,
                })
            })
        })
        .await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// The credit path shared by both workflows: new balance + ledger row
/// carrying the claim id.
async fn credit_wallet(
    conn: &mut PgConnection,
    wallet: &UserBalance,
    claim_id: &str,
    amount_cents: i64,
    source: Option<String>,
    note: Option<String>,
    now: DateTime<Utc>,
) -> DbResult<(UserBalance, UserBalanceLog)> {
    let new_balance = wallet.balance_cents + amount_cents;

    let updated =
        balance::set_balance(&mut *conn, &wallet.user_id, new_balance, now).await?;

    let log = UserBalanceLog {
        id: Uuid::new_v4().to_string(),
        user_id: wallet.user_id.clone(),
        kind: BalanceLogKind::ClaimRefund,
        amount_cents,
        balance_before_cents: wallet.balance_cents,
        balance_after_cents: new_balance,
        claim_id: Some(claim_id.to_string()),
        source,
        note,
        created_at: now,
    };
    balance::insert_log(&mut *conn, &log).await?;

    Ok((updated, log))
}
