//! # Membership Ledger Workflows
//!
//! Join, recharge, consume, and refund against a merchant membership.
//!
//! ## Shared Ledger Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Membership Balance Mutation                           │
//! │                                                                         │
//! │  1. SELECT ... FOR UPDATE on the membership row                         │
//! │  2. Compute new balance + recharge/consume totals                       │
//! │     └── consume rejects balance < amount BEFORE any write              │
//! │  3. UPDATE the membership row                                          │
//! │  4. INSERT an immutable ledger row                                     │
//! │     └── invariant: ledger.balance_after == membership.balance          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::membership;
use bento_core::{
    validation, CoreError, MembershipTransaction, MembershipTxKind, MerchantMembership, Money,
};

// =============================================================================
// Parameters & Results
// =============================================================================

/// Parameters for [`Database::join_membership`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinMembershipParams {
    pub merchant_id: String,
    pub user_id: String,
}

/// Parameters for the three balance mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipLedgerParams {
    pub membership_id: String,

    /// Magnitude of the change in cents; the workflow applies the sign.
    pub amount_cents: i64,

    pub note: Option<String>,
}

/// Result of a membership balance mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipLedgerOutcome {
    /// Membership snapshot after the mutation.
    pub membership: MerchantMembership,

    /// The ledger row appended for this mutation.
    pub transaction: MembershipTransaction,
}

// =============================================================================
// Workflows
// =============================================================================

impl Database {
    /// Joins a user to a merchant's membership program.
    ///
    /// Idempotent: an existing (merchant, user) membership is returned
    /// unchanged rather than duplicated.
    pub async fn join_membership(
        &self,
        params: JoinMembershipParams,
    ) -> DbResult<MerchantMembership> {
        self.within_tx(move |tx| {
            Box::pin(async move {
                if let Some(existing) = membership::find_by_pair_for_update(
                    &mut *tx,
                    &params.merchant_id,
                    &params.user_id,
                )
                .await?
                {
                    return Ok(existing);
                }

                let now = Utc::now();
                let new = MerchantMembership {
                    id: Uuid::new_v4().to_string(),
                    merchant_id: params.merchant_id.clone(),
                    user_id: params.user_id.clone(),
                    balance_cents: 0,
                    total_recharged_cents: 0,
                    total_consumed_cents: 0,
                    created_at: now,
                    updated_at: now,
                };

                info!(id = %new.id, merchant_id = %new.merchant_id, "Joining membership");
                membership::insert(&mut *tx, &new).await?;

                Ok(new)
            })
        })
        .await
    }

    /// Credits a membership balance and appends a `recharge` ledger row.
    pub async fn recharge_membership(
        &self,
        params: MembershipLedgerParams,
    ) -> DbResult<MembershipLedgerOutcome> {
        validation::validate_amount_cents(params.amount_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                mutate_balance(&mut *tx, params, MembershipTxKind::Recharge).await
            })
        })
        .await
    }

    /// Debits a membership balance and appends a `consume` ledger row.
    ///
    /// ## Errors
    /// * `InsufficientBalance` - amount exceeds the current balance; the
    ///   membership row is left untouched
    pub async fn consume_membership(
        &self,
        params: MembershipLedgerParams,
    ) -> DbResult<MembershipLedgerOutcome> {
        validation::validate_amount_cents(params.amount_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                mutate_balance(&mut *tx, params, MembershipTxKind::Consume).await
            })
        })
        .await
    }

    /// Credits a membership balance back and appends a `refund` ledger row.
    pub async fn refund_membership(
        &self,
        params: MembershipLedgerParams,
    ) -> DbResult<MembershipLedgerOutcome> {
        validation::validate_amount_cents(params.amount_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                mutate_balance(&mut *tx, params, MembershipTxKind::Refund).await
            })
        })
        .await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// The one lock → compute → persist → append sequence shared by all
/// three balance mutations.
async fn mutate_balance(
    conn: &mut PgConnection,
    params: MembershipLedgerParams,
    kind: MembershipTxKind,
) -> DbResult<MembershipLedgerOutcome> {
    let now = Utc::now();

    let current = membership::get_for_update(&mut *conn, &params.membership_id)
        .await?
        .ok_or_else(|| DbError::not_found("MerchantMembership", &params.membership_id))?;

    let (new_balance, new_recharged, new_consumed) =
        next_balances(&current, kind, params.amount_cents)?;

    info!(
        membership_id = %current.id,
        kind = ?kind,
        amount_cents = params.amount_cents,
        balance_after_cents = new_balance,
        "Applying membership ledger mutation"
    );

    let updated = membership::apply_balance(
        &mut *conn,
        &current.id,
        new_balance,
        new_recharged,
        new_consumed,
        now,
    )
    .await?;

    let tx_row = MembershipTransaction {
        id: Uuid::new_v4().to_string(),
        membership_id: current.id.clone(),
        kind,
        amount_cents: params.amount_cents,
        balance_before_cents: current.balance_cents,
        balance_after_cents: new_balance,
        note: params.note,
        created_at: now,
    };
    membership::insert_transaction(&mut *conn, &tx_row).await?;

    Ok(MembershipLedgerOutcome {
        membership: updated,
        transaction: tx_row,
    })
}

/// Computes (balance, total_recharged, total_consumed) after a mutation.
///
/// Pure so the ledger arithmetic stays testable without a database.
fn next_balances(
    current: &MerchantMembership,
    kind: MembershipTxKind,
    amount_cents: i64,
) -> Result<(i64, i64, i64), CoreError> {
    match kind {
        MembershipTxKind::Recharge => Ok((
            current.balance_cents + amount_cents,
            current.total_recharged_cents + amount_cents,
            current.total_consumed_cents,
        )),
        MembershipTxKind::Consume => {
            let balance = Money::from_cents(current.balance_cents);
            if !balance.covers(Money::from_cents(amount_cents)) {
                return Err(CoreError::InsufficientBalance {
                    available_cents: current.balance_cents,
                    requested_cents: amount_cents,
                });
            }
            Ok((
                current.balance_cents - amount_cents,
                current.total_recharged_cents,
                current.total_consumed_cents + amount_cents,
            ))
        }
        MembershipTxKind::Refund => Ok((
            current.balance_cents + amount_cents,
            current.total_recharged_cents,
            current.total_consumed_cents,
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(balance: i64) -> MerchantMembership {
        let now = Utc::now();
        MerchantMembership {
            id: "m-1".to_string(),
            merchant_id: "merchant-1".to_string(),
            user_id: "user-1".to_string(),
            balance_cents: balance,
            total_recharged_cents: 10_000,
            total_consumed_cents: 4_000,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_recharge_credits_balance_and_total() {
        let (balance, recharged, consumed) =
            next_balances(&membership(6_000), MembershipTxKind::Recharge, 2_500).unwrap();
        assert_eq!(balance, 8_500);
        assert_eq!(recharged, 12_500);
        assert_eq!(consumed, 4_000);
    }

    #[test]
    fn test_consume_debits_balance_and_total() {
        let (balance, recharged, consumed) =
            next_balances(&membership(6_000), MembershipTxKind::Consume, 6_000).unwrap();
        assert_eq!(balance, 0);
        assert_eq!(recharged, 10_000);
        assert_eq!(consumed, 10_000);
    }

    #[test]
    fn test_consume_rejects_insufficient_balance() {
        let err = next_balances(&membership(100), MembershipTxKind::Consume, 101).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientBalance {
                available_cents: 100,
                requested_cents: 101,
            }
        ));
    }

    #[test]
    fn test_refund_credits_balance_only() {
        let (balance, recharged, consumed) =
            next_balances(&membership(6_000), MembershipTxKind::Refund, 1_000).unwrap();
        assert_eq!(balance, 7_000);
        assert_eq!(recharged, 10_000);
        assert_eq!(consumed, 4_000);
    }
}
