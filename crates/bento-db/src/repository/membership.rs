//! Accessors for merchant memberships and their transaction ledger.

use sqlx::PgConnection;
use tracing::debug;

use crate::error::DbResult;
use bento_core::{MembershipTransaction, MerchantMembership};

/// Finds a membership by (merchant, user) under an exclusive row lock.
pub async fn find_by_pair_for_update(
    conn: &mut PgConnection,
    merchant_id: &str,
    user_id: &str,
) -> DbResult<Option<MerchantMembership>> {
    let membership = sqlx::query_as::<_, MerchantMembership>(
        "SELECT * FROM merchant_memberships WHERE merchant_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(merchant_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(membership)
}

/// Gets a membership by ID under an exclusive row lock.
///
/// Every balance mutation goes through this lock first.
pub async fn get_for_update(
    conn: &mut PgConnection,
    id: &str,
) -> DbResult<Option<MerchantMembership>> {
    let membership = sqlx::query_as::<_, MerchantMembership>(
        "SELECT * FROM merchant_memberships WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(membership)
}

/// Inserts a new membership row.
pub async fn insert(conn: &mut PgConnection, membership: &MerchantMembership) -> DbResult<()> {
    debug!(id = %membership.id, merchant_id = %membership.merchant_id, "Inserting membership");

    sqlx::query(
        r#"
        INSERT INTO merchant_memberships (
            id, merchant_id, user_id, balance_cents,
            total_recharged_cents, total_consumed_cents,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&membership.id)
    .bind(&membership.merchant_id)
    .bind(&membership.user_id)
    .bind(membership.balance_cents)
    .bind(membership.total_recharged_cents)
    .bind(membership.total_consumed_cents)
    .bind(membership.created_at)
    .bind(membership.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Persists a new balance together with updated recharge/consume totals,
/// returning the updated row.
pub async fn apply_balance(
    conn: &mut PgConnection,
    id: &str,
    balance_cents: i64,
    total_recharged_cents: i64,
    total_consumed_cents: i64,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> DbResult<MerchantMembership> {
    let membership = sqlx::query_as::<_, MerchantMembership>(
        r#"
        UPDATE merchant_memberships
        SET balance_cents = $2,
            total_recharged_cents = $3,
            total_consumed_cents = $4,
            updated_at = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(balance_cents)
    .bind(total_recharged_cents)
    .bind(total_consumed_cents)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(membership)
}

/// Appends an immutable ledger row.
pub async fn insert_transaction(
    conn: &mut PgConnection,
    tx_row: &MembershipTransaction,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO membership_transactions (
            id, membership_id, kind, amount_cents,
            balance_before_cents, balance_after_cents, note, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&tx_row.id)
    .bind(&tx_row.membership_id)
    .bind(tx_row.kind)
    .bind(tx_row.amount_cents)
    .bind(tx_row.balance_before_cents)
    .bind(tx_row.balance_after_cents)
    .bind(&tx_row.note)
    .bind(tx_row.created_at)
    .execute(conn)
    .await?;

    Ok(())
}
