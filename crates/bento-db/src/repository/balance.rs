//! Accessors for user wallets, the wallet ledger, and rider deposits.
//!
//! The wallet ledger's `claim_id` column carries the external
//! idempotency key for claim refunds; a partial unique index guarantees
//! at most one effective mutation per claim regardless of retries.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::error::DbResult;
use bento_core::{Rider, UserBalance, UserBalanceLog};

/// Gets a user's wallet row under an exclusive row lock, creating a
/// zero-balance row first if the user has never held funds.
///
/// The insert-then-lock sequence keeps first-credit races safe: both
/// transactions converge on the same row and serialize on the lock.
pub async fn get_or_init_for_update(
    conn: &mut PgConnection,
    user_id: &str,
) -> DbResult<UserBalance> {
    sqlx::query(
        r#"
        INSERT INTO user_balances (user_id, balance_cents, updated_at)
        VALUES ($1, 0, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    let balance = sqlx::query_as::<_, UserBalance>(
        "SELECT * FROM user_balances WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(balance)
}

/// Persists a new wallet balance, returning the updated row.
pub async fn set_balance(
    conn: &mut PgConnection,
    user_id: &str,
    balance_cents: i64,
    updated_at: DateTime<Utc>,
) -> DbResult<UserBalance> {
    let balance = sqlx::query_as::<_, UserBalance>(
        r#"
        UPDATE user_balances
        SET balance_cents = $2, updated_at = $3
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(balance_cents)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(balance)
}

/// Appends an immutable wallet ledger row.
pub async fn insert_log(conn: &mut PgConnection, log: &UserBalanceLog) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_balance_logs (
            id, user_id, kind, amount_cents,
            balance_before_cents, balance_after_cents,
            claim_id, source, note, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&log.id)
    .bind(&log.user_id)
    .bind(log.kind)
    .bind(log.amount_cents)
    .bind(log.balance_before_cents)
    .bind(log.balance_after_cents)
    .bind(&log.claim_id)
    .bind(&log.source)
    .bind(&log.note)
    .bind(log.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Finds a prior ledger row for an external claim id.
///
/// A hit means the claim was already applied; the refund workflows
/// short-circuit to a no-op success instead of crediting twice.
pub async fn find_log_by_claim(
    conn: &mut PgConnection,
    claim_id: &str,
) -> DbResult<Option<UserBalanceLog>> {
    let log = sqlx::query_as::<_, UserBalanceLog>(
        "SELECT * FROM user_balance_logs WHERE claim_id = $1",
    )
    .bind(claim_id)
    .fetch_optional(conn)
    .await?;

    Ok(log)
}

/// Gets a rider under an exclusive row lock. Deposit mutations always
/// take this lock first, before the target user's wallet lock.
pub async fn get_rider_for_update(conn: &mut PgConnection, id: &str) -> DbResult<Option<Rider>> {
    let rider = sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(rider)
}

/// Persists a new rider deposit, returning the updated row.
pub async fn set_rider_deposit(
    conn: &mut PgConnection,
    id: &str,
    deposit_cents: i64,
    updated_at: DateTime<Utc>,
) -> DbResult<Rider> {
    let rider = sqlx::query_as::<_, Rider>(
        "UPDATE riders SET deposit_cents = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(deposit_cents)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(rider)
}
