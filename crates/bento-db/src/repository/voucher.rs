//! Accessors for voucher templates and per-user claims.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::error::DbResult;
use bento_core::{UserVoucher, Voucher};

/// Gets a voucher template under an exclusive row lock.
///
/// Claiming locks the template so the claimed-quantity counter and the
/// per-user uniqueness check stay consistent under concurrent claims.
pub async fn get_for_update(conn: &mut PgConnection, id: &str) -> DbResult<Option<Voucher>> {
    let voucher = sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(voucher)
}

/// Finds an existing claim for (voucher, user).
pub async fn find_claim(
    conn: &mut PgConnection,
    voucher_id: &str,
    user_id: &str,
) -> DbResult<Option<UserVoucher>> {
    let claim = sqlx::query_as::<_, UserVoucher>(
        "SELECT * FROM user_vouchers WHERE voucher_id = $1 AND user_id = $2",
    )
    .bind(voucher_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(claim)
}

/// Gets a user voucher under an exclusive row lock.
pub async fn get_claim_for_update(
    conn: &mut PgConnection,
    id: &str,
) -> DbResult<Option<UserVoucher>> {
    let claim =
        sqlx::query_as::<_, UserVoucher>("SELECT * FROM user_vouchers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

    Ok(claim)
}

/// Inserts a new claim row.
pub async fn insert_claim(conn: &mut PgConnection, claim: &UserVoucher) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_vouchers (
            id, voucher_id, user_id, status, order_id,
            expires_at, claimed_at, used_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&claim.id)
    .bind(&claim.voucher_id)
    .bind(&claim.user_id)
    .bind(claim.status)
    .bind(&claim.order_id)
    .bind(claim.expires_at)
    .bind(claim.claimed_at)
    .bind(claim.used_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Increments the claimed-quantity counter, returning the updated template.
pub async fn add_claimed(conn: &mut PgConnection, voucher_id: &str) -> DbResult<Voucher> {
    let voucher = sqlx::query_as::<_, Voucher>(
        "UPDATE vouchers SET claimed_quantity = claimed_quantity + 1 WHERE id = $1 RETURNING *",
    )
    .bind(voucher_id)
    .fetch_one(conn)
    .await?;

    Ok(voucher)
}

/// Increments the used-quantity counter, returning the updated template.
pub async fn add_used(conn: &mut PgConnection, voucher_id: &str) -> DbResult<Voucher> {
    let voucher = sqlx::query_as::<_, Voucher>(
        "UPDATE vouchers SET used_quantity = used_quantity + 1 WHERE id = $1 RETURNING *",
    )
    .bind(voucher_id)
    .fetch_one(conn)
    .await?;

    Ok(voucher)
}

/// Marks a claim used against an order, returning the updated row.
pub async fn mark_used(
    conn: &mut PgConnection,
    id: &str,
    order_id: &str,
    used_at: DateTime<Utc>,
) -> DbResult<UserVoucher> {
    let claim = sqlx::query_as::<_, UserVoucher>(
        r#"
        UPDATE user_vouchers
        SET status = 'used', order_id = $2, used_at = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(used_at)
    .fetch_one(conn)
    .await?;

    Ok(claim)
}
