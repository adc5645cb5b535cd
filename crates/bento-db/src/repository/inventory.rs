//! Accessors for per-day dish inventory.
//!
//! Inventory rows are only ever mutated under a row lock during payment
//! processing, and always in ascending dish-id order across a single
//! transaction (see `tx::order`).

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::error::DbResult;
use bento_core::DailyInventory;

/// Gets the inventory row for (merchant, dish, date) under an exclusive
/// row lock.
///
/// Returns `None` when the merchant does not track inventory for the
/// dish on that day.
pub async fn get_for_update(
    conn: &mut PgConnection,
    merchant_id: &str,
    dish_id: &str,
    date: NaiveDate,
) -> DbResult<Option<DailyInventory>> {
    let inventory = sqlx::query_as::<_, DailyInventory>(
        r#"
        SELECT * FROM daily_inventory
        WHERE merchant_id = $1 AND dish_id = $2 AND date = $3
        FOR UPDATE
        "#,
    )
    .bind(merchant_id)
    .bind(dish_id)
    .bind(date)
    .fetch_optional(conn)
    .await?;

    Ok(inventory)
}

/// Atomically increments the sold quantity, returning the updated row.
///
/// Callers hold the row lock and have already verified availability;
/// the `sold <= total` invariant is re-asserted here for rows with a
/// finite total.
pub async fn add_sold(
    conn: &mut PgConnection,
    id: &str,
    quantity: i64,
) -> DbResult<DailyInventory> {
    let inventory = sqlx::query_as::<_, DailyInventory>(
        r#"
        UPDATE daily_inventory
        SET sold_quantity = sold_quantity + $2
        WHERE id = $1
          AND (total_quantity = -1 OR sold_quantity + $2 <= total_quantity)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(quantity)
    .fetch_one(conn)
    .await?;

    Ok(inventory)
}
