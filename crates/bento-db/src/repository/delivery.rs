//! Accessors for deliveries, the courier pool, and dropoff addresses.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::debug;

use crate::error::DbResult;
use bento_core::{Delivery, DeliveryPoolEntry, UserAddress};

/// Inserts the delivery derived from a paid takeout order.
pub async fn insert(conn: &mut PgConnection, delivery: &Delivery) -> DbResult<()> {
    debug!(id = %delivery.id, order_id = %delivery.order_id, "Inserting delivery");

    sqlx::query(
        r#"
        INSERT INTO deliveries (
            id, order_id, merchant_id, user_id,
            pickup_lat, pickup_lng, dropoff_lat, dropoff_lng,
            distance_m, estimated_pickup_at, estimated_delivery_at,
            picked_up_at, delivered_at, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(&delivery.id)
    .bind(&delivery.order_id)
    .bind(&delivery.merchant_id)
    .bind(&delivery.user_id)
    .bind(delivery.pickup_lat)
    .bind(delivery.pickup_lng)
    .bind(delivery.dropoff_lat)
    .bind(delivery.dropoff_lng)
    .bind(delivery.distance_m)
    .bind(delivery.estimated_pickup_at)
    .bind(delivery.estimated_delivery_at)
    .bind(delivery.picked_up_at)
    .bind(delivery.delivered_at)
    .bind(delivery.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Publishes a delivery into the courier pool.
pub async fn insert_pool_entry(
    conn: &mut PgConnection,
    entry: &DeliveryPoolEntry,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO delivery_pool (
            id, delivery_id, order_id, priority_tier, fee_cents, status, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.delivery_id)
    .bind(&entry.order_id)
    .bind(entry.priority_tier)
    .bind(entry.fee_cents)
    .bind(entry.status)
    .bind(entry.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Trailing average prepare time (minutes) over a merchant's completed
/// pickups since `since`. `None` when the merchant has no pickups yet.
pub async fn merchant_avg_prepare_minutes(
    conn: &mut PgConnection,
    merchant_id: &str,
    since: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let row: (Option<f64>,) = sqlx::query_as(
        r#"
        SELECT AVG(EXTRACT(EPOCH FROM (picked_up_at - created_at)) / 60.0)::float8
        FROM deliveries
        WHERE merchant_id = $1
          AND picked_up_at IS NOT NULL
          AND created_at >= $2
        "#,
    )
    .bind(merchant_id)
    .bind(since)
    .fetch_one(conn)
    .await?;

    Ok(row.0.map(|minutes| minutes.round() as i64))
}

/// Gets a saved dropoff address.
pub async fn get_address(conn: &mut PgConnection, id: &str) -> DbResult<Option<UserAddress>> {
    let address = sqlx::query_as::<_, UserAddress>("SELECT * FROM user_addresses WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(address)
}
