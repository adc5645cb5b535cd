//! Accessors for orders, order items, and the status-transition log.

use sqlx::PgConnection;
use tracing::debug;

use crate::error::DbResult;
use bento_core::{Order, OrderItem, OrderStatus, OrderStatusLog};

/// Inserts a new order row.
pub async fn insert(conn: &mut PgConnection, order: &Order) -> DbResult<()> {
    debug!(id = %order.id, order_number = %order.order_number, "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, merchant_id, user_id, order_number, kind, status,
            total_cents, delivery_fee_cents, delivery_distance_m,
            address_id, note, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(&order.id)
    .bind(&order.merchant_id)
    .bind(&order.user_id)
    .bind(&order.order_number)
    .bind(order.kind)
    .bind(order.status)
    .bind(order.total_cents)
    .bind(order.delivery_fee_cents)
    .bind(order.delivery_distance_m)
    .bind(&order.address_id)
    .bind(&order.note)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets an order by ID.
pub async fn get(conn: &mut PgConnection, id: &str) -> DbResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(order)
}

/// Gets an order by ID under an exclusive row lock.
///
/// The lock is held until the enclosing transaction commits or rolls
/// back; concurrent payment attempts on the same order serialize here.
pub async fn get_for_update(conn: &mut PgConnection, id: &str) -> DbResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(order)
}

/// Inserts a line item.
pub async fn insert_item(conn: &mut PgConnection, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, dish_id, combo_id, name,
            unit_price_cents, quantity, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.dish_id)
    .bind(&item.combo_id)
    .bind(&item.name)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets all items for an order.
pub async fn list_items(conn: &mut PgConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

/// Updates an order's status, returning the updated row.
pub async fn set_status(
    conn: &mut PgConnection,
    order_id: &str,
    status: OrderStatus,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> DbResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(status)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(order)
}

/// Appends a status-transition log row.
pub async fn insert_status_log(conn: &mut PgConnection, log: &OrderStatusLog) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_status_logs (id, order_id, from_status, to_status, changed_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&log.id)
    .bind(&log.order_id)
    .bind(log.from_status)
    .bind(log.to_status)
    .bind(log.changed_at)
    .execute(conn)
    .await?;

    Ok(())
}
