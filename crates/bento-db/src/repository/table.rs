//! Accessors for dining tables, tag links, and the reservation guard.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::error::DbResult;
use bento_core::DiningTable;

/// Gets a table by ID.
pub async fn get(conn: &mut PgConnection, id: &str) -> DbResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>("SELECT * FROM dining_tables WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(table)
}

/// Counts reservations against a table at or after `now`. A non-zero
/// count blocks deletion.
pub async fn count_future_reservations(
    conn: &mut PgConnection,
    table_id: &str,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM reservations WHERE table_id = $1 AND reserved_for >= $2",
    )
    .bind(table_id)
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(row.0)
}

/// Deletes a table's tag links. Zero rows affected is success.
pub async fn delete_tag_links(conn: &mut PgConnection, table_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM table_tag_links WHERE table_id = $1")
        .bind(table_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes the table row. Zero rows affected is success.
pub async fn delete(conn: &mut PgConnection, id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM dining_tables WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}
