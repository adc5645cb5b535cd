//! Accessors for platform users.

use sqlx::PgConnection;
use tracing::debug;

use crate::error::DbResult;
use bento_core::User;

/// Gets a user by ID.
pub async fn get(conn: &mut PgConnection, id: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

/// Inserts a new user row.
pub async fn insert(conn: &mut PgConnection, user: &User) -> DbResult<()> {
    debug!(id = %user.id, username = %user.username, "Inserting user");

    sqlx::query(
        "INSERT INTO users (id, username, phone, created_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.phone)
    .bind(user.created_at)
    .execute(conn)
    .await?;

    Ok(())
}
