//! Accessors for merchant applications, merchants, and user roles.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::debug;

use crate::error::DbResult;
use bento_core::{ApplicationStatus, Merchant, MerchantApplication, MerchantStatus, UserRole};

// =============================================================================
// Applications
// =============================================================================

/// Gets an application under an exclusive row lock.
pub async fn get_application_for_update(
    conn: &mut PgConnection,
    id: &str,
) -> DbResult<Option<MerchantApplication>> {
    let application = sqlx::query_as::<_, MerchantApplication>(
        "SELECT * FROM merchant_applications WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(application)
}

/// Transitions an application's status, returning the updated row.
pub async fn set_application_status(
    conn: &mut PgConnection,
    id: &str,
    status: ApplicationStatus,
    updated_at: DateTime<Utc>,
) -> DbResult<MerchantApplication> {
    let application = sqlx::query_as::<_, MerchantApplication>(
        "UPDATE merchant_applications SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(application)
}

// =============================================================================
// Merchants
// =============================================================================

/// Gets a merchant by ID.
pub async fn get(conn: &mut PgConnection, id: &str) -> DbResult<Option<Merchant>> {
    let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(merchant)
}

/// Finds the merchant owned by a user. One merchant per user.
pub async fn find_by_user(conn: &mut PgConnection, user_id: &str) -> DbResult<Option<Merchant>> {
    let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(merchant)
}

/// Inserts a new merchant row.
pub async fn insert(conn: &mut PgConnection, merchant: &Merchant) -> DbResult<()> {
    debug!(id = %merchant.id, name = %merchant.name, "Inserting merchant");

    sqlx::query(
        r#"
        INSERT INTO merchants (
            id, user_id, name, status, region_id,
            address, lat, lng, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&merchant.id)
    .bind(&merchant.user_id)
    .bind(&merchant.name)
    .bind(merchant.status)
    .bind(merchant.region_id)
    .bind(&merchant.address)
    .bind(merchant.lat)
    .bind(merchant.lng)
    .bind(merchant.created_at)
    .bind(merchant.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrites a merchant's profile fields and status, returning the
/// updated row. Used by approval to refresh an existing merchant.
pub async fn update_profile(
    conn: &mut PgConnection,
    id: &str,
    name: &str,
    region_id: i64,
    address: &str,
    lat: f64,
    lng: f64,
    status: MerchantStatus,
    updated_at: DateTime<Utc>,
) -> DbResult<Merchant> {
    let merchant = sqlx::query_as::<_, Merchant>(
        r#"
        UPDATE merchants
        SET name = $2, region_id = $3, address = $4,
            lat = $5, lng = $6, status = $7, updated_at = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(region_id)
    .bind(address)
    .bind(lat)
    .bind(lng)
    .bind(status)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(merchant)
}

/// Sets a merchant's status. Returns the number of rows affected; zero
/// is not an error (reset with no merchant present).
pub async fn set_status(
    conn: &mut PgConnection,
    id: &str,
    status: MerchantStatus,
    updated_at: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query("UPDATE merchants SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(status)
        .bind(updated_at)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// User Roles
// =============================================================================

/// Finds a user's role row by role name.
pub async fn find_role(
    conn: &mut PgConnection,
    user_id: &str,
    role: &str,
) -> DbResult<Option<UserRole>> {
    let row = sqlx::query_as::<_, UserRole>(
        "SELECT * FROM user_roles WHERE user_id = $1 AND role = $2",
    )
    .bind(user_id)
    .bind(role)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Inserts a role row.
pub async fn insert_role(conn: &mut PgConnection, role: &UserRole) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_roles (id, user_id, role, merchant_id, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&role.id)
    .bind(&role.user_id)
    .bind(&role.role)
    .bind(&role.merchant_id)
    .bind(role.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Links an existing role row to a merchant, returning the updated row.
/// Approval reuses an existing `merchant` role rather than duplicating.
pub async fn set_role_merchant(
    conn: &mut PgConnection,
    role_id: &str,
    merchant_id: &str,
) -> DbResult<UserRole> {
    let role = sqlx::query_as::<_, UserRole>(
        "UPDATE user_roles SET merchant_id = $2 WHERE id = $1 RETURNING *",
    )
    .bind(role_id)
    .bind(merchant_id)
    .fetch_one(conn)
    .await?;

    Ok(role)
}
