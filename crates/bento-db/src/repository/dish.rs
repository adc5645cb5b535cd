//! Accessors for dishes and their associations (ingredients, tags,
//! customization groups/options).
//!
//! Association sets are replaced wholesale: delete-all then re-insert,
//! inside the caller's transaction. Customization options ride on the
//! `ON DELETE CASCADE` from their group.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::debug;

use crate::error::DbResult;
use bento_core::{
    Dish, DishCustomizationGroup, DishCustomizationOption, DishIngredient, DishTag,
};

// =============================================================================
// Dishes
// =============================================================================

/// Gets a dish by ID.
pub async fn get(conn: &mut PgConnection, id: &str) -> DbResult<Option<Dish>> {
    let dish = sqlx::query_as::<_, Dish>("SELECT * FROM dishes WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(dish)
}

/// Inserts a new dish row.
pub async fn insert(conn: &mut PgConnection, dish: &Dish) -> DbResult<()> {
    debug!(id = %dish.id, name = %dish.name, "Inserting dish");

    sqlx::query(
        r#"
        INSERT INTO dishes (
            id, merchant_id, name, price_cents, prepare_minutes,
            is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&dish.id)
    .bind(&dish.merchant_id)
    .bind(&dish.name)
    .bind(dish.price_cents)
    .bind(dish.prepare_minutes)
    .bind(dish.is_active)
    .bind(dish.created_at)
    .bind(dish.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Updates a dish's own fields, returning the updated row.
pub async fn update(
    conn: &mut PgConnection,
    id: &str,
    name: &str,
    price_cents: i64,
    prepare_minutes: Option<i64>,
    is_active: bool,
    updated_at: DateTime<Utc>,
) -> DbResult<Dish> {
    let dish = sqlx::query_as::<_, Dish>(
        r#"
        UPDATE dishes
        SET name = $2, price_cents = $3, prepare_minutes = $4,
            is_active = $5, updated_at = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(price_cents)
    .bind(prepare_minutes)
    .bind(is_active)
    .bind(updated_at)
    .fetch_one(conn)
    .await?;

    Ok(dish)
}

/// Longest declared prepare time among an order's dish-backed items.
///
/// `None` when no item references a dish with a declared prepare time.
pub async fn max_prepare_minutes(
    conn: &mut PgConnection,
    order_id: &str,
) -> DbResult<Option<i64>> {
    let row: (Option<i64>,) = sqlx::query_as(
        r#"
        SELECT MAX(d.prepare_minutes)
        FROM order_items oi
        JOIN dishes d ON d.id = oi.dish_id
        WHERE oi.order_id = $1
        "#,
    )
    .bind(order_id)
    .fetch_one(conn)
    .await?;

    Ok(row.0)
}

// =============================================================================
// Ingredients
// =============================================================================

pub async fn delete_ingredients(conn: &mut PgConnection, dish_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM dish_ingredients WHERE dish_id = $1")
        .bind(dish_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_ingredient(
    conn: &mut PgConnection,
    ingredient: &DishIngredient,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO dish_ingredients (id, dish_id, name, sort_order)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&ingredient.id)
    .bind(&ingredient.dish_id)
    .bind(&ingredient.name)
    .bind(ingredient.sort_order)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn list_ingredients(
    conn: &mut PgConnection,
    dish_id: &str,
) -> DbResult<Vec<DishIngredient>> {
    let rows = sqlx::query_as::<_, DishIngredient>(
        "SELECT * FROM dish_ingredients WHERE dish_id = $1 ORDER BY sort_order, id",
    )
    .bind(dish_id)
    .fetch_all(conn)
    .await?;

    Ok(rows)
}

// =============================================================================
// Tags
// =============================================================================

pub async fn delete_tags(conn: &mut PgConnection, dish_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM dish_tags WHERE dish_id = $1")
        .bind(dish_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_tag(conn: &mut PgConnection, tag: &DishTag) -> DbResult<()> {
    sqlx::query("INSERT INTO dish_tags (id, dish_id, tag) VALUES ($1, $2, $3)")
        .bind(&tag.id)
        .bind(&tag.dish_id)
        .bind(&tag.tag)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn list_tags(conn: &mut PgConnection, dish_id: &str) -> DbResult<Vec<DishTag>> {
    let rows =
        sqlx::query_as::<_, DishTag>("SELECT * FROM dish_tags WHERE dish_id = $1 ORDER BY tag")
            .bind(dish_id)
            .fetch_all(conn)
            .await?;

    Ok(rows)
}

// =============================================================================
// Customization Groups & Options
// =============================================================================

/// Deletes all customization groups for a dish. Options cascade.
pub async fn delete_customization_groups(
    conn: &mut PgConnection,
    dish_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM dish_customization_groups WHERE dish_id = $1")
        .bind(dish_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_customization_group(
    conn: &mut PgConnection,
    group: &DishCustomizationGroup,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO dish_customization_groups (id, dish_id, name, required, sort_order)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&group.id)
    .bind(&group.dish_id)
    .bind(&group.name)
    .bind(group.required)
    .bind(group.sort_order)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn insert_customization_option(
    conn: &mut PgConnection,
    option: &DishCustomizationOption,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO dish_customization_options (id, group_id, name, price_delta_cents, sort_order)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&option.id)
    .bind(&option.group_id)
    .bind(&option.name)
    .bind(option.price_delta_cents)
    .bind(option.sort_order)
    .execute(conn)
    .await?;

    Ok(())
}
