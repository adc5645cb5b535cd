//! # Dish Composition Workflows
//!
//! Creating and updating dishes with their associations, and replacing
//! the customization tree.
//!
//! ## Replace-All Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Association Replacement                                │
//! │                                                                         │
//! │  ingredients: None          → existing set untouched                    │
//! │  ingredients: Some([])      → existing set cleared                      │
//! │  ingredients: Some([a, b])  → existing set replaced by [a, b]           │
//! │                                                                         │
//! │  Never an incremental diff: delete all, then re-insert in order.       │
//! │  Customization options cascade-delete with their group.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::dish;
use bento_core::{
    validation, Dish, DishCustomizationGroup, DishCustomizationOption, DishIngredient, DishTag,
};

// =============================================================================
// Parameters & Results
// =============================================================================

/// Parameters for [`Database::create_dish`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDishParams {
    pub merchant_id: String,
    pub name: String,
    pub price_cents: i64,
    pub prepare_minutes: Option<i64>,
    pub is_active: bool,

    /// Ingredient names in display order.
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
}

/// Parameters for [`Database::update_dish`].
///
/// `None` association lists mean "do not touch"; `Some(vec![])` clears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDishParams {
    pub dish_id: String,
    pub name: String,
    pub price_cents: i64,
    pub prepare_minutes: Option<i64>,
    pub is_active: bool,

    pub ingredients: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// A customization group supplied to [`Database::set_dish_customizations`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomizationGroup {
    pub name: String,
    pub required: bool,
    pub options: Vec<NewCustomizationOption>,
}

/// An option within a supplied customization group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomizationOption {
    pub name: String,
    pub price_delta_cents: i64,
}

/// Result of a dish create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishOutcome {
    pub dish: Dish,
    pub ingredients: Vec<DishIngredient>,
    pub tags: Vec<DishTag>,
}

/// One group with its options, in persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomizationTree {
    pub group: DishCustomizationGroup,
    pub options: Vec<DishCustomizationOption>,
}

// =============================================================================
// Workflows
// =============================================================================

impl Database {
    /// Creates a dish with its ingredient and tag sets.
    pub async fn create_dish(&self, params: CreateDishParams) -> DbResult<DishOutcome> {
        validation::validate_name("name", &params.name)?;
        validation::validate_amount_cents(params.price_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let new = Dish {
                    id: Uuid::new_v4().to_string(),
                    merchant_id: params.merchant_id.clone(),
                    name: params.name.clone(),
                    price_cents: params.price_cents,
                    prepare_minutes: params.prepare_minutes,
                    is_active: params.is_active,
                    created_at: now,
                    updated_at: now,
                };

                info!(dish_id = %new.id, name = %new.name, "Creating dish");
                dish::insert(&mut *tx, &new).await?;

                let ingredients = replace_ingredients(&mut *tx, &new.id, &params.ingredients).await?;
                let tags = replace_tags(&mut *tx, &new.id, &params.tags).await?;

                Ok(DishOutcome {
                    dish: new,
                    ingredients,
                    tags,
                })
            })
        })
        .await
    }

    /// Updates a dish; association lists that are present replace the
    /// existing sets wholesale.
    pub async fn update_dish(&self, params: UpdateDishParams) -> DbResult<DishOutcome> {
        validation::validate_name("name", &params.name)?;
        validation::validate_amount_cents(params.price_cents)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let current = dish::get(&mut *tx, &params.dish_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Dish", &params.dish_id))?;

                info!(dish_id = %current.id, "Updating dish");

                let updated = dish::update(
                    &mut *tx,
                    &current.id,
                    &params.name,
                    params.price_cents,
                    params.prepare_minutes,
                    params.is_active,
                    now,
                )
                .await?;

                let ingredients = match &params.ingredients {
                    Some(names) => replace_ingredients(&mut *tx, &current.id, names).await?,
                    None => dish::list_ingredients(&mut *tx, &current.id).await?,
                };
                let tags = match &params.tags {
                    Some(names) => replace_tags(&mut *tx, &current.id, names).await?,
                    None => dish::list_tags(&mut *tx, &current.id).await?,
                };

                Ok(DishOutcome {
                    dish: updated,
                    ingredients,
                    tags,
                })
            })
        })
        .await
    }

    /// Replaces a dish's entire customization tree, preserving the
    /// supplied group and option order.
    pub async fn set_dish_customizations(
        &self,
        dish_id: String,
        groups: Vec<NewCustomizationGroup>,
    ) -> DbResult<Vec<CustomizationTree>> {
        for group in &groups {
            validation::validate_name("group name", &group.name)?;
            for option in &group.options {
                validation::validate_name("option name", &option.name)?;
            }
        }

        self.within_tx(move |tx| {
            Box::pin(async move {
                dish::get(&mut *tx, &dish_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Dish", &dish_id))?;

                info!(dish_id = %dish_id, groups = groups.len(), "Replacing customizations");

                // Options ride the cascade from their group.
                dish::delete_customization_groups(&mut *tx, &dish_id).await?;

                let mut tree = Vec::with_capacity(groups.len());
                for (group_index, group) in groups.iter().enumerate() {
                    let db_group = DishCustomizationGroup {
                        id: Uuid::new_v4().to_string(),
                        dish_id: dish_id.clone(),
                        name: group.name.clone(),
                        required: group.required,
                        sort_order: group_index as i32,
                    };
                    dish::insert_customization_group(&mut *tx, &db_group).await?;

                    let mut db_options = Vec::with_capacity(group.options.len());
                    for (option_index, option) in group.options.iter().enumerate() {
                        let db_option = DishCustomizationOption {
                            id: Uuid::new_v4().to_string(),
                            group_id: db_group.id.clone(),
                            name: option.name.clone(),
                            price_delta_cents: option.price_delta_cents,
                            sort_order: option_index as i32,
                        };
                        dish::insert_customization_option(&mut *tx, &db_option).await?;
                        db_options.push(db_option);
                    }

                    tree.push(CustomizationTree {
                        group: db_group,
                        options: db_options,
                    });
                }

                Ok(tree)
            })
        })
        .await
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn replace_ingredients(
    conn: &mut PgConnection,
    dish_id: &str,
    names: &[String],
) -> DbResult<Vec<DishIngredient>> {
    dish::delete_ingredients(&mut *conn, dish_id).await?;

    let mut rows = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let row = DishIngredient {
            id: Uuid::new_v4().to_string(),
            dish_id: dish_id.to_string(),
            name: name.clone(),
            sort_order: index as i32,
        };
        dish::insert_ingredient(&mut *conn, &row).await?;
        rows.push(row);
    }

    Ok(rows)
}

async fn replace_tags(
    conn: &mut PgConnection,
    dish_id: &str,
    tags: &[String],
) -> DbResult<Vec<DishTag>> {
    dish::delete_tags(&mut *conn, dish_id).await?;

    let mut rows = Vec::with_capacity(tags.len());
    for tag in tags {
        let row = DishTag {
            id: Uuid::new_v4().to_string(),
            dish_id: dish_id.to_string(),
            tag: tag.clone(),
        };
        dish::insert_tag(&mut *conn, &row).await?;
        rows.push(row);
    }

    Ok(rows)
}
