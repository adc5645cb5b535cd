//! # User Registration
//!
//! Creates the user row and its default role atomically: a failed role
//! insert leaves no user behind.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{merchant, user};
use bento_core::{validation, User, UserRole, DEFAULT_USER_ROLE};

/// Parameters for [`Database::create_user`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserParams {
    pub username: String,
    pub phone: Option<String>,
}

/// Result of [`Database::create_user`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserOutcome {
    pub user: User,
    pub role: UserRole,
}

impl Database {
    /// Registers a user with the default role.
    pub async fn create_user(&self, params: CreateUserParams) -> DbResult<CreateUserOutcome> {
        validation::validate_username(&params.username)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let new_user = User {
                    id: Uuid::new_v4().to_string(),
                    username: params.username.clone(),
                    phone: params.phone.clone(),
                    created_at: now,
                };

                info!(user_id = %new_user.id, username = %new_user.username, "Registering user");
                user::insert(&mut *tx, &new_user).await?;

                let role = UserRole {
                    id: Uuid::new_v4().to_string(),
                    user_id: new_user.id.clone(),
                    role: DEFAULT_USER_ROLE.to_string(),
                    merchant_id: None,
                    created_at: now,
                };
                merchant::insert_role(&mut *tx, &role).await?;

                Ok(CreateUserOutcome {
                    user: new_user,
                    role,
                })
            })
        })
        .await
    }
}
