//! # Merchant Application Workflows
//!
//! Approving an application (creating or refreshing the merchant and its
//! role link) and resetting one back to draft.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::merchant;
use bento_core::{
    validation, ApplicationStatus, Merchant, MerchantApplication, MerchantStatus, UserRole,
    MERCHANT_ROLE,
};

// =============================================================================
// Parameters & Results
// =============================================================================

/// Parameters for [`Database::approve_merchant_application`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveApplicationParams {
    pub application_id: String,

    /// Region the merchant operates in; must be positive.
    pub region_id: i64,

    /// Storefront coordinates (delivery pickup point).
    pub lat: f64,
    pub lng: f64,
}

/// Result of [`Database::approve_merchant_application`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveApplicationOutcome {
    pub application: MerchantApplication,
    pub merchant: Merchant,

    /// The single `merchant` role row linked to the merchant.
    pub role: UserRole,
}

/// Result of [`Database::reset_merchant_application`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetApplicationOutcome {
    pub application: MerchantApplication,

    /// The owner's merchant, now pending; `None` when none exists yet.
    pub merchant: Option<Merchant>,
}

// =============================================================================
// Workflows
// =============================================================================

impl Database {
    /// Approves a merchant application.
    ///
    /// Transitions the application to `approved`, creates the owner's
    /// merchant (or refreshes the existing one, forcing `approved`), and
    /// ensures exactly one `merchant` role row links to that merchant.
    ///
    /// ## Errors
    /// * `Validation` - non-positive region id; checked before any row
    ///   is touched
    pub async fn approve_merchant_application(
        &self,
        params: ApproveApplicationParams,
    ) -> DbResult<ApproveApplicationOutcome> {
        validation::validate_region_id(params.region_id)?;

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let application = merchant::get_application_for_update(
                    &mut *tx,
                    &params.application_id,
                )
                .await?
                .ok_or_else(|| DbError::not_found("MerchantApplication", &params.application_id))?;

                let application = merchant::set_application_status(
                    &mut *tx,
                    &application.id,
                    ApplicationStatus::Approved,
                    now,
                )
                .await?;

                info!(
                    application_id = %application.id,
                    user_id = %application.user_id,
                    "Approving merchant application"
                );

                let store = match merchant::find_by_user(&mut *tx, &application.user_id).await? {
                    Some(existing) => {
                        merchant::update_profile(
                            &mut *tx,
                            &existing.id,
                            &application.merchant_name,
                            params.region_id,
                            &application.address,
                            params.lat,
                            params.lng,
                            MerchantStatus::Approved,
                            now,
                        )
                        .await?
                    }
                    None => {
                        let new = Merchant {
                            id: Uuid::new_v4().to_string(),
                            user_id: application.user_id.clone(),
                            name: application.merchant_name.clone(),
                            status: MerchantStatus::Approved,
                            region_id: params.region_id,
                            address: application.address.clone(),
                            lat: params.lat,
                            lng: params.lng,
                            created_at: now,
                            updated_at: now,
                        };
                        merchant::insert(&mut *tx, &new).await?;
                        new
                    }
                };

                // Reuse an existing merchant role rather than duplicating.
                let role = match merchant::find_role(
                    &mut *tx,
                    &application.user_id,
                    MERCHANT_ROLE,
                )
                .await?
                {
                    Some(existing) => {
                        merchant::set_role_merchant(&mut *tx, &existing.id, &store.id).await?
                    }
                    None => {
                        let new = UserRole {
                            id: Uuid::new_v4().to_string(),
                            user_id: application.user_id.clone(),
                            role: MERCHANT_ROLE.to_string(),
                            merchant_id: Some(store.id.clone()),
                            created_at: now,
                        };
                        merchant::insert_role(&mut *tx, &new).await?;
                        new
                    }
                };

                Ok(ApproveApplicationOutcome {
                    application,
                    merchant: store,
                    role,
                })
            })
        })
        .await
    }

    /// Resets a merchant application back to `draft`. An existing
    /// merchant for the owner drops to `pending`; a missing merchant is
    /// not an error.
    pub async fn reset_merchant_application(
        &self,
        application_id: String,
    ) -> DbResult<ResetApplicationOutcome> {
        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let application =
                    merchant::get_application_for_update(&mut *tx, &application_id)
                        .await?
                        .ok_or_else(|| {
                            DbError::not_found("MerchantApplication", &application_id)
                        })?;

                let application = merchant::set_application_status(
                    &mut *tx,
                    &application.id,
                    ApplicationStatus::Draft,
                    now,
                )
                .await?;

                info!(application_id = %application.id, "Resetting merchant application");

                let store = match merchant::find_by_user(&mut *tx, &application.user_id).await? {
                    Some(mut existing) => {
                        merchant::set_status(&mut *tx, &existing.id, MerchantStatus::Pending, now)
                            .await?;
                        existing.status = MerchantStatus::Pending;
                        existing.updated_at = now;
                        Some(existing)
                    }
                    None => None,
                };

                Ok(ResetApplicationOutcome {
                    application,
                    merchant: store,
                })
            })
        })
        .await
    }
}
