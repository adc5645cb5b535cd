//! # Voucher Lifecycle Workflows
//!
//! Claiming a voucher template and redeeming a claimed voucher.
//!
//! ## Claim Guards
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Voucher Claim                                     │
//! │                                                                         │
//! │  lock voucher template (FOR UPDATE)                                     │
//! │       │                                                                 │
//! │       ├── inactive?          → VoucherInactive                          │
//! │       ├── now < valid_from?  → VoucherNotStarted                        │
//! │       ├── now > valid_until? → VoucherExpired                           │
//! │       └── user has a claim?  → VoucherAlreadyClaimed                    │
//! │                                 (plus UNIQUE (voucher_id, user_id))     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  claimed_quantity += 1; insert claim with expiry = valid_until          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::voucher;
use bento_core::{CoreError, UserVoucher, UserVoucherStatus, Voucher};

// =============================================================================
// Parameters & Results
// =============================================================================

/// Parameters for [`Database::claim_voucher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimVoucherParams {
    pub voucher_id: String,
    pub user_id: String,
}

/// Parameters for [`Database::use_voucher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseVoucherParams {
    pub user_voucher_id: String,

    /// Order the voucher is redeemed against.
    pub order_id: String,
}

/// Result of a claim or redemption: the claim row plus the template
/// snapshot with its updated counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherOutcome {
    pub claim: UserVoucher,
    pub voucher: Voucher,
}

// =============================================================================
// Workflows
// =============================================================================

impl Database {
    /// Claims a voucher for a user.
    ///
    /// ## Errors
    /// * `VoucherInactive` / `VoucherNotStarted` / `VoucherExpired` -
    ///   template unusable at claim time
    /// * `VoucherAlreadyClaimed` - the user already holds a claim
    pub async fn claim_voucher(&self, params: ClaimVoucherParams) -> DbResult<VoucherOutcome> {
        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let template = voucher::get_for_update(&mut *tx, &params.voucher_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Voucher", &params.voucher_id))?;

                if !template.is_active {
                    return Err(CoreError::VoucherInactive(template.id).into());
                }
                if now < template.valid_from {
                    return Err(CoreError::VoucherNotStarted(template.id).into());
                }
                if now > template.valid_until {
                    return Err(CoreError::VoucherExpired(template.id).into());
                }

                if voucher::find_claim(&mut *tx, &params.voucher_id, &params.user_id)
                    .await?
                    .is_some()
                {
                    return Err(CoreError::VoucherAlreadyClaimed {
                        voucher_id: params.voucher_id,
                        user_id: params.user_id,
                    }
                    .into());
                }

                let updated = voucher::add_claimed(&mut *tx, &template.id).await?;

                let claim = UserVoucher {
                    id: Uuid::new_v4().to_string(),
                    voucher_id: template.id.clone(),
                    user_id: params.user_id.clone(),
                    status: UserVoucherStatus::Unused,
                    order_id: None,
                    expires_at: template.valid_until,
                    claimed_at: now,
                    used_at: None,
                };

                info!(claim_id = %claim.id, voucher_id = %template.id, "Claiming voucher");
                voucher::insert_claim(&mut *tx, &claim).await?;

                Ok(VoucherOutcome {
                    claim,
                    voucher: updated,
                })
            })
        })
        .await
    }

    /// Redeems a claimed voucher against an order.
    ///
    /// ## Errors
    /// * `VoucherAlreadyUsed` - the claim was redeemed before
    /// * `VoucherExpired` - the claim is past its expiry
    pub async fn use_voucher(&self, params: UseVoucherParams) -> DbResult<VoucherOutcome> {
        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let claim = voucher::get_claim_for_update(&mut *tx, &params.user_voucher_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("UserVoucher", &params.user_voucher_id))?;

                if claim.status == UserVoucherStatus::Used {
                    return Err(CoreError::VoucherAlreadyUsed(claim.id).into());
                }
                if claim.is_expired(now) {
                    return Err(CoreError::VoucherExpired(claim.id).into());
                }

                info!(claim_id = %claim.id, order_id = %params.order_id, "Redeeming voucher");

                let used = voucher::mark_used(&mut *tx, &claim.id, &params.order_id, now).await?;
                let template = voucher::add_used(&mut *tx, &claim.voucher_id).await?;

                Ok(VoucherOutcome {
                    claim: used,
                    voucher: template,
                })
            })
        })
        .await
    }
}
