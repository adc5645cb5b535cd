//! # Order Workflows
//!
//! Order creation and payment processing.
//!
//! ## Payment Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Payment Processing                                  │
//! │                                                                         │
//! │  1. LOCK ORDER (must be `created`)                                     │
//! │                                                                         │
//! │  2. RESERVE INVENTORY                                                  │
//! │     └── aggregate dish demands, sort by ASCENDING dish id              │
//! │     └── per dish: lock row → check available → increment sold          │
//! │         (fixed lock order: concurrent payments over overlapping        │
//! │          dish sets can never deadlock)                                 │
//! │                                                                         │
//! │  3. TRANSITION created → paid (+ status-log row)                       │
//! │                                                                         │
//! │  4. TAKEOUT ONLY: DISPATCH                                             │
//! │     └── prepare ETA: max dish time → merchant 7-day avg → 20 min       │
//! │     └── transit ETA: max(5 min, distance / 250 m-per-min)              │
//! │     └── insert Delivery + pool entry (tier from fee thresholds)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{delivery, dish, inventory, membership, order, voucher};
use bento_core::{
    eta, validation, CoreError, Delivery, DeliveryPoolEntry, MembershipTransaction,
    MembershipTxKind, MerchantMembership, Money, Order, OrderItem, OrderKind, OrderStatus,
    OrderStatusLog, PoolEntryStatus, UserVoucher, UserVoucherStatus, ValidationError,
};

// =============================================================================
// Parameters & Results
// =============================================================================

/// A line item supplied at order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    /// Dish reference; dish-backed items participate in inventory locking.
    pub dish_id: Option<String>,

    /// Combo reference; combos carry no per-dish inventory.
    pub combo_id: Option<String>,

    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

/// Parameters for [`Database::create_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderParams {
    pub merchant_id: String,
    pub user_id: String,
    pub kind: OrderKind,
    pub items: Vec<NewOrderItem>,
    pub delivery_fee_cents: i64,
    pub delivery_distance_m: i64,
    pub address_id: Option<String>,
    pub note: Option<String>,

    /// Claimed voucher to redeem against this order.
    pub user_voucher_id: Option<String>,

    /// Membership wallet amount to spend, in cents.
    pub wallet_amount_cents: Option<i64>,
}

/// Result of [`Database::create_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderOutcome {
    pub order: Order,
    pub items: Vec<OrderItem>,

    /// Redeemed voucher snapshot, when one was supplied.
    pub voucher: Option<UserVoucher>,

    /// Membership snapshot after the wallet payment, when one was made.
    pub membership: Option<MerchantMembership>,
}

/// Result of [`Database::process_order_payment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub order: Order,

    /// Present for takeout orders only.
    pub delivery: Option<Delivery>,
    pub pool_entry: Option<DeliveryPoolEntry>,
}

// =============================================================================
// Workflows
// =============================================================================

impl Database {
    /// Creates an order with its items, optionally redeeming a voucher
    /// and spending membership wallet funds, all in one transaction.
    ///
    /// ## Errors
    /// * `VoucherAlreadyUsed` / `VoucherExpired` - supplied claim unusable
    /// * `InsufficientBalance` - wallet amount exceeds membership balance
    /// * `NotFound` - voucher claim missing or owned by another user, or
    ///   membership missing
    pub async fn create_order(&self, params: CreateOrderParams) -> DbResult<CreateOrderOutcome> {
        if params.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        for item in &params.items {
            validation::validate_name("item name", &item.name)?;
            validation::validate_quantity(item.quantity)?;
        }
        if let Some(amount) = params.wallet_amount_cents {
            validation::validate_amount_cents(amount)?;
        }

        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();
                let order_id = Uuid::new_v4().to_string();
                let order_number = generate_order_number(now);

                info!(
                    order_id = %order_id,
                    order_number = %order_number,
                    merchant_id = %params.merchant_id,
                    "Creating order"
                );

                // Lock order: voucher claim before membership, always.
                let claim = match &params.user_voucher_id {
                    Some(claim_id) => {
                        let claim = voucher::get_claim_for_update(&mut *tx, claim_id)
                            .await?
                            .ok_or_else(|| DbError::not_found("UserVoucher", claim_id))?;
                        // A claim only redeems for the user it belongs to.
                        // Foreign claims look like they don't exist.
                        if claim.user_id != params.user_id {
                            return Err(DbError::not_found("UserVoucher", claim_id));
                        }
                        if claim.status == UserVoucherStatus::Used {
                            return Err(CoreError::VoucherAlreadyUsed(claim.id).into());
                        }
                        if claim.is_expired(now) {
                            return Err(CoreError::VoucherExpired(claim.id).into());
                        }
                        Some(claim)
                    }
                    None => None,
                };

                let locked_membership = match params.wallet_amount_cents {
                    Some(amount) => {
                        let m = membership::find_by_pair_for_update(
                            &mut *tx,
                            &params.merchant_id,
                            &params.user_id,
                        )
                        .await?
                        .ok_or_else(|| {
                            DbError::not_found("MerchantMembership", &params.user_id)
                        })?;
                        if !Money::from_cents(m.balance_cents).covers(Money::from_cents(amount)) {
                            return Err(CoreError::InsufficientBalance {
                                available_cents: m.balance_cents,
                                requested_cents: amount,
                            }
                            .into());
                        }
                        Some(m)
                    }
                    None => None,
                };

                let total_cents = params
                    .items
                    .iter()
                    .fold(Money::zero(), |acc, item| {
                        acc + Money::from_cents(item.unit_price_cents)
                            .multiply_quantity(item.quantity)
                    })
                    .cents()
                    + params.delivery_fee_cents;

                let db_order = Order {
                    id: order_id.clone(),
                    merchant_id: params.merchant_id.clone(),
                    user_id: params.user_id.clone(),
                    order_number: order_number.clone(),
                    kind: params.kind,
                    status: OrderStatus::Created,
                    total_cents,
                    delivery_fee_cents: params.delivery_fee_cents,
                    delivery_distance_m: params.delivery_distance_m,
                    address_id: params.address_id.clone(),
                    note: params.note.clone(),
                    created_at: now,
                    updated_at: now,
                };
                order::insert(&mut *tx, &db_order).await?;

                let mut db_items = Vec::with_capacity(params.items.len());
                for item in &params.items {
                    let db_item = OrderItem {
                        id: Uuid::new_v4().to_string(),
                        order_id: order_id.clone(),
                        dish_id: item.dish_id.clone(),
                        combo_id: item.combo_id.clone(),
                        name: item.name.clone(),
                        unit_price_cents: item.unit_price_cents,
                        quantity: item.quantity,
                        created_at: now,
                    };
                    order::insert_item(&mut *tx, &db_item).await?;
                    db_items.push(db_item);
                }

                order::insert_status_log(
                    &mut *tx,
                    &OrderStatusLog {
                        id: Uuid::new_v4().to_string(),
                        order_id: order_id.clone(),
                        from_status: None,
                        to_status: OrderStatus::Created,
                        changed_at: now,
                    },
                )
                .await?;

                let used_claim = match claim {
                    Some(c) => {
                        let used = voucher::mark_used(&mut *tx, &c.id, &order_id, now).await?;
                        voucher::add_used(&mut *tx, &c.voucher_id).await?;
                        Some(used)
                    }
                    None => None,
                };

                let paid_membership = match (locked_membership, params.wallet_amount_cents) {
                    (Some(m), Some(amount)) => {
                        let new_balance = m.balance_cents - amount;
                        let updated = membership::apply_balance(
                            &mut *tx,
                            &m.id,
                            new_balance,
                            m.total_recharged_cents,
                            m.total_consumed_cents + amount,
                            now,
                        )
                        .await?;
                        membership::insert_transaction(
                            &mut *tx,
                            &MembershipTransaction {
                                id: Uuid::new_v4().to_string(),
                                membership_id: m.id.clone(),
                                kind: MembershipTxKind::Consume,
                                amount_cents: amount,
                                balance_before_cents: m.balance_cents,
                                balance_after_cents: new_balance,
                                note: Some(format!("order #{order_number}")),
                                created_at: now,
                            },
                        )
                        .await?;
                        Some(updated)
                    }
                    _ => None,
                };

                Ok(CreateOrderOutcome {
                    order: db_order,
                    items: db_items,
                    voucher: used_claim,
                    membership: paid_membership,
                })
            })
        })
        .await
    }

    /// Processes payment for an order: reserves inventory, transitions
    /// the order to `paid`, and (for takeout) dispatches a delivery into
    /// the courier pool with estimated pickup/delivery times.
    ///
    /// ## Errors
    /// * `InvalidOrderStatus` - order is not `created` (replayed callback)
    /// * `InsufficientInventory` - a dish's daily stock cannot cover it
    /// * `NotFound` - order, merchant, or dropoff address missing
    pub async fn process_order_payment(&self, order_id: String) -> DbResult<PaymentOutcome> {
        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let current = order::get_for_update(&mut *tx, &order_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Order", &order_id))?;

                if current.status != OrderStatus::Created {
                    return Err(CoreError::InvalidOrderStatus {
                        order_id: current.id,
                        current_status: current.status.as_str().to_string(),
                    }
                    .into());
                }

                info!(order_id = %current.id, order_number = %current.order_number, "Processing payment");

                let items = order::list_items(&mut *tx, &order_id).await?;

                // Ascending dish id keeps the lock order global across
                // concurrent payments.
                for (dish_id, requested) in sorted_dish_demands(&items) {
                    let inv = match inventory::get_for_update(
                        &mut *tx,
                        &current.merchant_id,
                        &dish_id,
                        now.date_naive(),
                    )
                    .await?
                    {
                        Some(inv) => inv,
                        // No row for today means the dish is untracked.
                        None => continue,
                    };

                    match inv.available() {
                        None => {
                            debug!(dish_id = %dish_id, "Unlimited inventory, skipping");
                        }
                        Some(available) if available < requested => {
                            return Err(CoreError::InsufficientInventory {
                                dish_id,
                                available,
                                requested,
                            }
                            .into());
                        }
                        Some(_) => {
                            inventory::add_sold(&mut *tx, &inv.id, requested).await?;
                        }
                    }
                }

                let paid = order::set_status(&mut *tx, &order_id, OrderStatus::Paid, now).await?;
                order::insert_status_log(
                    &mut *tx,
                    &OrderStatusLog {
                        id: Uuid::new_v4().to_string(),
                        order_id: order_id.clone(),
                        from_status: Some(OrderStatus::Created),
                        to_status: OrderStatus::Paid,
                        changed_at: now,
                    },
                )
                .await?;

                if !paid.is_takeout() {
                    return Ok(PaymentOutcome {
                        order: paid,
                        delivery: None,
                        pool_entry: None,
                    });
                }

                let (db_delivery, pool_entry) = dispatch_delivery(tx, &paid, now).await?;

                Ok(PaymentOutcome {
                    order: paid,
                    delivery: Some(db_delivery),
                    pool_entry: Some(pool_entry),
                })
            })
        })
        .await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Builds the delivery record and pool entry for a just-paid takeout
/// order. Runs inside the payment transaction.
async fn dispatch_delivery(
    tx: &mut crate::tx::PgTransaction,
    paid: &Order,
    now: DateTime<Utc>,
) -> DbResult<(Delivery, DeliveryPoolEntry)> {
    let merchant = crate::repository::merchant::get(&mut *tx, &paid.merchant_id)
        .await?
        .ok_or_else(|| DbError::not_found("Merchant", &paid.merchant_id))?;

    let address_id = paid.address_id.as_deref().ok_or(CoreError::Validation(
        ValidationError::Required {
            field: "address_id".to_string(),
        },
    ))?;
    let address = delivery::get_address(&mut *tx, address_id)
        .await?
        .ok_or_else(|| DbError::not_found("UserAddress", address_id))?;

    let max_dish = dish::max_prepare_minutes(&mut *tx, &paid.id).await?;
    let merchant_avg = delivery::merchant_avg_prepare_minutes(
        &mut *tx,
        &paid.merchant_id,
        now - Duration::days(7),
    )
    .await?;

    let prepare = eta::prepare_minutes(max_dish, merchant_avg);
    let transit = eta::transit_minutes(paid.delivery_distance_m);

    debug!(
        order_id = %paid.id,
        prepare_minutes = prepare,
        transit_minutes = transit,
        "Estimated delivery"
    );

    let db_delivery = Delivery {
        id: Uuid::new_v4().to_string(),
        order_id: paid.id.clone(),
        merchant_id: paid.merchant_id.clone(),
        user_id: paid.user_id.clone(),
        pickup_lat: merchant.lat,
        pickup_lng: merchant.lng,
        dropoff_lat: address.lat,
        dropoff_lng: address.lng,
        distance_m: paid.delivery_distance_m,
        estimated_pickup_at: now + Duration::minutes(prepare),
        estimated_delivery_at: now + Duration::minutes(prepare + transit),
        picked_up_at: None,
        delivered_at: None,
        created_at: now,
    };
    delivery::insert(&mut *tx, &db_delivery).await?;

    let pool_entry = DeliveryPoolEntry {
        id: Uuid::new_v4().to_string(),
        delivery_id: db_delivery.id.clone(),
        order_id: paid.id.clone(),
        priority_tier: eta::delivery_tier(paid.delivery_fee_cents),
        fee_cents: paid.delivery_fee_cents,
        status: PoolEntryStatus::Open,
        created_at: now,
    };
    delivery::insert_pool_entry(&mut *tx, &pool_entry).await?;

    Ok((db_delivery, pool_entry))
}

/// Aggregates dish-backed item quantities and returns them sorted by
/// ascending dish id.
///
/// The sort is load-bearing: every payment transaction locks inventory
/// rows in this order, so two payments over overlapping dish sets can
/// never wait on each other in a cycle.
fn sorted_dish_demands(items: &[OrderItem]) -> Vec<(String, i64)> {
    let mut demands: BTreeMap<String, i64> = BTreeMap::new();
    for item in items {
        if let Some(dish_id) = &item.dish_id {
            *demands.entry(dish_id.clone()).or_insert(0) += item.quantity;
        }
    }
    demands.into_iter().collect()
}

/// Generates a human-readable order number: date plus a short random
/// suffix, e.g. `B20260824-3f9a2c`.
fn generate_order_number(now: DateTime<Utc>) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("B{}-{}", now.format("%Y%m%d"), &uuid[..6])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(dish_id: Option<&str>, quantity: i64) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: "o-1".to_string(),
            dish_id: dish_id.map(String::from),
            combo_id: None,
            name: "Test item".to_string(),
            unit_price_cents: 1200,
            quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_demands_sorted_ascending() {
        let items = vec![
            item(Some("dish-c"), 1),
            item(Some("dish-a"), 2),
            item(Some("dish-b"), 3),
        ];
        let demands = sorted_dish_demands(&items);
        let ids: Vec<&str> = demands.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["dish-a", "dish-b", "dish-c"]);
    }

    #[test]
    fn test_demands_aggregate_duplicate_dishes() {
        let items = vec![item(Some("dish-a"), 2), item(Some("dish-a"), 3)];
        let demands = sorted_dish_demands(&items);
        assert_eq!(demands, vec![("dish-a".to_string(), 5)]);
    }

    #[test]
    fn test_demands_skip_combo_items() {
        let mut combo = item(None, 4);
        combo.combo_id = Some("combo-1".to_string());
        let items = vec![combo, item(Some("dish-a"), 1)];
        let demands = sorted_dish_demands(&items);
        assert_eq!(demands, vec![("dish-a".to_string(), 1)]);
    }

    #[test]
    fn test_order_number_format() {
        let now = Utc::now();
        let number = generate_order_number(now);
        assert!(number.starts_with('B'));
        // B + 8 date digits + dash + 6 hex chars
        assert_eq!(number.len(), 16);
    }
}
