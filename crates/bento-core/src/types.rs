//! # Domain Types
//!
//! Core domain types used throughout the Bento platform.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Ordering                  Wallets & Ledgers          Composition      │
//! │  ┌─────────────────┐       ┌─────────────────────┐    ┌─────────────┐  │
//! │  │ Order           │       │ MerchantMembership  │    │ Dish        │  │
//! │  │ OrderItem       │       │ MembershipTx        │    │ Ingredient  │  │
//! │  │ OrderStatusLog  │       │ UserBalance(+Log)   │    │ Tag         │  │
//! │  │ DailyInventory  │       │ Rider (deposit)     │    │ CustGroup   │  │
//! │  │ Delivery        │       │ Voucher             │    │ CustOption  │  │
//! │  │ DeliveryPool    │       │ UserVoucher         │    │ DiningTable │  │
//! │  └─────────────────┘       └─────────────────────┘    └─────────────┘  │
//! │                                                                         │
//! │  Accounts: User, UserRole, UserAddress,                                │
//! │            Merchant, MerchantApplication                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 string - immutable, used for database relations
//! - Business ID where one exists (order_number, etc.) - human-readable
//!
//! ## Money Fields
//! All monetary fields are `*_cents: i64`. Use [`crate::money::Money`]
//! for arithmetic; entities store the raw integer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::UNLIMITED_INVENTORY;

// =============================================================================
// Status Enums
// =============================================================================

/// Lifecycle status of an order.
///
/// Status is mutated only through workflow transitions, and every
/// transition appends an [`OrderStatusLog`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "order_status", rename_all = "snake_case"))]
pub enum OrderStatus {
    Created,
    Paid,
    Accepted,
    InDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Lowercase database/display name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InDelivery => "in_delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Where the order is eaten. Takeout orders get a delivery after payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "order_kind", rename_all = "snake_case"))]
pub enum OrderKind {
    DineIn,
    Takeout,
}

/// Kind of a membership ledger row. The amount sign matches the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "membership_tx_kind", rename_all = "snake_case"))]
pub enum MembershipTxKind {
    Recharge,
    Consume,
    Refund,
}

/// Kind of a user wallet ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "balance_log_kind", rename_all = "snake_case"))]
pub enum BalanceLogKind {
    Recharge,
    Consume,
    Refund,
    ClaimRefund,
}

/// Status of a claimed voucher. Transitions only unused → used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_voucher_status", rename_all = "snake_case"))]
pub enum UserVoucherStatus {
    Unused,
    Used,
}

/// Status of a merchant application. Approval moves draft → approved;
/// reset moves it back to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "application_status", rename_all = "snake_case"))]
pub enum ApplicationStatus {
    Draft,
    Approved,
}

/// Status of a merchant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "merchant_status", rename_all = "snake_case"))]
pub enum MerchantStatus {
    Pending,
    Approved,
}

/// Visibility status of a delivery-pool entry.
///
/// Pool entries never expire on a timestamp; couriers see every `open`
/// entry and dispatch consumers flip the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "pool_entry_status", rename_all = "snake_case"))]
pub enum PoolEntryStatus {
    Open,
    Accepted,
    Cancelled,
}

// =============================================================================
// Ordering
// =============================================================================

/// A customer order. Created once; status mutated only through workflow
/// transitions with an append-only status-change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Merchant the order was placed with.
    pub merchant_id: String,

    /// Customer who placed the order.
    pub user_id: String,

    /// Human-readable order number, referenced from ledger notes.
    pub order_number: String,

    /// Dine-in or takeout.
    pub kind: OrderKind,

    /// Current lifecycle status.
    pub status: OrderStatus,

    /// Order total in cents.
    pub total_cents: i64,

    /// Delivery fee in cents (zero for dine-in).
    pub delivery_fee_cents: i64,

    /// Straight-line delivery distance in meters (zero for dine-in).
    pub delivery_distance_m: i64,

    /// Dropoff address for takeout orders.
    pub address_id: Option<String>,

    /// Free-form note from the customer.
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether payment should dispatch this order to the delivery pool.
    #[inline]
    pub fn is_takeout(&self) -> bool {
        self.kind == OrderKind::Takeout
    }
}

/// A line item on an order. Immutable once created.
///
/// Exactly one of `dish_id` / `combo_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,

    /// Dish reference; dish-backed items participate in inventory locking.
    pub dish_id: Option<String>,

    /// Combo reference; combos carry no per-dish inventory.
    pub combo_id: Option<String>,

    /// Name snapshot taken at order time, preserved if the dish changes.
    pub name: String,

    /// Unit price snapshot in cents.
    pub unit_price_cents: i64,

    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// Append-only log row for one order status transition.
///
/// The initial row has `from_status = None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderStatusLog {
    pub id: String,
    pub order_id: String,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

/// Per-day sellable stock for one dish at one merchant.
///
/// Keyed (merchant, dish, date). Mutated only under a row lock during
/// payment. `total_quantity = -1` means unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailyInventory {
    pub id: String,
    pub merchant_id: String,
    pub dish_id: String,
    pub date: NaiveDate,

    /// Total sellable quantity for the day, or -1 for unlimited.
    pub total_quantity: i64,

    /// Quantity already sold. Invariant: `sold <= total` unless unlimited.
    pub sold_quantity: i64,
}

impl DailyInventory {
    /// Whether this row has the unlimited-stock sentinel.
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.total_quantity == UNLIMITED_INVENTORY
    }

    /// Remaining quantity, or `None` when unlimited.
    pub fn available(&self) -> Option<i64> {
        if self.is_unlimited() {
            None
        } else {
            Some(self.total_quantity - self.sold_quantity)
        }
    }
}

/// A dispatchable delivery derived from a paid takeout order.
/// Created exactly once per order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Delivery {
    pub id: String,
    pub order_id: String,
    pub merchant_id: String,
    pub user_id: String,

    /// Pickup point (merchant coordinates).
    pub pickup_lat: f64,
    pub pickup_lng: f64,

    /// Dropoff point (order address coordinates).
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,

    pub distance_m: i64,

    /// When the kitchen is expected to hand the order over.
    pub estimated_pickup_at: DateTime<Utc>,

    /// When the rider is expected to reach the dropoff.
    pub estimated_delivery_at: DateTime<Utc>,

    /// Actual pickup timestamp; feeds the merchant's trailing average.
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Holding-area entry visible to couriers, ranked by priority tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryPoolEntry {
    pub id: String,
    pub delivery_id: String,
    pub order_id: String,

    /// 1 (default) to 3 (high-fee); see [`crate::eta::delivery_tier`].
    pub priority_tier: i16,

    pub fee_cents: i64,
    pub status: PoolEntryStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Wallets & Ledgers
// =============================================================================

/// A user's membership at one merchant. Unique per (merchant, user).
/// Row-locked before every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MerchantMembership {
    pub id: String,
    pub merchant_id: String,
    pub user_id: String,
    pub balance_cents: i64,
    pub total_recharged_cents: i64,
    pub total_consumed_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only ledger row for one membership balance change.
///
/// Invariant: `balance_after = balance_before ± amount`, sign per `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MembershipTransaction {
    pub id: String,
    pub membership_id: String,
    pub kind: MembershipTxKind,

    /// Magnitude of the change in cents (always positive).
    pub amount_cents: i64,

    pub balance_before_cents: i64,
    pub balance_after_cents: i64,

    /// Human-readable note, e.g. "order #B20260824-0012".
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A voucher template with a validity window and quantity counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Voucher {
    pub id: String,

    /// Issuing merchant; `None` for platform-wide vouchers.
    pub merchant_id: Option<String>,

    pub title: String,

    /// Face value in cents.
    pub amount_cents: i64,

    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,

    pub total_quantity: i64,
    pub claimed_quantity: i64,
    pub used_quantity: i64,

    pub created_at: DateTime<Utc>,
}

/// One claim of a voucher by a user. A user may claim a given voucher
/// at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserVoucher {
    pub id: String,
    pub voucher_id: String,
    pub user_id: String,
    pub status: UserVoucherStatus,

    /// Order the voucher was redeemed against, once used.
    pub order_id: Option<String>,

    /// Expiry copied from the voucher's validity window at claim time.
    pub expires_at: DateTime<Utc>,

    pub claimed_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl UserVoucher {
    /// Whether this claim is past its expiry at `now`.
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether this claim can be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.status == UserVoucherStatus::Unused && !self.is_expired(now)
    }
}

/// A user's platform wallet, keyed directly by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserBalance {
    pub user_id: String,
    pub balance_cents: i64,
    pub updated_at: DateTime<Utc>,
}

/// Append-only ledger row for one user wallet change.
///
/// Invariant: `balance_after = balance_before + amount` (amount signed).
/// `claim_id` is the external idempotency key for `claim_refund` rows;
/// a unique index guarantees at most one effective mutation per claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserBalanceLog {
    pub id: String,
    pub user_id: String,
    pub kind: BalanceLogKind,

    /// Signed change in cents.
    pub amount_cents: i64,

    pub balance_before_cents: i64,
    pub balance_after_cents: i64,

    /// Externally supplied idempotency key (claim-refund rows only).
    pub claim_id: Option<String>,

    /// Where the money came from, e.g. a rider deposit id.
    pub source: Option<String>,

    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A delivery rider. The deposit backs claim refunds deducted from riders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Rider {
    pub id: String,
    pub user_id: String,
    pub deposit_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Accounts & Merchants
// =============================================================================

/// A platform user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A role granted to a user. Registration creates the default role;
/// merchant approval ensures exactly one `merchant` role row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub role: String,

    /// Set on `merchant` roles: the merchant this role links to.
    pub merchant_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A saved dropoff address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserAddress {
    pub id: String,
    pub user_id: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

/// A merchant storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Merchant {
    pub id: String,

    /// Owning user. One merchant per user.
    pub user_id: String,

    pub name: String,
    pub status: MerchantStatus,
    pub region_id: i64,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application to open a merchant. Approval creates-or-updates the
/// owner's merchant record; reset returns the application to draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MerchantApplication {
    pub id: String,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub merchant_name: String,
    pub region_id: i64,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Dish Composition
// =============================================================================

/// A dish on a merchant's menu. Lifecycle independent of its
/// associations; association sets are replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: String,
    pub merchant_id: String,
    pub name: String,
    pub price_cents: i64,

    /// Declared kitchen prepare time; feeds delivery ETA estimation.
    pub prepare_minutes: Option<i64>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ingredient listed on a dish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DishIngredient {
    pub id: String,
    pub dish_id: String,
    pub name: String,
    pub sort_order: i32,
}

/// A search/browse tag on a dish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DishTag {
    pub id: String,
    pub dish_id: String,
    pub tag: String,
}

/// A customization group on a dish (e.g. "Spice level").
/// Options cascade-delete with their group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DishCustomizationGroup {
    pub id: String,
    pub dish_id: String,
    pub name: String,
    pub required: bool,
    pub sort_order: i32,
}

/// An option within a customization group (e.g. "Extra hot", +0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DishCustomizationOption {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub price_delta_cents: i64,
    pub sort_order: i32,
}

// =============================================================================
// Tables & Reservations
// =============================================================================

/// A physical table at a merchant (dine-in).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: String,
    pub merchant_id: String,
    pub name: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

/// A tag link on a table (window seat, outdoor, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TableTagLink {
    pub id: String,
    pub table_id: String,
    pub tag: String,
}

/// A reservation against a table. Future reservations block table
/// deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: String,
    pub table_id: String,
    pub user_id: String,
    pub reserved_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn voucher_claim(status: UserVoucherStatus, expires_in: Duration) -> UserVoucher {
        let now = Utc::now();
        UserVoucher {
            id: "uv-1".to_string(),
            voucher_id: "v-1".to_string(),
            user_id: "u-1".to_string(),
            status,
            order_id: None,
            expires_at: now + expires_in,
            claimed_at: now,
            used_at: None,
        }
    }

    #[test]
    fn test_inventory_available() {
        let inv = DailyInventory {
            id: "i-1".to_string(),
            merchant_id: "m-1".to_string(),
            dish_id: "d-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            total_quantity: 10,
            sold_quantity: 8,
        };
        assert!(!inv.is_unlimited());
        assert_eq!(inv.available(), Some(2));
    }

    #[test]
    fn test_inventory_unlimited_sentinel() {
        let inv = DailyInventory {
            id: "i-2".to_string(),
            merchant_id: "m-1".to_string(),
            dish_id: "d-2".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            total_quantity: -1,
            sold_quantity: 1234,
        };
        assert!(inv.is_unlimited());
        assert_eq!(inv.available(), None);
    }

    #[test]
    fn test_user_voucher_redeemable() {
        let now = Utc::now();

        let fresh = voucher_claim(UserVoucherStatus::Unused, Duration::days(3));
        assert!(fresh.is_redeemable(now));

        let expired = voucher_claim(UserVoucherStatus::Unused, Duration::days(-1));
        assert!(expired.is_expired(now));
        assert!(!expired.is_redeemable(now));

        let used = voucher_claim(UserVoucherStatus::Used, Duration::days(3));
        assert!(!used.is_redeemable(now));
    }

    #[test]
    fn test_order_status_as_str() {
        assert_eq!(OrderStatus::Created.as_str(), "created");
        assert_eq!(OrderStatus::InDelivery.as_str(), "in_delivery");
    }
}
