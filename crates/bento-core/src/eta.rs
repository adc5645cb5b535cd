//! # Delivery ETA Estimation
//!
//! Pure estimation logic for takeout deliveries: how long the kitchen
//! needs, how long the ride takes, and which pool tier a delivery lands in.
//!
//! ## Estimation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ETA Estimation                                     │
//! │                                                                         │
//! │  prepare_minutes                                                        │
//! │  ├── max per-dish prepare time among ordered dishes                    │
//! │  ├── else: merchant trailing-7-day average prepare time                │
//! │  └── else: DEFAULT_PREPARE_MINUTES (20)                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  transit_minutes = max(5, ceil(distance_m / 250 m/min))                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  delivery_minutes = prepare + transit                                  │
//! │                                                                         │
//! │  Separately: delivery_tier(fee) ranks the pool entry                   │
//! │    fee ≥ 1000 cents → tier 3                                           │
//! │    fee ≥  500 cents → tier 2                                           │
//! │    else             → tier 1                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions here are pure; the payment workflow feeds them values it
//! read inside its transaction.

// =============================================================================
// Constants
// =============================================================================

/// Fallback kitchen prepare time when neither the ordered dishes nor the
/// merchant's history provide one.
pub const DEFAULT_PREPARE_MINUTES: i64 = 20;

/// Floor for the transit leg; even a next-door dropoff takes this long.
pub const MIN_TRANSIT_MINUTES: i64 = 5;

/// Assumed average rider speed, in meters per minute (15 km/h).
pub const RIDER_SPEED_M_PER_MIN: i64 = 250;

/// Delivery fee (cents) at or above which a pool entry gets tier 2.
pub const TIER2_FEE_CENTS: i64 = 500;

/// Delivery fee (cents) at or above which a pool entry gets tier 3.
pub const TIER3_FEE_CENTS: i64 = 1000;

// =============================================================================
// Estimation Functions
// =============================================================================

/// Estimates kitchen prepare time for an order.
///
/// ## Fallback Chain
/// 1. `max_dish_minutes` - the maximum per-dish prepare time among the
///    ordered dishes (None when no ordered dish declares one)
/// 2. `merchant_avg_minutes` - the merchant's trailing-7-day average
///    actual prepare time (None when there is no delivery history)
/// 3. [`DEFAULT_PREPARE_MINUTES`]
pub fn prepare_minutes(max_dish_minutes: Option<i64>, merchant_avg_minutes: Option<i64>) -> i64 {
    max_dish_minutes
        .or(merchant_avg_minutes)
        .unwrap_or(DEFAULT_PREPARE_MINUTES)
}

/// Estimates the transit leg from pickup to dropoff.
///
/// Rounds the ride up to whole minutes and never goes below
/// [`MIN_TRANSIT_MINUTES`].
pub fn transit_minutes(distance_m: i64) -> i64 {
    // Ceiling division; distance is never negative in practice but a
    // defensive clamp keeps the result sane for bad input.
    let distance_m = distance_m.max(0);
    let ride = (distance_m + RIDER_SPEED_M_PER_MIN - 1) / RIDER_SPEED_M_PER_MIN;
    ride.max(MIN_TRANSIT_MINUTES)
}

/// Estimates total minutes until dropoff: kitchen plus ride.
pub fn delivery_minutes(prepare: i64, distance_m: i64) -> i64 {
    prepare + transit_minutes(distance_m)
}

/// Ranks a delivery-pool entry by its fee.
///
/// Higher-fee deliveries surface first to couriers polling the pool.
/// Pool entries carry no expiry; visibility is filtered by
/// acceptance/cancellation status, not by a timestamp.
pub fn delivery_tier(fee_cents: i64) -> i16 {
    if fee_cents >= TIER3_FEE_CENTS {
        3
    } else if fee_cents >= TIER2_FEE_CENTS {
        2
    } else {
        1
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_fallback_chain() {
        // Dish time wins when present
        assert_eq!(prepare_minutes(Some(35), Some(12)), 35);
        // Merchant average when no dish declares a time
        assert_eq!(prepare_minutes(None, Some(12)), 12);
        // Default when there is no history at all
        assert_eq!(prepare_minutes(None, None), DEFAULT_PREPARE_MINUTES);
    }

    #[test]
    fn test_transit_floor() {
        // 100m is well under the 5 minute floor
        assert_eq!(transit_minutes(100), MIN_TRANSIT_MINUTES);
        assert_eq!(transit_minutes(0), MIN_TRANSIT_MINUTES);
        assert_eq!(transit_minutes(-50), MIN_TRANSIT_MINUTES);
    }

    #[test]
    fn test_transit_rounds_up() {
        // 2000m at 250 m/min = exactly 8 minutes
        assert_eq!(transit_minutes(2000), 8);
        // 2001m rounds up to 9
        assert_eq!(transit_minutes(2001), 9);
    }

    #[test]
    fn test_delivery_minutes() {
        // 20 min kitchen + 10 min ride (2500m)
        assert_eq!(delivery_minutes(20, 2500), 30);
        // Floor applies to short rides
        assert_eq!(delivery_minutes(15, 100), 20);
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(delivery_tier(0), 1);
        assert_eq!(delivery_tier(499), 1);
        assert_eq!(delivery_tier(500), 2);
        assert_eq!(delivery_tier(999), 2);
        assert_eq!(delivery_tier(1000), 3);
        assert_eq!(delivery_tier(5000), 3);
    }
}
