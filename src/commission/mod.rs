//! Splits a delivery fee into the platform commission and the rider payout.
//!
//! Rates are a step function of the fee. A location id that is not in the
//! service-location table bypasses the tiers and pays a flat rate.

pub mod locations;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::commission::locations::find_location;

#[derive(Debug, Clone, Copy)]
pub struct CommissionTier {
    pub min_fee: f64,
    pub rate: Decimal,
}

/// Ordered from the highest breakpoint down; the first match wins.
pub const COMMISSION_TIERS: [CommissionTier; 4] = [
    CommissionTier {
        min_fee: 100.0,
        rate: dec!(0.05),
    },
    CommissionTier {
        min_fee: 70.0,
        rate: dec!(0.02),
    },
    CommissionTier {
        min_fee: 50.0,
        rate: dec!(0.01),
    },
    CommissionTier {
        min_fee: 30.0,
        rate: dec!(0.005),
    },
];

/// Rate for fees below the lowest breakpoint.
pub const BASE_RATE: Decimal = dec!(0.001);

pub const UNKNOWN_LOCATION_RATE: Decimal = dec!(0.01);

/// Largest fee the service accepts for a single delivery.
pub const MAX_DELIVERY_FEE: f64 = 1_000_000.0;

const MONEY_SCALE: u32 = 2;

// Beyond this an f64 has no cents left to round.
const INTEGRAL_F64: f64 = 4_503_599_627_370_496.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionQuote {
    pub location_id: String,
    pub known_location: bool,
    pub delivery_fee: f64,
    pub rate: f64,
    pub commission_amount: f64,
    pub rider_earning: f64,
}

pub fn is_accepted_fee(delivery_fee: f64) -> bool {
    delivery_fee.is_finite() && (0.0..=MAX_DELIVERY_FEE).contains(&delivery_fee)
}

pub fn calculate_commission(location_id: &str, delivery_fee: f64) -> f64 {
    if !delivery_fee.is_finite() {
        return 0.0;
    }

    let rate = rate_for(location_id, delivery_fee);
    match to_decimal(delivery_fee).and_then(|fee| fee.checked_mul(rate)) {
        Some(amount) => to_float(round_money(amount)),
        None => approximate(delivery_fee * to_float(rate)),
    }
}

pub fn calculate_rider_earning(delivery_fee: f64, commission: f64) -> f64 {
    if !delivery_fee.is_finite() || !commission.is_finite() {
        return 0.0;
    }

    match to_decimal(delivery_fee)
        .zip(to_decimal(commission))
        .and_then(|(fee, commission)| fee.checked_sub(commission))
    {
        Some(earning) => to_float(round_money(earning)),
        None => approximate(delivery_fee - commission),
    }
}

pub fn commission_rate(location_id: &str, delivery_fee: f64) -> f64 {
    to_float(rate_for(location_id, delivery_fee))
}

pub fn quote(location_id: &str, delivery_fee: f64) -> CommissionQuote {
    let commission_amount = calculate_commission(location_id, delivery_fee);

    CommissionQuote {
        location_id: location_id.to_string(),
        known_location: find_location(location_id).is_some(),
        delivery_fee,
        rate: commission_rate(location_id, delivery_fee),
        commission_amount,
        rider_earning: calculate_rider_earning(delivery_fee, commission_amount),
    }
}

/// Adds two currency amounts without accumulating float drift.
pub fn add_amounts(a: f64, b: f64) -> f64 {
    match to_decimal(a)
        .zip(to_decimal(b))
        .and_then(|(a, b)| a.checked_add(b))
    {
        Some(sum) => to_float(round_money(sum)),
        None => approximate(a + b),
    }
}

// Tiers compare against the caller's f64 so a fee just under a breakpoint
// never rounds up into the next tier.
fn rate_for(location_id: &str, delivery_fee: f64) -> Decimal {
    if find_location(location_id).is_none() {
        return UNKNOWN_LOCATION_RATE;
    }

    COMMISSION_TIERS
        .iter()
        .find(|tier| delivery_fee >= tier.min_fee)
        .map(|tier| tier.rate)
        .unwrap_or(BASE_RATE)
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

// Single division so the result is the f64 nearest to the decimal value.
fn to_float(value: Decimal) -> f64 {
    value.mantissa() as f64 / 10f64.powi(value.scale() as i32)
}

/// f64 path for amounts outside `Decimal`'s range. Saturates instead of
/// overflowing to infinity.
fn approximate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value.is_infinite() {
        value.signum() * f64::MAX
    } else if value.abs() >= INTEGRAL_F64 {
        value
    } else {
        (value * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_amounts, calculate_commission, calculate_rider_earning, commission_rate,
        is_accepted_fee, quote, MAX_DELIVERY_FEE,
    };

    const LOCATION: &str = "downtown";

    #[test]
    fn tier_breakpoints() {
        assert_eq!(calculate_commission(LOCATION, 20.0), 0.02);
        assert_eq!(calculate_commission(LOCATION, 30.0), 0.15);
        assert_eq!(calculate_commission(LOCATION, 50.0), 0.5);
        assert_eq!(calculate_commission(LOCATION, 70.0), 1.4);
        assert_eq!(calculate_commission(LOCATION, 100.0), 5.0);
        assert_eq!(calculate_commission(LOCATION, 250.0), 12.5);
    }

    #[test]
    fn just_below_breakpoint_uses_lower_tier() {
        assert_eq!(commission_rate(LOCATION, 99.99), 0.02);
        assert_eq!(commission_rate(LOCATION, 69.99), 0.01);
        assert_eq!(commission_rate(LOCATION, 49.99), 0.005);
        assert_eq!(commission_rate(LOCATION, 29.99), 0.001);
    }

    #[test]
    fn fee_one_ulp_below_breakpoint_uses_lower_tier() {
        let just_under_thirty = 29.999999999999996_f64;
        assert!(just_under_thirty < 30.0);
        assert_eq!(commission_rate(LOCATION, just_under_thirty), 0.001);

        let just_under_hundred = 99.99999999999999_f64;
        assert!(just_under_hundred < 100.0);
        assert_eq!(commission_rate(LOCATION, just_under_hundred), 0.02);
    }

    #[test]
    fn rounds_half_up() {
        // 15 * 0.001 = 0.015
        assert_eq!(calculate_commission(LOCATION, 15.0), 0.02);
        // 35 * 0.005 = 0.175
        assert_eq!(calculate_commission(LOCATION, 35.0), 0.18);
    }

    #[test]
    fn unknown_location_pays_flat_rate() {
        assert_eq!(commission_rate("atlantis", 15.0), 0.01);
        assert_eq!(commission_rate("atlantis", 500.0), 0.01);
        assert_eq!(calculate_commission("atlantis", 100.0), 1.0);
        assert_eq!(calculate_commission("atlantis", 20.0), 0.2);
    }

    #[test]
    fn earning_plus_commission_is_fee() {
        for fee in [15.0, 30.0, 50.0, 70.0, 100.0, 42.37, 0.0] {
            let commission = calculate_commission(LOCATION, fee);
            let earning = calculate_rider_earning(fee, commission);
            assert!(
                (earning + commission - fee).abs() < 0.01,
                "fee {fee}: {earning} + {commission}"
            );
        }
    }

    #[test]
    fn fifteen_dollar_delivery() {
        let commission = calculate_commission(LOCATION, 15.0);
        assert_eq!(commission, 0.02);
        assert_eq!(calculate_rider_earning(15.0, commission), 14.98);
    }

    #[test]
    fn non_finite_fee_is_total() {
        assert_eq!(calculate_commission(LOCATION, f64::NAN), 0.0);
        assert_eq!(calculate_commission(LOCATION, f64::INFINITY), 0.0);
        assert!(calculate_rider_earning(f64::NAN, 1.0).is_finite());
    }

    #[test]
    fn fee_beyond_decimal_range_keeps_split() {
        let fee = 1e29;
        let commission = calculate_commission(LOCATION, fee);
        let earning = calculate_rider_earning(fee, commission);

        assert!(((commission - 5e27) / 5e27).abs() < 1e-12);
        assert!(earning > 0.0);
        assert!(((earning + commission - fee) / fee).abs() < 1e-12);
    }

    #[test]
    fn adding_huge_amounts_does_not_panic() {
        let total = add_amounts(5e28, 5e28);
        assert!(total.is_finite());
        assert!((total - 1e29).abs() / 1e29 < 1e-12);

        assert_eq!(add_amounts(f64::MAX, f64::MAX), f64::MAX);
        assert_eq!(add_amounts(78.4, 14.98), 93.38);
    }

    #[test]
    fn accepted_fee_range() {
        assert!(is_accepted_fee(0.0));
        assert!(is_accepted_fee(MAX_DELIVERY_FEE));
        assert!(!is_accepted_fee(MAX_DELIVERY_FEE + 1.0));
        assert!(!is_accepted_fee(-0.01));
        assert!(!is_accepted_fee(f64::NAN));
        assert!(!is_accepted_fee(5e28));
    }

    #[test]
    fn quote_reports_breakdown() {
        let q = quote(LOCATION, 80.0);
        assert!(q.known_location);
        assert_eq!(q.rate, 0.02);
        assert_eq!(q.commission_amount, 1.6);
        assert_eq!(q.rider_earning, 78.4);

        let unknown = quote("nowhere", 80.0);
        assert!(!unknown.known_location);
        assert_eq!(unknown.commission_amount, 0.8);
    }
}
