//! Property-Based Test Generators
//!
//! Proptest strategies that produce values satisfying the claim invariants.

use chrono::{Duration, NaiveDate};
use core_kernel::{Currency, DateRange, EmployeeId, Money};
use domain_travel::{NewClaim, TransportMode};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for transport modes
pub fn transport_mode_strategy() -> impl Strategy<Value = TransportMode> {
    prop_oneof![
        Just(TransportMode::Flight),
        Just(TransportMode::Train),
        Just(TransportMode::Bus),
        Just(TransportMode::Car),
    ]
}

/// Strategy for valid travel periods in 2024, up to 30 days long
pub fn date_range_strategy() -> impl Strategy<Value = DateRange> {
    (0i64..366, 0i64..30).prop_map(|(offset, len)| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset);
        DateRange {
            start,
            end: start + Duration::days(len),
        }
    })
}

/// Strategy for non-negative distances up to 5000 km with up to five
/// decimal places
pub fn distance_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=5).prop_flat_map(|scale| {
        let max = 5_000 * 10i64.pow(scale);
        (0..=max).prop_map(move |units| Decimal::new(units, scale))
    })
}

/// Strategy for positive daily rates in INR
pub fn daily_rate_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000).prop_map(|rate| Money::new(Decimal::from(rate), Currency::INR))
}

/// Strategy for complete, submittable claim input for one employee
pub fn new_claim_strategy(employee_id: EmployeeId) -> impl Strategy<Value = NewClaim> {
    (
        date_range_strategy(),
        transport_mode_strategy(),
        distance_strategy(),
        "[A-Z][a-z]{3,12}",
        "[A-Z][a-z]{3,12}",
    )
        .prop_map(move |(travel_dates, transport_mode, distance_km, origin, destination)| NewClaim {
            employee_id,
            employee_name: "Generated Employee".to_string(),
            department: "Operations".to_string(),
            travel_dates,
            purpose: "Site visit".to_string(),
            origin,
            destination,
            transport_mode,
            distance_km,
            remarks: None,
            receipts: Vec::new(),
        })
}
