//! Pre-built Test Fixtures
//!
//! Consistent, predictable values shared by unit and integration tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, DateRange, EmployeeId, Money};
use domain_travel::{AccessPolicy, Actor, ClaimEngine, RateConfig, Role};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    /// The default daily allowance
    pub fn daily_rate() -> Money {
        Money::new(dec!(1000), Currency::INR)
    }

    /// Total of the reference trip: 3 days and 300 km by bus
    pub fn reference_total() -> Money {
        Money::new(dec!(4500), Currency::INR)
    }
}

/// Fixture for dates and timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// 15 to 17 January 2024, three chargeable days
    pub fn reference_trip() -> DateRange {
        DateRange::new(Self::date(2024, 1, 15), Self::date(2024, 1, 17)).unwrap()
    }

    pub fn single_day() -> DateRange {
        DateRange::single_day(Self::date(2024, 5, 2))
    }

    /// A fixed instant on 20 January 2024
    pub fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 20, hour, 0, 0).unwrap()
    }
}

/// Fixture for acting users
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn employee() -> Actor {
        Actor::employee("employee-1", EmployeeId::new())
    }

    pub fn hr() -> Actor {
        Actor::staff("hr-1", Role::Hr)
    }

    pub fn finance() -> Actor {
        Actor::staff("finance-1", Role::Finance)
    }

    pub fn admin() -> Actor {
        Actor::staff("admin-1", Role::Admin)
    }

    /// A manager, who reviews nothing under the default policy
    pub fn manager() -> Actor {
        Actor::staff("manager-1", Role::Manager)
    }
}

/// Fixture for engines
pub struct EngineFixtures;

impl EngineFixtures {
    /// Engine with the reference rates and access policy
    pub fn standard() -> ClaimEngine {
        ClaimEngine::new(RateConfig::default(), AccessPolicy::default())
    }
}
