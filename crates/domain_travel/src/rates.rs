//! Allowance and transport cost rules
//!
//! Rates are configuration, not constants: institutions set their own daily
//! allowance and per-km rate for each transport category. The reference
//! defaults are 1000/day and flight 12, train 8, bus 5, car 10 per km.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, Currency, DateRange, Money};

use crate::claim::TransportMode;
use crate::error::ClaimError;

/// Computes the daily allowance for an inclusive travel period
///
/// A single-day trip (`from == to`) charges exactly one day.
///
/// # Errors
///
/// `InvalidRange` if `to` is before `from`.
pub fn compute_daily_allowance(
    from: NaiveDate,
    to: NaiveDate,
    rate_per_day: Money,
) -> Result<Money, ClaimError> {
    let range = DateRange::new(from, to).map_err(|_| ClaimError::InvalidRange { from, to })?;
    Ok(rate_per_day.checked_mul(Decimal::from(range.inclusive_days()))?)
}

/// Computes the transport cost as per-km rate × distance
///
/// # Errors
///
/// `InvalidDistance` for a negative distance, `UnknownTransportMode` when
/// the rate table has no entry for `mode`.
pub fn compute_transport_cost(
    mode: TransportMode,
    distance_km: Decimal,
    rates: &TransportRates,
) -> Result<Money, ClaimError> {
    if distance_km.is_sign_negative() && !distance_km.is_zero() {
        return Err(ClaimError::InvalidDistance(distance_km));
    }
    let per_km = rates
        .rate_for(mode)
        .ok_or_else(|| ClaimError::UnknownTransportMode(mode.to_string()))?;
    Ok(per_km.checked_mul(distance_km)?)
}

/// Sums the allowance and transport cost
pub fn compute_total(daily_allowance: Money, transport_cost: Money) -> Result<Money, ClaimError> {
    Ok(daily_allowance.checked_add(&transport_cost)?)
}

/// Per-km rates keyed by transport mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportRates {
    pub currency: Currency,
    pub per_km: BTreeMap<TransportMode, Decimal>,
}

impl TransportRates {
    /// An empty table; every mode is unknown until a rate is added
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            per_km: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, mode: TransportMode, rate: Decimal) -> Self {
        self.per_km.insert(mode, rate);
        self
    }

    pub fn rate_for(&self, mode: TransportMode) -> Option<Money> {
        self.per_km
            .get(&mode)
            .map(|rate| Money::new(*rate, self.currency))
    }

    pub fn contains(&self, mode: TransportMode) -> bool {
        self.per_km.contains_key(&mode)
    }

    pub fn modes(&self) -> impl Iterator<Item = TransportMode> + '_ {
        self.per_km.keys().copied()
    }
}

impl Default for TransportRates {
    fn default() -> Self {
        TransportRates::new(Currency::INR)
            .with_rate(TransportMode::Flight, dec!(12))
            .with_rate(TransportMode::Train, dec!(8))
            .with_rate(TransportMode::Bus, dec!(5))
            .with_rate(TransportMode::Car, dec!(10))
    }
}

/// Complete rate configuration for the claim engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Flat allowance per chargeable day
    pub daily_rate: Money,
    pub transport: TransportRates,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            daily_rate: Money::new(dec!(1000), Currency::INR),
            transport: TransportRates::default(),
        }
    }
}

impl RateConfig {
    pub fn new(daily_rate: Money, transport: TransportRates) -> Result<Self, CoreError> {
        let config = Self { daily_rate, transport };
        config.validate()?;
        Ok(config)
    }

    pub fn currency(&self) -> Currency {
        self.daily_rate.currency()
    }

    /// Rejects a non-positive daily rate, negative per-km rates and a
    /// transport table priced in a different currency
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.daily_rate.amount() <= Decimal::ZERO {
            return Err(CoreError::configuration(format!(
                "daily rate must be positive, got {}",
                self.daily_rate
            )));
        }
        if self.transport.currency != self.daily_rate.currency() {
            return Err(CoreError::configuration(format!(
                "transport rates are in {} but the daily rate is in {}",
                self.transport.currency,
                self.daily_rate.currency()
            )));
        }
        if let Some((mode, rate)) = self.transport.per_km.iter().find(|(_, r)| r.is_sign_negative()) {
            return Err(CoreError::configuration(format!(
                "per-km rate for {mode} must not be negative, got {rate}"
            )));
        }
        Ok(())
    }

    /// Prices a trip without creating a claim
    pub fn quote(
        &self,
        travel_dates: DateRange,
        mode: TransportMode,
        distance_km: Decimal,
    ) -> Result<CostBreakdown, ClaimError> {
        let daily_allowance =
            compute_daily_allowance(travel_dates.start, travel_dates.end, self.daily_rate)?;
        let transport_cost = compute_transport_cost(mode, distance_km, &self.transport)?;
        let total = compute_total(daily_allowance, transport_cost)?;

        Ok(CostBreakdown {
            days: travel_dates.inclusive_days(),
            daily_allowance,
            transport_cost,
            total,
        })
    }
}

/// The derived amounts of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub days: i64,
    pub daily_allowance: Money,
    pub transport_cost: Money,
    pub total: Money,
}
