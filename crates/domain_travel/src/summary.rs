//! Aggregate figures over a set of claims

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::claim::{ClaimStatus, TravelClaim};

/// Dashboard totals for a list of claims
///
/// Drafts are counted but never contribute to any amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub currency: Currency,
    pub claim_count: usize,
    pub by_status: BTreeMap<ClaimStatus, usize>,
    /// Every claim that has left draft
    pub total_claimed: Money,
    /// Submitted or under review
    pub pending_amount: Money,
    /// Approved or paid
    pub total_approved: Money,
    pub total_paid: Money,
}

impl ClaimSummary {
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            claim_count: 0,
            by_status: BTreeMap::new(),
            total_claimed: Money::zero(currency),
            pending_amount: Money::zero(currency),
            total_approved: Money::zero(currency),
            total_paid: Money::zero(currency),
        }
    }

    /// Summarises claims priced in `currency`
    ///
    /// # Errors
    ///
    /// `CurrencyMismatch` if a claim is priced in another currency.
    pub fn from_claims<'a, I>(currency: Currency, claims: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = &'a TravelClaim>,
    {
        let mut summary = Self::empty(currency);
        for claim in claims {
            summary.add(claim)?;
        }
        Ok(summary)
    }

    fn add(&mut self, claim: &TravelClaim) -> Result<(), MoneyError> {
        self.claim_count += 1;
        *self.by_status.entry(claim.status).or_insert(0) += 1;

        let amount = &claim.total_amount;
        if claim.status != ClaimStatus::Draft {
            self.total_claimed = self.total_claimed.checked_add(amount)?;
        }
        if claim.status.is_pending_review() {
            self.pending_amount = self.pending_amount.checked_add(amount)?;
        }
        if matches!(claim.status, ClaimStatus::Approved | ClaimStatus::Paid) {
            self.total_approved = self.total_approved.checked_add(amount)?;
        }
        if claim.status == ClaimStatus::Paid {
            self.total_paid = self.total_paid.checked_add(amount)?;
        }
        Ok(())
    }

    pub fn count(&self, status: ClaimStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
