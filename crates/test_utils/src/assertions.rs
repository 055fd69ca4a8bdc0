//! Custom Test Assertions
//!
//! Assertion helpers for claims with more useful failure messages
//! than plain `assert_eq!`.

use domain_travel::{ClaimStatus, TravelClaim};

/// Asserts that the claim total is the sum of its components
pub fn assert_amounts_consistent(claim: &TravelClaim) {
    assert!(
        claim.amounts_consistent(),
        "Claim {} total {} != allowance {} + transport {}",
        claim.id,
        claim.total_amount,
        claim.daily_allowance,
        claim.transport_cost
    );
}

pub fn assert_status(claim: &TravelClaim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} is {}, expected {}",
        claim.id, claim.status, expected
    );
}

/// Asserts that no review fields have been set
pub fn assert_not_reviewed(claim: &TravelClaim) {
    assert!(
        claim.reviewed_at.is_none() && claim.reviewed_by.is_none(),
        "Claim {} unexpectedly reviewed by {:?} at {:?}",
        claim.id,
        claim.reviewed_by,
        claim.reviewed_at
    );
}
