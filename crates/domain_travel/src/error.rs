//! Claims domain errors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MoneyError, PortError};

use crate::claim::ClaimStatus;
use crate::engine::ActionKind;

/// Errors that can occur in the travel claims domain
///
/// Input validation errors carry enough context for field-level correction;
/// none of them are ever replaced by a default value.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid travel range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Unknown transport mode: {0}")]
    UnknownTransportMode(String),

    #[error("Invalid distance: {0} km")]
    InvalidDistance(Decimal),

    #[error("Missing or invalid field: {0}")]
    MissingField(&'static str),

    #[error("Invalid transition: cannot {action} a claim in status {status}")]
    InvalidTransition { status: ClaimStatus, action: ActionKind },

    #[error("Unauthorized: {actor} may not {action} this claim")]
    Unauthorized { actor: String, action: ActionKind },

    #[error("Concurrent modification of claim {claim_id}: expected version {expected}, found {actual}")]
    ConcurrentModification {
        claim_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Storage error: {0}")]
    Storage(#[source] PortError),
}

impl ClaimError {
    /// Returns true for errors caused by malformed caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClaimError::InvalidRange { .. }
                | ClaimError::UnknownTransportMode(_)
                | ClaimError::InvalidDistance(_)
                | ClaimError::MissingField(_)
        )
    }

    /// The offending field for validation errors, in the camelCase names
    /// used by the claim form
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ClaimError::InvalidRange { .. } => Some("travelDates"),
            ClaimError::UnknownTransportMode(_) => Some("transportMode"),
            ClaimError::InvalidDistance(_) => Some("distanceKm"),
            ClaimError::MissingField(name) => Some(*name),
            _ => None,
        }
    }
}

impl From<PortError> for ClaimError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Conflict { id, expected, actual, .. } => {
                ClaimError::ConcurrentModification {
                    claim_id: id,
                    expected,
                    actual,
                }
            }
            PortError::NotFound { id, .. } => ClaimError::ClaimNotFound(id),
            other => ClaimError::Storage(other),
        }
    }
}
