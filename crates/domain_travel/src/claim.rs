//! Travel claim aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, Currency, DateRange, EmployeeId, Money, ReceiptId};

use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Being prepared by the employee
    Draft,
    /// Handed in, waiting for a reviewer
    Submitted,
    /// Picked up by a reviewer
    UnderReview,
    /// Approved for payment
    Approved,
    /// Rejected by a reviewer
    Rejected,
    /// Disbursed
    Paid,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 6] = [
        ClaimStatus::Draft,
        ClaimStatus::Submitted,
        ClaimStatus::UnderReview,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
        ClaimStatus::Paid,
    ];

    /// No action is defined out of a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Paid)
    }

    /// Submitted or under review: waiting on a reviewer decision
    pub fn is_pending_review(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::UnderReview)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown claim status: {s}"))
    }
}

/// Transport category used for the per-km rate lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Flight,
    Train,
    Bus,
    Car,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Flight,
        TransportMode::Train,
        TransportMode::Bus,
        TransportMode::Car,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Flight => "flight",
            TransportMode::Train => "train",
            TransportMode::Bus => "bus",
            TransportMode::Car => "car",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == key)
            .ok_or_else(|| ClaimError::UnknownTransportMode(s.to_string()))
    }
}

/// Opaque reference to a stored receipt
///
/// The claims core never opens or parses the referenced document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRef {
    pub id: ReceiptId,
    pub file_name: String,
    pub content_type: String,
    /// Location understood by the receipt store
    pub uri: String,
}

/// A travel and daily allowance claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelClaim {
    pub id: ClaimId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub department: String,
    /// Inclusive travel period
    pub travel_dates: DateRange,
    pub purpose: String,
    pub origin: String,
    pub destination: String,
    pub transport_mode: TransportMode,
    pub distance_km: Decimal,
    /// Derived from `travel_dates` and the daily rate
    pub daily_allowance: Money,
    /// Derived from `transport_mode`, `distance_km` and the per-km rate
    pub transport_cost: Money,
    /// Always `daily_allowance + transport_cost`
    pub total_amount: Money,
    pub status: ClaimStatus,
    pub receipts: Vec<ReceiptRef>,
    /// Employee-supplied remarks
    pub remarks: Option<String>,
    /// Reviewer-supplied notes
    pub admin_notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TravelClaim {
    /// Number of chargeable days, counting both travel dates
    pub fn days(&self) -> i64 {
        self.travel_dates.inclusive_days()
    }

    pub fn currency(&self) -> Currency {
        self.total_amount.currency()
    }

    /// Checks the `total = allowance + transport` invariant
    pub fn amounts_consistent(&self) -> bool {
        self.daily_allowance
            .checked_add(&self.transport_cost)
            .map(|sum| sum == self.total_amount)
            .unwrap_or(false)
    }

    pub fn has_receipt(&self, id: ReceiptId) -> bool {
        self.receipts.iter().any(|r| r.id == id)
    }
}

/// Input for creating a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub department: String,
    pub travel_dates: DateRange,
    pub purpose: String,
    pub origin: String,
    pub destination: String,
    pub transport_mode: TransportMode,
    pub distance_km: Decimal,
    pub remarks: Option<String>,
    #[serde(default)]
    pub receipts: Vec<ReceiptRef>,
}

/// Patch applied to a draft claim by its owner
///
/// `None` leaves a field untouched. Derived amounts are recomputed after
/// every edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimEdit {
    pub travel_dates: Option<DateRange>,
    pub purpose: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub transport_mode: Option<TransportMode>,
    pub distance_km: Option<Decimal>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub add_receipts: Vec<ReceiptRef>,
    #[serde(default)]
    pub remove_receipts: Vec<ReceiptId>,
}

impl ClaimEdit {
    /// An edit that only attaches a receipt
    pub fn attach(receipt: ReceiptRef) -> Self {
        Self {
            add_receipts: vec![receipt],
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ClaimEdit::default()
    }

    /// Applies the descriptive fields and receipt changes; amounts are the
    /// engine's concern
    pub(crate) fn apply_to(self, claim: &mut TravelClaim) {
        if let Some(dates) = self.travel_dates {
            claim.travel_dates = dates;
        }
        if let Some(purpose) = self.purpose {
            claim.purpose = purpose;
        }
        if let Some(origin) = self.origin {
            claim.origin = origin;
        }
        if let Some(destination) = self.destination {
            claim.destination = destination;
        }
        if let Some(mode) = self.transport_mode {
            claim.transport_mode = mode;
        }
        if let Some(distance) = self.distance_km {
            claim.distance_km = distance;
        }
        if let Some(remarks) = self.remarks {
            claim.remarks = if remarks.trim().is_empty() { None } else { Some(remarks) };
        }
        claim.receipts.retain(|r| !self.remove_receipts.contains(&r.id));
        for receipt in self.add_receipts {
            if !claim.has_receipt(receipt.id) {
                claim.receipts.push(receipt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mode_parsing_is_case_insensitive() {
        assert_eq!("Bus".parse::<TransportMode>().unwrap(), TransportMode::Bus);
        assert_eq!(" flight ".parse::<TransportMode>().unwrap(), TransportMode::Flight);
    }

    #[test]
    fn test_unknown_transport_mode() {
        let result = "rocket".parse::<TransportMode>();
        assert!(matches!(result, Err(ClaimError::UnknownTransportMode(ref m)) if m == "rocket"));
    }

    #[test]
    fn test_status_string_forms() {
        for status in ClaimStatus::ALL {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = ClaimStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![ClaimStatus::Rejected, ClaimStatus::Paid]);
    }

    #[test]
    fn test_empty_edit() {
        assert!(ClaimEdit::default().is_empty());
        assert!(!ClaimEdit { purpose: Some("Audit".into()), ..Default::default() }.is_empty());
    }
}
