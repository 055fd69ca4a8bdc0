//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{DateRange, ReceiptId, Versioned};
use domain_travel::{
    ClaimEdit, ClaimEngine, ClaimError, ClaimStatus, ClaimSummary, CostBreakdown, ReceiptRef,
    TransportMode, TravelClaim,
};

/// Travel period as sent by the claim form
pub fn travel_dates(from: NaiveDate, to: NaiveDate) -> Result<DateRange, ClaimError> {
    DateRange::new(from, to).map_err(|_| ClaimError::InvalidRange { from, to })
}

pub fn transport_mode(name: &str) -> Result<TransportMode, ClaimError> {
    name.parse()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    #[validate(length(min = 1, max = 200))]
    pub employee_name: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    pub travel_from: NaiveDate,
    pub travel_to: NaiveDate,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub purpose: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub origin: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub destination: String,
    pub transport_mode: String,
    pub distance_km: Decimal,
    #[validate(length(max = 2000))]
    pub remarks: Option<String>,
    /// Submit straight away instead of saving a draft
    #[serde(default)]
    pub submit: bool,
}

/// Patch for a draft; absent fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClaimRequest {
    /// Version the client last read
    pub version: Option<u64>,
    pub travel_from: Option<NaiveDate>,
    pub travel_to: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub purpose: Option<String>,
    #[validate(length(max = 200))]
    pub origin: Option<String>,
    #[validate(length(max = 200))]
    pub destination: Option<String>,
    pub transport_mode: Option<String>,
    pub distance_km: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub remarks: Option<String>,
    #[serde(default)]
    pub remove_receipts: Vec<Uuid>,
}

impl UpdateClaimRequest {
    /// Converts the patch, filling a half-given period from the stored claim
    pub fn into_edit(self, current: &TravelClaim) -> Result<ClaimEdit, ClaimError> {
        let travel_dates = match (self.travel_from, self.travel_to) {
            (None, None) => None,
            (from, to) => Some(travel_dates(
                from.unwrap_or(current.travel_dates.start),
                to.unwrap_or(current.travel_dates.end),
            )?),
        };

        Ok(ClaimEdit {
            travel_dates,
            purpose: self.purpose,
            origin: self.origin,
            destination: self.destination,
            transport_mode: self.transport_mode.as_deref().map(transport_mode).transpose()?,
            distance_km: self.distance_km,
            remarks: self.remarks,
            add_receipts: Vec::new(),
            remove_receipts: self.remove_receipts.into_iter().map(ReceiptId::from_uuid).collect(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListClaimsQuery {
    pub employee_id: Option<Uuid>,
    pub department: Option<String>,
    /// Comma-separated statuses
    pub status: Option<String>,
    pub travel_from: Option<NaiveDate>,
    pub travel_to: Option<NaiveDate>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListClaimsQuery {
    pub fn statuses(&self) -> Result<Vec<ClaimStatus>, String> {
        self.status
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse)
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub travel_from: NaiveDate,
    pub travel_to: NaiveDate,
    pub transport_mode: String,
    pub distance_km: Decimal,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub days: i64,
    pub daily_allowance: Decimal,
    pub transport_cost: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
}

impl From<CostBreakdown> for QuoteResponse {
    fn from(costs: CostBreakdown) -> Self {
        Self {
            days: costs.days,
            daily_allowance: costs.daily_allowance.amount(),
            transport_cost: costs.transport_cost.amount(),
            total_amount: costs.total.amount(),
            currency: costs.total.currency().code().to_string(),
        }
    }
}

/// Optimistic concurrency token for actions without a body
#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    pub version: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewRequest {
    pub version: Option<u64>,
    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptQuery {
    pub file_name: String,
    pub version: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub uri: String,
}

impl From<&ReceiptRef> for ReceiptResponse {
    fn from(receipt: &ReceiptRef) -> Self {
        Self {
            id: *receipt.id.as_uuid(),
            file_name: receipt.file_name.clone(),
            content_type: receipt.content_type.clone(),
            uri: receipt.uri.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub version: u64,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub department: String,
    pub travel_from: NaiveDate,
    pub travel_to: NaiveDate,
    pub days: i64,
    pub purpose: String,
    pub origin: String,
    pub destination: String,
    pub transport_mode: TransportMode,
    pub distance_km: Decimal,
    pub daily_allowance: Decimal,
    pub transport_cost: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: ClaimStatus,
    /// Actions the state machine allows from the current status
    pub allowed_actions: Vec<&'static str>,
    pub receipts: Vec<ReceiptResponse>,
    pub remarks: Option<String>,
    pub admin_notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Versioned<TravelClaim>> for ClaimResponse {
    fn from(stored: Versioned<TravelClaim>) -> Self {
        let claim = stored.value;
        Self {
            id: *claim.id.as_uuid(),
            version: stored.version,
            employee_id: *claim.employee_id.as_uuid(),
            days: claim.days(),
            currency: claim.currency().code().to_string(),
            allowed_actions: ClaimEngine::allowed_actions(claim.status)
                .iter()
                .map(|kind| kind.as_str())
                .collect(),
            receipts: claim.receipts.iter().map(ReceiptResponse::from).collect(),
            employee_name: claim.employee_name,
            department: claim.department,
            travel_from: claim.travel_dates.start,
            travel_to: claim.travel_dates.end,
            purpose: claim.purpose,
            origin: claim.origin,
            destination: claim.destination,
            transport_mode: claim.transport_mode,
            distance_km: claim.distance_km,
            daily_allowance: claim.daily_allowance.amount(),
            transport_cost: claim.transport_cost.amount(),
            total_amount: claim.total_amount.amount(),
            status: claim.status,
            remarks: claim.remarks,
            admin_notes: claim.admin_notes,
            submitted_at: claim.submitted_at,
            reviewed_at: claim.reviewed_at,
            reviewed_by: claim.reviewed_by,
            paid_at: claim.paid_at,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub currency: String,
    pub claim_count: usize,
    pub by_status: std::collections::BTreeMap<ClaimStatus, usize>,
    pub total_claimed: Decimal,
    pub pending_amount: Decimal,
    pub total_approved: Decimal,
    pub total_paid: Decimal,
}

impl From<ClaimSummary> for SummaryResponse {
    fn from(summary: ClaimSummary) -> Self {
        Self {
            currency: summary.currency.code().to_string(),
            claim_count: summary.claim_count,
            by_status: summary.by_status,
            total_claimed: summary.total_claimed.amount(),
            pending_amount: summary.pending_amount.amount(),
            total_approved: summary.total_approved.amount(),
            total_paid: summary.total_paid.amount(),
        }
    }
}
