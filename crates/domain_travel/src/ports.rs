//! Travel Claims Domain Ports
//!
//! Port interfaces for the collaborators the claims core needs but does not
//! implement: durable claim storage with optimistic versioning, a
//! fire-and-forget notification channel and a receipt document store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_travel::ports::ClaimRepository;
//! use std::sync::Arc;
//!
//! let repository: Arc<dyn ClaimRepository> = match config.storage {
//!     Storage::Postgres => Arc::new(PostgresClaimRepository::new(pool)),
//!     Storage::Memory => Arc::new(InMemoryClaimRepository::new()),
//! };
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{
    ClaimId, DomainPort, EmployeeId, HealthCheckable, OperationMetadata, PortError, Versioned,
};

use crate::claim::{ClaimStatus, ReceiptRef, TravelClaim};
use crate::events::ClaimEvent;

/// Query parameters for listing claims
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimQuery {
    pub employee_id: Option<EmployeeId>,
    pub department: Option<String>,
    /// Any of these statuses; empty means all
    pub statuses: Vec<ClaimStatus>,
    /// Claims whose travel period overlaps `[travel_from, travel_to]`
    pub travel_from: Option<NaiveDate>,
    pub travel_to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ClaimQuery {
    pub fn by_employee(employee_id: EmployeeId) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }

    pub fn by_status(status: ClaimStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Default::default()
        }
    }

    /// Submitted and under review
    pub fn pending_review() -> Self {
        Self {
            statuses: vec![ClaimStatus::Submitted, ClaimStatus::UnderReview],
            ..Default::default()
        }
    }

    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn travelling_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.travel_from = from;
        self.travel_to = to;
        self
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Query without pagination, for aggregates over the whole match set
    pub fn unpaginated(mut self) -> Self {
        self.limit = None;
        self.offset = None;
        self
    }

    /// Evaluates the filters, ignoring pagination
    pub fn matches(&self, claim: &TravelClaim) -> bool {
        if let Some(employee_id) = self.employee_id {
            if claim.employee_id != employee_id {
                return false;
            }
        }
        if let Some(ref department) = self.department {
            if !claim.department.eq_ignore_ascii_case(department) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&claim.status) {
            return false;
        }
        if let Some(from) = self.travel_from {
            if claim.travel_dates.end < from {
                return false;
            }
        }
        if let Some(to) = self.travel_to {
            if claim.travel_dates.start > to {
                return false;
            }
        }
        true
    }
}

/// Durable claim storage keyed by claim id
///
/// Every stored claim carries a version that starts at 1 and grows by one
/// per successful write. Writes based on a stale version fail with
/// `PortError::Conflict` and change nothing.
#[async_trait]
pub trait ClaimRepository: DomainPort + HealthCheckable {
    /// Stores a new claim at version 1
    ///
    /// Returns `PortError::Duplicate` if the id is already taken.
    async fn insert(
        &self,
        claim: &TravelClaim,
        metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError>;

    /// Retrieves a claim with its current version, or `PortError::NotFound`
    async fn get(
        &self,
        id: ClaimId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError>;

    /// Replaces a claim if its stored version equals `expected_version`
    async fn update(
        &self,
        claim: &TravelClaim,
        expected_version: u64,
        metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError>;

    /// Removes a claim if its stored version equals `expected_version`
    async fn delete(
        &self,
        id: ClaimId,
        expected_version: u64,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Lists matching claims, newest first
    async fn list(
        &self,
        query: ClaimQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Versioned<TravelClaim>>, PortError>;
}

/// Fire-and-forget notification channel for claim events
///
/// A failed notification never undoes the write that produced the event.
#[async_trait]
pub trait ClaimNotifier: DomainPort {
    async fn notify(&self, event: &ClaimEvent) -> Result<(), PortError>;
}

/// A receipt document on its way to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptUpload {
    pub claim_id: ClaimId,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Receipt document storage
///
/// The claims core only ever holds the returned [`ReceiptRef`].
#[async_trait]
pub trait ReceiptStore: DomainPort {
    async fn store(&self, upload: ReceiptUpload) -> Result<ReceiptRef, PortError>;

    /// Removing an unknown receipt is not an error
    async fn remove(&self, receipt: &ReceiptRef) -> Result<(), PortError>;
}
