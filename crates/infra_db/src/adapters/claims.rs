//! PostgreSQL Claim Adapter
//!
//! Implements the `ClaimRepository` port on top of [`TravelClaimRepository`],
//! converting rows to domain claims and database errors to port errors:
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - `DatabaseError::VersionConflict` -> `PortError::Conflict`
//! - connection failures -> `PortError::Connection`
//! - other errors -> `PortError::Internal`

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ClaimId, Currency, DateRange, DomainPort, EmployeeId, HealthCheckResult,
    HealthCheckable, Money, OperationMetadata, PortError, Versioned,
};
use domain_travel::{ClaimQuery, ClaimRepository, TravelClaim};

use crate::repositories::claims::{TravelClaimRepository, TravelClaimRow};

/// PostgreSQL-backed implementation of the `ClaimRepository` port
#[derive(Debug, Clone)]
pub struct PostgresClaimRepository {
    repository: TravelClaimRepository,
}

impl PostgresClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TravelClaimRepository::new(pool),
        }
    }

    /// The underlying row-level repository
    pub fn repository(&self) -> &TravelClaimRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClaimRepository {}

#[async_trait]
impl HealthCheckable for PostgresClaimRepository {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.repository.pool())
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-claim-repository".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-claim-repository".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ClaimRepository for PostgresClaimRepository {
    #[instrument(skip(self, claim, metadata), fields(claim_id = %claim.id))]
    async fn insert(
        &self,
        claim: &TravelClaim,
        metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError> {
        debug!(initiated_by = ?metadata.and_then(|m| m.initiated_by), "Inserting claim");
        let row = self.repository.insert(&claim_to_row(claim)).await?;
        row_to_claim(row)
    }

    #[instrument(skip(self, _metadata), fields(claim_id = %id))]
    async fn get(
        &self,
        id: ClaimId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError> {
        let row = self.repository.get_by_id(*id.as_uuid()).await?;
        row_to_claim(row)
    }

    #[instrument(skip(self, claim, metadata), fields(claim_id = %claim.id))]
    async fn update(
        &self,
        claim: &TravelClaim,
        expected_version: u64,
        metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError> {
        debug!(initiated_by = ?metadata.and_then(|m| m.initiated_by), "Updating claim");
        let row = self
            .repository
            .update(&claim_to_row(claim), version_to_db(claim.id, expected_version)?)
            .await?;
        row_to_claim(row)
    }

    #[instrument(skip(self, _metadata), fields(claim_id = %id))]
    async fn delete(
        &self,
        id: ClaimId,
        expected_version: u64,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.repository
            .delete(*id.as_uuid(), version_to_db(id, expected_version)?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, _metadata))]
    async fn list(
        &self,
        query: ClaimQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Versioned<TravelClaim>>, PortError> {
        let rows = self.repository.find(&query).await?;
        debug!(count = rows.len(), "Claims listed");
        rows.into_iter().map(row_to_claim).collect()
    }
}

fn version_to_db(id: ClaimId, version: u64) -> Result<i64, PortError> {
    i64::try_from(version)
        .map_err(|_| PortError::transformation(format!("claim {id}: version {version} out of range")))
}

/// Converts a domain claim to a row; the version column is set by the
/// database
fn claim_to_row(claim: &TravelClaim) -> TravelClaimRow {
    TravelClaimRow {
        claim_id: *claim.id.as_uuid(),
        employee_id: *claim.employee_id.as_uuid(),
        employee_name: claim.employee_name.clone(),
        department: claim.department.clone(),
        travel_from: claim.travel_dates.start,
        travel_to: claim.travel_dates.end,
        purpose: claim.purpose.clone(),
        origin: claim.origin.clone(),
        destination: claim.destination.clone(),
        transport_mode: claim.transport_mode.into(),
        distance_km: claim.distance_km,
        daily_allowance: claim.daily_allowance.amount(),
        transport_cost: claim.transport_cost.amount(),
        total_amount: claim.total_amount.amount(),
        currency: claim.currency().code().to_string(),
        status: claim.status.into(),
        receipts: Json(claim.receipts.clone()),
        remarks: claim.remarks.clone(),
        admin_notes: claim.admin_notes.clone(),
        submitted_at: claim.submitted_at,
        reviewed_at: claim.reviewed_at,
        reviewed_by: claim.reviewed_by.clone(),
        paid_at: claim.paid_at,
        created_at: claim.created_at,
        updated_at: claim.updated_at,
        version: 0,
    }
}

/// Converts a database row to a versioned domain claim
fn row_to_claim(row: TravelClaimRow) -> Result<Versioned<TravelClaim>, PortError> {
    let currency: Currency = row
        .currency
        .trim()
        .parse()
        .map_err(|e| PortError::transformation(format!("claim {}: {}", row.claim_id, e)))?;
    let travel_dates = DateRange::new(row.travel_from, row.travel_to)
        .map_err(|e| PortError::transformation(format!("claim {}: {}", row.claim_id, e)))?;
    let version = u64::try_from(row.version)
        .map_err(|_| PortError::transformation(format!("claim {}: negative version", row.claim_id)))?;

    let claim = TravelClaim {
        id: ClaimId::from_uuid(row.claim_id),
        employee_id: EmployeeId::from_uuid(row.employee_id),
        employee_name: row.employee_name,
        department: row.department,
        travel_dates,
        purpose: row.purpose,
        origin: row.origin,
        destination: row.destination,
        transport_mode: row.transport_mode.into(),
        distance_km: row.distance_km,
        daily_allowance: Money::new(row.daily_allowance, currency),
        transport_cost: Money::new(row.transport_cost, currency),
        total_amount: Money::new(row.total_amount, currency),
        status: row.status.into(),
        receipts: row.receipts.0,
        remarks: row.remarks,
        admin_notes: row.admin_notes,
        submitted_at: row.submitted_at,
        reviewed_at: row.reviewed_at,
        reviewed_by: row.reviewed_by,
        paid_at: row.paid_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Versioned::new(claim, version))
}
