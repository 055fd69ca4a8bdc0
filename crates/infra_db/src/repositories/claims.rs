//! Travel claims repository
//!
//! Row-level access to the `travel_claims` table. Every write checks the
//! `version` column in the same statement that changes the row, so a
//! stale write changes nothing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domain_travel::{ClaimQuery, ClaimStatus, ReceiptRef, TransportMode};

use crate::error::DatabaseError;

const ENTITY: &str = "TravelClaim";

const COLUMNS: &str = "claim_id, employee_id, employee_name, department, travel_from, travel_to, \
    purpose, origin, destination, transport_mode, distance_km, daily_allowance, transport_cost, \
    total_amount, currency, status, receipts, remarks, admin_notes, submitted_at, reviewed_at, \
    reviewed_by, paid_at, created_at, updated_at, version";

/// Repository for the `travel_claims` table
#[derive(Debug, Clone)]
pub struct TravelClaimRepository {
    pool: PgPool,
}

impl TravelClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a new claim at version 1
    pub async fn insert(&self, row: &TravelClaimRow) -> Result<TravelClaimRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO travel_claims ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, 1)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, TravelClaimRow>(&sql)
            .bind(row.claim_id)
            .bind(row.employee_id)
            .bind(&row.employee_name)
            .bind(&row.department)
            .bind(row.travel_from)
            .bind(row.travel_to)
            .bind(&row.purpose)
            .bind(&row.origin)
            .bind(&row.destination)
            .bind(row.transport_mode)
            .bind(row.distance_km)
            .bind(row.daily_allowance)
            .bind(row.transport_cost)
            .bind(row.total_amount)
            .bind(&row.currency)
            .bind(row.status)
            .bind(&row.receipts)
            .bind(&row.remarks)
            .bind(&row.admin_notes)
            .bind(row.submitted_at)
            .bind(row.reviewed_at)
            .bind(&row.reviewed_by)
            .bind(row.paid_at)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Retrieves a claim by its identifier
    pub async fn get_by_id(&self, claim_id: Uuid) -> Result<TravelClaimRow, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM travel_claims WHERE claim_id = $1");

        sqlx::query_as::<_, TravelClaimRow>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, claim_id))
    }

    /// Replaces the mutable columns if the row is still at `expected_version`
    ///
    /// Identity columns (`employee_id`, `employee_name`, `department`,
    /// `created_at`) are never rewritten.
    pub async fn update(
        &self,
        row: &TravelClaimRow,
        expected_version: i64,
    ) -> Result<TravelClaimRow, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE travel_claims SET
                travel_from = $3,
                travel_to = $4,
                purpose = $5,
                origin = $6,
                destination = $7,
                transport_mode = $8,
                distance_km = $9,
                daily_allowance = $10,
                transport_cost = $11,
                total_amount = $12,
                currency = $13,
                status = $14,
                receipts = $15,
                remarks = $16,
                admin_notes = $17,
                submitted_at = $18,
                reviewed_at = $19,
                reviewed_by = $20,
                paid_at = $21,
                updated_at = $22,
                version = version + 1
            WHERE claim_id = $1 AND version = $2
            RETURNING {COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, TravelClaimRow>(&sql)
            .bind(row.claim_id)
            .bind(expected_version)
            .bind(row.travel_from)
            .bind(row.travel_to)
            .bind(&row.purpose)
            .bind(&row.origin)
            .bind(&row.destination)
            .bind(row.transport_mode)
            .bind(row.distance_km)
            .bind(row.daily_allowance)
            .bind(row.transport_cost)
            .bind(row.total_amount)
            .bind(&row.currency)
            .bind(row.status)
            .bind(&row.receipts)
            .bind(&row.remarks)
            .bind(&row.admin_notes)
            .bind(row.submitted_at)
            .bind(row.reviewed_at)
            .bind(&row.reviewed_by)
            .bind(row.paid_at)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;

        match updated {
            Some(row) => Ok(row),
            None => Err(self.write_miss(row.claim_id, expected_version).await),
        }
    }

    /// Deletes a claim if it is still at `expected_version`
    pub async fn delete(&self, claim_id: Uuid, expected_version: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM travel_claims WHERE claim_id = $1 AND version = $2")
            .bind(claim_id)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;

        if result.rows_affected() == 0 {
            return Err(self.write_miss(claim_id, expected_version).await);
        }
        Ok(())
    }

    /// Finds claims matching the query, newest first
    pub async fn find(&self, query: &ClaimQuery) -> Result<Vec<TravelClaimRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM travel_claims WHERE TRUE"));

        if let Some(employee_id) = query.employee_id {
            builder.push(" AND employee_id = ").push_bind(Uuid::from(employee_id));
        }
        if let Some(ref department) = query.department {
            builder
                .push(" AND lower(department) = lower(")
                .push_bind(department.clone())
                .push(")");
        }
        if !query.statuses.is_empty() {
            let statuses: Vec<String> = query.statuses.iter().map(|s| s.as_str().to_string()).collect();
            builder.push(" AND status::text = ANY(").push_bind(statuses).push(")");
        }
        if let Some(from) = query.travel_from {
            builder.push(" AND travel_to >= ").push_bind(from);
        }
        if let Some(to) = query.travel_to {
            builder.push(" AND travel_from <= ").push_bind(to);
        }

        builder.push(" ORDER BY created_at DESC, claim_id DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ").push_bind(i64::from(offset));
        }

        builder
            .build_query_as::<TravelClaimRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Explains why a versioned write touched no row
    async fn write_miss(&self, claim_id: Uuid, expected_version: i64) -> DatabaseError {
        let current = sqlx::query_scalar::<_, i64>("SELECT version FROM travel_claims WHERE claim_id = $1")
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await;

        match current {
            Ok(Some(actual)) => DatabaseError::VersionConflict {
                entity: ENTITY,
                id: claim_id.to_string(),
                expected: expected_version.max(0) as u64,
                actual: actual.max(0) as u64,
            },
            Ok(None) => DatabaseError::not_found(ENTITY, claim_id),
            Err(e) => DatabaseError::classify(e),
        }
    }
}

/// Database row for a travel claim
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TravelClaimRow {
    pub claim_id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub department: String,
    pub travel_from: NaiveDate,
    pub travel_to: NaiveDate,
    pub purpose: String,
    pub origin: String,
    pub destination: String,
    pub transport_mode: DbTransportMode,
    pub distance_km: Decimal,
    pub daily_allowance: Decimal,
    pub transport_cost: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: DbClaimStatus,
    pub receipts: Json<Vec<ReceiptRef>>,
    pub remarks: Option<String>,
    pub admin_notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Claim status enum matching database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "snake_case")]
pub enum DbClaimStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Paid,
}

impl From<ClaimStatus> for DbClaimStatus {
    fn from(status: ClaimStatus) -> Self {
        match status {
            ClaimStatus::Draft => DbClaimStatus::Draft,
            ClaimStatus::Submitted => DbClaimStatus::Submitted,
            ClaimStatus::UnderReview => DbClaimStatus::UnderReview,
            ClaimStatus::Approved => DbClaimStatus::Approved,
            ClaimStatus::Rejected => DbClaimStatus::Rejected,
            ClaimStatus::Paid => DbClaimStatus::Paid,
        }
    }
}

impl From<DbClaimStatus> for ClaimStatus {
    fn from(status: DbClaimStatus) -> Self {
        match status {
            DbClaimStatus::Draft => ClaimStatus::Draft,
            DbClaimStatus::Submitted => ClaimStatus::Submitted,
            DbClaimStatus::UnderReview => ClaimStatus::UnderReview,
            DbClaimStatus::Approved => ClaimStatus::Approved,
            DbClaimStatus::Rejected => ClaimStatus::Rejected,
            DbClaimStatus::Paid => ClaimStatus::Paid,
        }
    }
}

/// Transport mode enum matching database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transport_mode", rename_all = "snake_case")]
pub enum DbTransportMode {
    Flight,
    Train,
    Bus,
    Car,
}

impl From<TransportMode> for DbTransportMode {
    fn from(mode: TransportMode) -> Self {
        match mode {
            TransportMode::Flight => DbTransportMode::Flight,
            TransportMode::Train => DbTransportMode::Train,
            TransportMode::Bus => DbTransportMode::Bus,
            TransportMode::Car => DbTransportMode::Car,
        }
    }
}

impl From<DbTransportMode> for TransportMode {
    fn from(mode: DbTransportMode) -> Self {
        match mode {
            DbTransportMode::Flight => TransportMode::Flight,
            DbTransportMode::Train => TransportMode::Train,
            DbTransportMode::Bus => TransportMode::Bus,
            DbTransportMode::Car => TransportMode::Car,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_is_lossless() {
        for status in ClaimStatus::ALL {
            assert_eq!(ClaimStatus::from(DbClaimStatus::from(status)), status);
        }
    }

    #[test]
    fn test_mode_mapping_is_lossless() {
        for mode in TransportMode::ALL {
            assert_eq!(TransportMode::from(DbTransportMode::from(mode)), mode);
        }
    }
}
