//! Receipt documents repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const ENTITY: &str = "ReceiptDocument";

const COLUMNS: &str = "receipt_id, claim_id, file_name, content_type, content, size_bytes, created_at";

/// Repository for the `receipt_documents` table
#[derive(Debug, Clone)]
pub struct ReceiptDocumentRepository {
    pool: PgPool,
}

impl ReceiptDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Stores a document; the owning claim row must exist
    pub async fn insert(&self, row: &ReceiptDocumentRow) -> Result<ReceiptDocumentRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO receipt_documents ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, ReceiptDocumentRow>(&sql)
            .bind(row.receipt_id)
            .bind(row.claim_id)
            .bind(&row.file_name)
            .bind(&row.content_type)
            .bind(&row.content)
            .bind(row.size_bytes)
            .bind(row.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    pub async fn get_by_id(&self, receipt_id: Uuid) -> Result<ReceiptDocumentRow, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM receipt_documents WHERE receipt_id = $1");

        sqlx::query_as::<_, ReceiptDocumentRow>(&sql)
            .bind(receipt_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, receipt_id))
    }

    /// Documents of one claim, oldest first
    pub async fn find_by_claim(&self, claim_id: Uuid) -> Result<Vec<ReceiptDocumentRow>, DatabaseError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM receipt_documents WHERE claim_id = $1 ORDER BY created_at, receipt_id"
        );

        sqlx::query_as::<_, ReceiptDocumentRow>(&sql)
            .bind(claim_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Returns whether a row was removed
    pub async fn delete(&self, receipt_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM receipt_documents WHERE receipt_id = $1")
            .bind(receipt_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        Ok(result.rows_affected() > 0)
    }
}

/// Database row for a stored receipt document
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ReceiptDocumentRow {
    pub receipt_id: Uuid,
    pub claim_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}
