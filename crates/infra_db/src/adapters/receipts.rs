//! PostgreSQL Receipt Store
//!
//! Keeps receipt documents in the same database as the claims, so every
//! server instance sees the same documents and they outlive a restart.
//! Deleting a claim row removes its documents through the foreign key.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, PortError, ReceiptId};
use domain_travel::{ReceiptRef, ReceiptStore, ReceiptUpload};

use crate::repositories::receipts::{ReceiptDocumentRepository, ReceiptDocumentRow};

/// URI scheme of receipts held by this store
pub const RECEIPT_URI_SCHEME: &str = "pg";

/// PostgreSQL-backed implementation of the `ReceiptStore` port
#[derive(Debug, Clone)]
pub struct PostgresReceiptStore {
    repository: ReceiptDocumentRepository,
}

impl PostgresReceiptStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReceiptDocumentRepository::new(pool),
        }
    }

    /// Reads a stored document back
    pub async fn content(&self, id: ReceiptId) -> Result<Vec<u8>, PortError> {
        let row = self.repository.get_by_id(*id.as_uuid()).await?;
        Ok(row.content)
    }

    /// References to every document stored for a claim
    pub async fn receipts_for(&self, claim_id: ClaimId) -> Result<Vec<ReceiptRef>, PortError> {
        let rows = self.repository.find_by_claim(*claim_id.as_uuid()).await?;
        Ok(rows.iter().map(receipt_ref).collect())
    }
}

impl DomainPort for PostgresReceiptStore {}

#[async_trait]
impl ReceiptStore for PostgresReceiptStore {
    #[instrument(skip(self, upload), fields(claim_id = %upload.claim_id, size = upload.bytes.len()))]
    async fn store(&self, upload: ReceiptUpload) -> Result<ReceiptRef, PortError> {
        if upload.file_name.trim().is_empty() {
            return Err(PortError::transformation("receipt file name is empty"));
        }
        let size_bytes = i64::try_from(upload.bytes.len())
            .map_err(|_| PortError::transformation("receipt document too large"))?;

        let row = ReceiptDocumentRow {
            receipt_id: *ReceiptId::new_v7().as_uuid(),
            claim_id: *upload.claim_id.as_uuid(),
            file_name: upload.file_name,
            content_type: upload.content_type,
            content: upload.bytes,
            size_bytes,
            created_at: Utc::now(),
        };
        let stored = self.repository.insert(&row).await?;
        debug!(receipt_id = %stored.receipt_id, "Receipt stored");
        Ok(receipt_ref(&stored))
    }

    #[instrument(skip(self, receipt), fields(receipt_id = %receipt.id))]
    async fn remove(&self, receipt: &ReceiptRef) -> Result<(), PortError> {
        let removed = self.repository.delete(*receipt.id.as_uuid()).await?;
        if !removed {
            debug!("Receipt already gone");
        }
        Ok(())
    }
}

fn receipt_ref(row: &ReceiptDocumentRow) -> ReceiptRef {
    ReceiptRef {
        id: ReceiptId::from_uuid(row.receipt_id),
        file_name: row.file_name.clone(),
        content_type: row.content_type.clone(),
        uri: format!("{RECEIPT_URI_SCHEME}://receipts/{}/{}", row.claim_id, row.receipt_id),
    }
}
