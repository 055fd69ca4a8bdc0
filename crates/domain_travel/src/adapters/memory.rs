//! In-memory storage adapters

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{
    ClaimId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
    ReceiptId, Versioned,
};

use crate::claim::{ReceiptRef, TravelClaim};
use crate::ports::{ClaimQuery, ClaimRepository, ReceiptStore, ReceiptUpload};

const ENTITY: &str = "TravelClaim";

/// Claim repository backed by a map behind an async lock
///
/// The version check and the write happen under one write lock, so two
/// concurrent updates from the same version cannot both succeed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryClaimRepository {
    claims: Arc<RwLock<HashMap<ClaimId, Versioned<TravelClaim>>>>,
}

impl InMemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates with claims at version 1
    pub async fn with_claims(claims: Vec<TravelClaim>) -> Self {
        let repository = Self::new();
        {
            let mut map = repository.claims.write().await;
            for claim in claims {
                map.insert(claim.id, Versioned::new(claim, 1));
            }
        }
        repository
    }

    pub async fn len(&self) -> usize {
        self.claims.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.claims.read().await.is_empty()
    }
}

impl DomainPort for InMemoryClaimRepository {}

#[async_trait]
impl HealthCheckable for InMemoryClaimRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-claim-repository")
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn insert(
        &self,
        claim: &TravelClaim,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError> {
        let mut claims = self.claims.write().await;
        if claims.contains_key(&claim.id) {
            return Err(PortError::duplicate(ENTITY, claim.id));
        }
        let stored = Versioned::new(claim.clone(), 1);
        claims.insert(claim.id, stored.clone());
        Ok(stored)
    }

    async fn get(
        &self,
        id: ClaimId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError> {
        self.claims
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found(ENTITY, id))
    }

    async fn update(
        &self,
        claim: &TravelClaim,
        expected_version: u64,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Versioned<TravelClaim>, PortError> {
        let mut claims = self.claims.write().await;
        let current = claims
            .get_mut(&claim.id)
            .ok_or_else(|| PortError::not_found(ENTITY, claim.id))?;
        if current.version != expected_version {
            return Err(PortError::conflict(ENTITY, claim.id, expected_version, current.version));
        }
        *current = Versioned::new(claim.clone(), expected_version + 1);
        Ok(current.clone())
    }

    async fn delete(
        &self,
        id: ClaimId,
        expected_version: u64,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        let current = claims.get(&id).ok_or_else(|| PortError::not_found(ENTITY, id))?;
        if current.version != expected_version {
            return Err(PortError::conflict(ENTITY, id, expected_version, current.version));
        }
        claims.remove(&id);
        Ok(())
    }

    async fn list(
        &self,
        query: ClaimQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Versioned<TravelClaim>>, PortError> {
        let claims = self.claims.read().await;
        let mut results: Vec<_> = claims
            .values()
            .filter(|stored| query.matches(&stored.value))
            .cloned()
            .collect();
        results.sort_by(|a, b| {
            b.value
                .created_at
                .cmp(&a.value.created_at)
                .then_with(|| b.value.id.cmp(&a.value.id))
        });

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(results.into_iter().skip(offset).take(limit).collect())
    }
}

/// Receipt store that keeps documents in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryReceiptStore {
    documents: Arc<RwLock<HashMap<ReceiptId, Vec<u8>>>>,
}

impl InMemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: ReceiptId) -> bool {
        self.documents.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl DomainPort for InMemoryReceiptStore {}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
    async fn store(&self, upload: ReceiptUpload) -> Result<ReceiptRef, PortError> {
        if upload.file_name.trim().is_empty() {
            return Err(PortError::transformation("receipt file name is empty"));
        }
        let id = ReceiptId::new_v7();
        self.documents.write().await.insert(id, upload.bytes);
        Ok(ReceiptRef {
            id,
            uri: format!("memory://receipts/{}/{}", upload.claim_id, id),
            file_name: upload.file_name,
            content_type: upload.content_type,
        })
    }

    async fn remove(&self, receipt: &ReceiptRef) -> Result<(), PortError> {
        self.documents.write().await.remove(&receipt.id);
        Ok(())
    }
}
