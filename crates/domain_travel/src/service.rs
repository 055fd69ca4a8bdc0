//! Claim application service
//!
//! Orchestrates one request: load the stored claim, run the engine, write
//! the result back against the version that was read and notify. The
//! service never retries; a lost race surfaces as
//! [`ClaimError::ConcurrentModification`] and the caller decides whether to
//! reload and try again.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use core_kernel::{ClaimId, DateRange, HealthCheckResult, OperationMetadata, Versioned};

use crate::access::{Actor, Capability};
use crate::claim::{ClaimEdit, NewClaim, TransportMode, TravelClaim};
use crate::engine::{ClaimAction, ClaimEngine};
use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::ports::{ClaimNotifier, ClaimQuery, ClaimRepository, ReceiptStore, ReceiptUpload};
use crate::rates::CostBreakdown;
use crate::summary::ClaimSummary;

/// Application service for travel claims
#[derive(Clone)]
pub struct ClaimService {
    engine: ClaimEngine,
    repository: Arc<dyn ClaimRepository>,
    notifier: Arc<dyn ClaimNotifier>,
    receipts: Arc<dyn ReceiptStore>,
}

impl ClaimService {
    pub fn new(
        engine: ClaimEngine,
        repository: Arc<dyn ClaimRepository>,
        notifier: Arc<dyn ClaimNotifier>,
        receipts: Arc<dyn ReceiptStore>,
    ) -> Self {
        Self {
            engine,
            repository,
            notifier,
            receipts,
        }
    }

    pub fn engine(&self) -> &ClaimEngine {
        &self.engine
    }

    pub async fn health_check(&self) -> HealthCheckResult {
        self.repository.health_check().await
    }

    /// Prices a trip without storing anything
    pub fn quote(
        &self,
        travel_dates: DateRange,
        mode: TransportMode,
        distance_km: Decimal,
    ) -> Result<CostBreakdown, ClaimError> {
        self.engine.quote(travel_dates, mode, distance_km)
    }

    /// Creates a claim, optionally submitting it straight away
    #[instrument(skip(self, new, actor), fields(actor = %actor, employee_id = %new.employee_id))]
    pub async fn create(
        &self,
        new: NewClaim,
        submit: bool,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        let claim = self.engine.create(new, actor, submit, Utc::now())?;
        let stored = self.repository.insert(&claim, Some(metadata(actor))).await?;

        info!(claim_id = %claim.id, status = %claim.status, total = %claim.total_amount, "Claim created");
        self.publish(ClaimEvent::created(&stored.value)).await;
        if submit {
            self.publish(ClaimEvent::ClaimSubmitted {
                claim_id: claim.id,
                employee_id: claim.employee_id,
                total_amount: claim.total_amount,
                timestamp: claim.created_at,
            })
            .await;
        }
        Ok(stored)
    }

    /// Loads a claim the actor is allowed to see
    ///
    /// Claims of other employees are reported as not found to actors
    /// without the view-all capability.
    pub async fn get(&self, id: ClaimId, actor: &Actor) -> Result<Versioned<TravelClaim>, ClaimError> {
        let stored = self.repository.get(id, Some(metadata(actor))).await?;
        if !self.engine.can_view(&stored.value, actor) {
            return Err(ClaimError::ClaimNotFound(id.to_string()));
        }
        Ok(stored)
    }

    /// Lists claims visible to the actor
    pub async fn list(
        &self,
        query: ClaimQuery,
        actor: &Actor,
    ) -> Result<Vec<Versioned<TravelClaim>>, ClaimError> {
        let Some(query) = self.scope(query, actor) else {
            return Ok(Vec::new());
        };
        Ok(self.repository.list(query, Some(metadata(actor))).await?)
    }

    /// Summarises every claim visible to the actor that matches the filters
    pub async fn summary(&self, query: ClaimQuery, actor: &Actor) -> Result<ClaimSummary, ClaimError> {
        let claims = self.list(query.unpaginated(), actor).await?;
        let summary = ClaimSummary::from_claims(
            self.engine.rates().currency(),
            claims.iter().map(|stored| &stored.value),
        )?;
        Ok(summary)
    }

    /// Applies an action to a stored claim
    ///
    /// With `expected_version` set the call fails unless the stored claim is
    /// still at that version. A delete action returns the claim as it was
    /// before removal.
    #[instrument(skip(self, action, actor), fields(claim_id = %id, action = %action.kind(), actor = %actor))]
    pub async fn transition(
        &self,
        id: ClaimId,
        expected_version: Option<u64>,
        action: ClaimAction,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        if matches!(action, ClaimAction::Delete) {
            return self.delete(id, expected_version, actor).await;
        }

        let stored = self.load(id, expected_version, actor).await?;
        let transition = self.engine.transition(&stored.value, action, actor, Utc::now())?;
        let updated = self
            .repository
            .update(&transition.claim, stored.version, Some(metadata(actor)))
            .await?;

        info!(
            from = %transition.previous_status,
            to = %transition.claim.status,
            version = updated.version,
            "Claim transitioned"
        );
        self.publish(ClaimEvent::from_transition(&transition, &actor.user_id)).await;
        Ok(updated)
    }

    pub async fn edit(
        &self,
        id: ClaimId,
        expected_version: Option<u64>,
        edit: ClaimEdit,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        self.transition(id, expected_version, ClaimAction::Edit(edit), actor).await
    }

    pub async fn submit(&self, id: ClaimId, actor: &Actor) -> Result<Versioned<TravelClaim>, ClaimError> {
        self.transition(id, None, ClaimAction::Submit, actor).await
    }

    pub async fn start_review(&self, id: ClaimId, actor: &Actor) -> Result<Versioned<TravelClaim>, ClaimError> {
        self.transition(id, None, ClaimAction::StartReview, actor).await
    }

    pub async fn approve(
        &self,
        id: ClaimId,
        admin_notes: Option<String>,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        self.transition(id, None, ClaimAction::Approve { admin_notes }, actor).await
    }

    pub async fn reject(
        &self,
        id: ClaimId,
        admin_notes: Option<String>,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        self.transition(id, None, ClaimAction::Reject { admin_notes }, actor).await
    }

    pub async fn mark_paid(&self, id: ClaimId, actor: &Actor) -> Result<Versioned<TravelClaim>, ClaimError> {
        self.transition(id, None, ClaimAction::MarkPaid, actor).await
    }

    /// Deletes a draft and, best effort, its receipt documents
    ///
    /// Returns the claim as it was before deletion.
    #[instrument(skip(self, actor), fields(claim_id = %id, actor = %actor))]
    pub async fn delete(
        &self,
        id: ClaimId,
        expected_version: Option<u64>,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        let stored = self.load(id, expected_version, actor).await?;
        self.engine.delete(&stored.value, actor)?;
        self.repository
            .delete(id, stored.version, Some(metadata(actor)))
            .await?;

        for receipt in &stored.value.receipts {
            if let Err(error) = self.receipts.remove(receipt).await {
                warn!(receipt_id = %receipt.id, %error, "Failed to remove receipt of deleted claim");
            }
        }

        info!("Claim deleted");
        self.publish(ClaimEvent::deleted(&stored.value, Utc::now())).await;
        Ok(stored)
    }

    /// Stores a receipt document and attaches it to a draft
    ///
    /// The claim is checked for editability before the document is stored.
    /// If the claim write fails afterwards the document is removed again.
    #[instrument(skip(self, file_name, content_type, bytes, actor), fields(claim_id = %id, size = bytes.len(), actor = %actor))]
    pub async fn attach_receipt(
        &self,
        id: ClaimId,
        expected_version: Option<u64>,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        let stored = self.load(id, expected_version, actor).await?;
        self.engine.ensure_editable(&stored.value, actor)?;

        let receipt = self
            .receipts
            .store(ReceiptUpload {
                claim_id: id,
                file_name,
                content_type,
                bytes,
            })
            .await?;
        debug!(receipt_id = %receipt.id, uri = %receipt.uri, "Receipt stored");

        let written = async {
            let transition = self.engine.edit(
                &stored.value,
                ClaimEdit::attach(receipt.clone()),
                actor,
                Utc::now(),
            )?;
            let updated = self
                .repository
                .update(&transition.claim, stored.version, Some(metadata(actor)))
                .await?;
            Ok::<_, ClaimError>((transition, updated))
        }
        .await;

        match written {
            Ok((transition, updated)) => {
                self.publish(ClaimEvent::from_transition(&transition, &actor.user_id)).await;
                Ok(updated)
            }
            Err(error) => {
                if let Err(cleanup) = self.receipts.remove(&receipt).await {
                    warn!(receipt_id = %receipt.id, error = %cleanup, "Failed to remove orphaned receipt");
                }
                Err(error)
            }
        }
    }

    async fn load(
        &self,
        id: ClaimId,
        expected_version: Option<u64>,
        actor: &Actor,
    ) -> Result<Versioned<TravelClaim>, ClaimError> {
        let stored = self.repository.get(id, Some(metadata(actor))).await?;
        if let Some(expected) = expected_version {
            if expected != stored.version {
                return Err(ClaimError::ConcurrentModification {
                    claim_id: id.to_string(),
                    expected,
                    actual: stored.version,
                });
            }
        }
        Ok(stored)
    }

    /// Restricts a query to the claims the actor may see; `None` when that
    /// is no claim at all
    fn scope(&self, mut query: ClaimQuery, actor: &Actor) -> Option<ClaimQuery> {
        if self.engine.access().allows(actor, Capability::ViewAllClaims) {
            return Some(query);
        }
        let own = actor.employee_id?;
        match query.employee_id {
            Some(requested) if requested != own => None,
            _ => {
                query.employee_id = Some(own);
                Some(query)
            }
        }
    }

    async fn publish(&self, event: ClaimEvent) {
        if let Err(error) = self.notifier.notify(&event).await {
            warn!(
                event_type = event.event_type(),
                claim_id = %event.claim_id(),
                %error,
                "Claim notification failed"
            );
        }
    }
}

fn metadata(actor: &Actor) -> OperationMetadata {
    OperationMetadata::default().initiated_by(actor.user_id.clone())
}
