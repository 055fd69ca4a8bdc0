//! Domain events for the travel claim aggregate
//!
//! Events are produced by the service after a write has been stored and
//! handed to the [`ClaimNotifier`](crate::ports::ClaimNotifier). They are
//! used for:
//! - Status-change alerts to employees and reviewers
//! - Audit trails

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, EmployeeId, Money};

use crate::claim::{ClaimStatus, TravelClaim};
use crate::engine::{ActionKind, ClaimTransition};

/// Domain events emitted by the travel claim aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClaimEvent {
    /// A claim has been created
    ClaimCreated {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        status: ClaimStatus,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A draft has been edited by its owner
    ClaimEdited {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A claim has been handed in for review
    ClaimSubmitted {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A reviewer has picked up the claim
    ReviewStarted {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        reviewer: String,
        timestamp: DateTime<Utc>,
    },

    /// The claim has been approved for payment
    ClaimApproved {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        reviewer: String,
        admin_notes: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// The claim has been rejected
    ClaimRejected {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        reviewer: String,
        admin_notes: String,
        timestamp: DateTime<Utc>,
    },

    /// The claim amount has been disbursed
    ClaimPaid {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A draft has been removed
    ClaimDeleted {
        claim_id: ClaimId,
        employee_id: EmployeeId,
        timestamp: DateTime<Utc>,
    },
}

impl ClaimEvent {
    pub fn created(claim: &TravelClaim) -> Self {
        ClaimEvent::ClaimCreated {
            claim_id: claim.id,
            employee_id: claim.employee_id,
            status: claim.status,
            total_amount: claim.total_amount,
            timestamp: claim.created_at,
        }
    }

    pub fn deleted(claim: &TravelClaim, timestamp: DateTime<Utc>) -> Self {
        ClaimEvent::ClaimDeleted {
            claim_id: claim.id,
            employee_id: claim.employee_id,
            timestamp,
        }
    }

    /// Builds the event for a stored transition; `actor` is the acting user
    pub fn from_transition(transition: &ClaimTransition, actor: &str) -> Self {
        let claim = &transition.claim;
        let claim_id = claim.id;
        let employee_id = claim.employee_id;
        let timestamp = claim.updated_at;

        match transition.action {
            ActionKind::Submit => ClaimEvent::ClaimSubmitted {
                claim_id,
                employee_id,
                total_amount: claim.total_amount,
                timestamp,
            },
            ActionKind::StartReview => ClaimEvent::ReviewStarted {
                claim_id,
                employee_id,
                reviewer: actor.to_string(),
                timestamp,
            },
            ActionKind::Approve => ClaimEvent::ClaimApproved {
                claim_id,
                employee_id,
                reviewer: actor.to_string(),
                admin_notes: claim.admin_notes.clone(),
                timestamp,
            },
            ActionKind::Reject => ClaimEvent::ClaimRejected {
                claim_id,
                employee_id,
                reviewer: actor.to_string(),
                admin_notes: claim.admin_notes.clone().unwrap_or_default(),
                timestamp,
            },
            ActionKind::MarkPaid => ClaimEvent::ClaimPaid {
                claim_id,
                employee_id,
                amount: claim.total_amount,
                timestamp,
            },
            ActionKind::Delete => ClaimEvent::ClaimDeleted {
                claim_id,
                employee_id,
                timestamp,
            },
            ActionKind::Create => ClaimEvent::created(claim),
            ActionKind::Edit => ClaimEvent::ClaimEdited {
                claim_id,
                employee_id,
                total_amount: claim.total_amount,
                timestamp,
            },
        }
    }

    pub fn claim_id(&self) -> ClaimId {
        match self {
            ClaimEvent::ClaimCreated { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimEdited { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimSubmitted { claim_id, .. } => *claim_id,
            ClaimEvent::ReviewStarted { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimApproved { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimRejected { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimPaid { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimDeleted { claim_id, .. } => *claim_id,
        }
    }

    /// The employee the claim belongs to, i.e. who gets alerted
    pub fn employee_id(&self) -> EmployeeId {
        match self {
            ClaimEvent::ClaimCreated { employee_id, .. } => *employee_id,
            ClaimEvent::ClaimEdited { employee_id, .. } => *employee_id,
            ClaimEvent::ClaimSubmitted { employee_id, .. } => *employee_id,
            ClaimEvent::ReviewStarted { employee_id, .. } => *employee_id,
            ClaimEvent::ClaimApproved { employee_id, .. } => *employee_id,
            ClaimEvent::ClaimRejected { employee_id, .. } => *employee_id,
            ClaimEvent::ClaimPaid { employee_id, .. } => *employee_id,
            ClaimEvent::ClaimDeleted { employee_id, .. } => *employee_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::ClaimCreated { timestamp, .. } => *timestamp,
            ClaimEvent::ClaimEdited { timestamp, .. } => *timestamp,
            ClaimEvent::ClaimSubmitted { timestamp, .. } => *timestamp,
            ClaimEvent::ReviewStarted { timestamp, .. } => *timestamp,
            ClaimEvent::ClaimApproved { timestamp, .. } => *timestamp,
            ClaimEvent::ClaimRejected { timestamp, .. } => *timestamp,
            ClaimEvent::ClaimPaid { timestamp, .. } => *timestamp,
            ClaimEvent::ClaimDeleted { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::ClaimCreated { .. } => "ClaimCreated",
            ClaimEvent::ClaimEdited { .. } => "ClaimEdited",
            ClaimEvent::ClaimSubmitted { .. } => "ClaimSubmitted",
            ClaimEvent::ReviewStarted { .. } => "ReviewStarted",
            ClaimEvent::ClaimApproved { .. } => "ClaimApproved",
            ClaimEvent::ClaimRejected { .. } => "ClaimRejected",
            ClaimEvent::ClaimPaid { .. } => "ClaimPaid",
            ClaimEvent::ClaimDeleted { .. } => "ClaimDeleted",
        }
    }

    /// True for events that move a claim to another status
    pub fn is_status_change(&self) -> bool {
        !matches!(
            self,
            ClaimEvent::ClaimCreated { .. } | ClaimEvent::ClaimEdited { .. } | ClaimEvent::ClaimDeleted { .. }
        )
    }
}
