//! Claim engine: cost derivation and the approval state machine
//!
//! Every operation takes the current claim by reference and returns a new
//! claim value, so a failed call leaves the caller's claim untouched and
//! re-applying an action to the same starting claim with the same `at`
//! timestamp yields the same result. Persisting the result is the caller's
//! job.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DateRange, Money};

use crate::access::{AccessPolicy, Actor, Capability};
use crate::claim::{ClaimEdit, ClaimStatus, NewClaim, TransportMode, TravelClaim};
use crate::error::ClaimError;
use crate::rates::{CostBreakdown, RateConfig};
use crate::validation::{require_admin_notes, validate_for_submission};

/// The kind of an action, used in errors and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Edit,
    Submit,
    Delete,
    StartReview,
    Approve,
    Reject,
    MarkPaid,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Edit => "edit",
            ActionKind::Submit => "submit",
            ActionKind::Delete => "delete",
            ActionKind::StartReview => "start_review",
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
            ActionKind::MarkPaid => "mark_paid",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action requested on an existing claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClaimAction {
    Edit(ClaimEdit),
    Submit,
    Delete,
    StartReview,
    Approve { admin_notes: Option<String> },
    Reject { admin_notes: Option<String> },
    MarkPaid,
}

impl ClaimAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            ClaimAction::Edit(_) => ActionKind::Edit,
            ClaimAction::Submit => ActionKind::Submit,
            ClaimAction::Delete => ActionKind::Delete,
            ClaimAction::StartReview => ActionKind::StartReview,
            ClaimAction::Approve { .. } => ActionKind::Approve,
            ClaimAction::Reject { .. } => ActionKind::Reject,
            ClaimAction::MarkPaid => ActionKind::MarkPaid,
        }
    }
}

/// A timestamp or identity field set by a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldChange {
    SubmittedAt(DateTime<Utc>),
    ReviewedAt(DateTime<Utc>),
    ReviewedBy(String),
    PaidAt(DateTime<Utc>),
    AdminNotes(String),
}

/// Result of a successful action on a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimTransition {
    pub claim: TravelClaim,
    pub previous_status: ClaimStatus,
    pub action: ActionKind,
    /// Fields newly set by this action
    pub changes: Vec<FieldChange>,
}

impl ClaimTransition {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.claim.status
    }
}

/// Outcome of [`ClaimEngine::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Updated(ClaimTransition),
    /// The draft may be removed from storage
    Deleted(ClaimId),
}

/// Stateless claim engine parameterised by rates and access policy
#[derive(Debug, Clone, Default)]
pub struct ClaimEngine {
    rates: RateConfig,
    access: AccessPolicy,
}

impl ClaimEngine {
    pub fn new(rates: RateConfig, access: AccessPolicy) -> Self {
        Self { rates, access }
    }

    pub fn rates(&self) -> &RateConfig {
        &self.rates
    }

    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Target status for a status/action pair, `None` when the pair is not
    /// a legal transition
    pub fn target_status(status: ClaimStatus, action: ActionKind) -> Option<ClaimStatus> {
        use ActionKind::*;
        use ClaimStatus::*;

        match (status, action) {
            (Draft, Edit) => Some(Draft),
            (Draft, Submit) => Some(Submitted),
            (Draft, Delete) => Some(Draft),
            (Submitted, StartReview) => Some(UnderReview),
            (Submitted | UnderReview, Approve) => Some(Approved),
            (Submitted | UnderReview, Reject) => Some(Rejected),
            (Approved, MarkPaid) => Some(Paid),
            _ => None,
        }
    }

    /// Actions that are legal from a status, regardless of who asks
    pub fn allowed_actions(status: ClaimStatus) -> Vec<ActionKind> {
        [
            ActionKind::Edit,
            ActionKind::Submit,
            ActionKind::Delete,
            ActionKind::StartReview,
            ActionKind::Approve,
            ActionKind::Reject,
            ActionKind::MarkPaid,
        ]
        .into_iter()
        .filter(|action| Self::target_status(status, *action).is_some())
        .collect()
    }

    /// Prices a trip with the configured rates
    pub fn quote(
        &self,
        travel_dates: DateRange,
        mode: TransportMode,
        distance_km: rust_decimal::Decimal,
    ) -> Result<CostBreakdown, ClaimError> {
        self.rates.quote(travel_dates, mode, distance_km)
    }

    /// Creates a claim owned by the acting employee
    ///
    /// With `submit` set the claim goes straight to `Submitted` and must
    /// pass the submission checks.
    pub fn create(
        &self,
        new: NewClaim,
        actor: &Actor,
        submit: bool,
        at: DateTime<Utc>,
    ) -> Result<TravelClaim, ClaimError> {
        if !actor.owns(new.employee_id) {
            return Err(self.unauthorized(actor, ActionKind::Create));
        }

        let zero = Money::zero(self.rates.currency());
        let mut claim = TravelClaim {
            id: ClaimId::new_v7(),
            employee_id: new.employee_id,
            employee_name: new.employee_name,
            department: new.department,
            travel_dates: new.travel_dates,
            purpose: new.purpose,
            origin: new.origin,
            destination: new.destination,
            transport_mode: new.transport_mode,
            distance_km: new.distance_km,
            daily_allowance: zero,
            transport_cost: zero,
            total_amount: zero,
            status: ClaimStatus::Draft,
            receipts: Vec::new(),
            remarks: new.remarks.filter(|r| !r.trim().is_empty()),
            admin_notes: None,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            paid_at: None,
            created_at: at,
            updated_at: at,
        };
        for receipt in new.receipts {
            if !claim.has_receipt(receipt.id) {
                claim.receipts.push(receipt);
            }
        }

        // a direct submission reports missing fields before pricing errors
        if submit {
            validate_for_submission(&claim, &self.rates.transport)?;
        }
        self.recompute(&mut claim)?;

        if submit {
            claim.status = ClaimStatus::Submitted;
            claim.submitted_at = Some(at);
        }
        Ok(claim)
    }

    /// Applies any action, including deletion
    pub fn apply(
        &self,
        claim: &TravelClaim,
        action: ClaimAction,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, ClaimError> {
        match action {
            ClaimAction::Delete => self.delete(claim, actor).map(TransitionOutcome::Deleted),
            other => self.transition(claim, other, actor, at).map(TransitionOutcome::Updated),
        }
    }

    /// Applies a non-delete action and returns the next claim value
    ///
    /// Checks run in order: legality of the status/action pair, then the
    /// actor's authority, then the action's own guards.
    pub fn transition(
        &self,
        claim: &TravelClaim,
        action: ClaimAction,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<ClaimTransition, ClaimError> {
        let kind = action.kind();
        let target = self.ensure_legal(claim.status, kind)?;
        self.authorize(claim, kind, actor)?;

        let mut next = claim.clone();
        let mut changes = Vec::new();

        match action {
            ClaimAction::Delete => {
                return Err(ClaimError::InvalidTransition {
                    status: claim.status,
                    action: kind,
                })
            }
            ClaimAction::Edit(edit) => {
                edit.apply_to(&mut next);
                self.recompute(&mut next)?;
            }
            ClaimAction::Submit => {
                validate_for_submission(&next, &self.rates.transport)?;
                self.recompute(&mut next)?;
                set_once(&mut next.submitted_at, at, FieldChange::SubmittedAt, &mut changes);
            }
            ClaimAction::StartReview => {}
            ClaimAction::Approve { admin_notes } => {
                if let Some(notes) = admin_notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                    next.admin_notes = Some(notes.to_string());
                    changes.push(FieldChange::AdminNotes(notes.to_string()));
                }
                self.record_review(&mut next, actor, at, &mut changes);
            }
            ClaimAction::Reject { admin_notes } => {
                let notes = require_admin_notes(admin_notes.as_deref())?.to_string();
                next.admin_notes = Some(notes.clone());
                changes.push(FieldChange::AdminNotes(notes));
                self.record_review(&mut next, actor, at, &mut changes);
            }
            ClaimAction::MarkPaid => {
                set_once(&mut next.paid_at, at, FieldChange::PaidAt, &mut changes);
            }
        }

        next.status = target;
        next.updated_at = at;

        Ok(ClaimTransition {
            claim: next,
            previous_status: claim.status,
            action: kind,
            changes,
        })
    }

    /// Checks that a draft may be removed by this actor
    pub fn delete(&self, claim: &TravelClaim, actor: &Actor) -> Result<ClaimId, ClaimError> {
        self.ensure_legal(claim.status, ActionKind::Delete)?;
        self.authorize(claim, ActionKind::Delete, actor)?;
        Ok(claim.id)
    }

    /// Checks that the actor may currently edit the claim, without editing it
    pub fn ensure_editable(&self, claim: &TravelClaim, actor: &Actor) -> Result<(), ClaimError> {
        self.ensure_legal(claim.status, ActionKind::Edit)?;
        self.authorize(claim, ActionKind::Edit, actor)
    }

    /// Whether the actor may see the claim at all
    pub fn can_view(&self, claim: &TravelClaim, actor: &Actor) -> bool {
        actor.owns(claim.employee_id) || self.access.allows(actor, Capability::ViewAllClaims)
    }

    pub fn submit(&self, claim: &TravelClaim, actor: &Actor, at: DateTime<Utc>) -> Result<ClaimTransition, ClaimError> {
        self.transition(claim, ClaimAction::Submit, actor, at)
    }

    pub fn start_review(&self, claim: &TravelClaim, actor: &Actor, at: DateTime<Utc>) -> Result<ClaimTransition, ClaimError> {
        self.transition(claim, ClaimAction::StartReview, actor, at)
    }

    pub fn approve(
        &self,
        claim: &TravelClaim,
        admin_notes: Option<String>,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<ClaimTransition, ClaimError> {
        self.transition(claim, ClaimAction::Approve { admin_notes }, actor, at)
    }

    pub fn reject(
        &self,
        claim: &TravelClaim,
        admin_notes: Option<String>,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<ClaimTransition, ClaimError> {
        self.transition(claim, ClaimAction::Reject { admin_notes }, actor, at)
    }

    pub fn mark_paid(&self, claim: &TravelClaim, actor: &Actor, at: DateTime<Utc>) -> Result<ClaimTransition, ClaimError> {
        self.transition(claim, ClaimAction::MarkPaid, actor, at)
    }

    pub fn edit(
        &self,
        claim: &TravelClaim,
        edit: ClaimEdit,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<ClaimTransition, ClaimError> {
        self.transition(claim, ClaimAction::Edit(edit), actor, at)
    }

    fn ensure_legal(&self, status: ClaimStatus, action: ActionKind) -> Result<ClaimStatus, ClaimError> {
        Self::target_status(status, action).ok_or(ClaimError::InvalidTransition { status, action })
    }

    fn authorize(&self, claim: &TravelClaim, action: ActionKind, actor: &Actor) -> Result<(), ClaimError> {
        let allowed = match action {
            ActionKind::Create | ActionKind::Edit | ActionKind::Submit | ActionKind::Delete => {
                actor.owns(claim.employee_id)
            }
            ActionKind::StartReview | ActionKind::Approve | ActionKind::Reject => {
                self.access.allows(actor, Capability::ReviewClaims)
            }
            ActionKind::MarkPaid => self.access.allows(actor, Capability::DisburseClaims),
        };
        if allowed {
            Ok(())
        } else {
            Err(self.unauthorized(actor, action))
        }
    }

    fn unauthorized(&self, actor: &Actor, action: ActionKind) -> ClaimError {
        ClaimError::Unauthorized {
            actor: actor.user_id.clone(),
            action,
        }
    }

    fn recompute(&self, claim: &mut TravelClaim) -> Result<(), ClaimError> {
        let costs = self.quote(claim.travel_dates, claim.transport_mode, claim.distance_km)?;
        claim.daily_allowance = costs.daily_allowance;
        claim.transport_cost = costs.transport_cost;
        claim.total_amount = costs.total;
        Ok(())
    }

    fn record_review(
        &self,
        claim: &mut TravelClaim,
        actor: &Actor,
        at: DateTime<Utc>,
        changes: &mut Vec<FieldChange>,
    ) {
        set_once(&mut claim.reviewed_at, at, FieldChange::ReviewedAt, changes);
        set_once(&mut claim.reviewed_by, actor.user_id.clone(), FieldChange::ReviewedBy, changes);
    }
}

/// Sets a field only if it was never set, recording the change
fn set_once<T: Clone>(
    slot: &mut Option<T>,
    value: T,
    change: fn(T) -> FieldChange,
    changes: &mut Vec<FieldChange>,
) {
    if slot.is_none() {
        *slot = Some(value.clone());
        changes.push(change(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use core_kernel::{Currency, EmployeeId, Money};
    use rust_decimal_macros::dec;

    use crate::access::Role;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 20, 9, 30, 0).unwrap()
    }

    fn new_claim(employee_id: EmployeeId) -> NewClaim {
        NewClaim {
            employee_id,
            employee_name: "Asha Rao".to_string(),
            department: "Engineering".to_string(),
            travel_dates: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
            )
            .unwrap(),
            purpose: "Client workshop".to_string(),
            origin: "Pune".to_string(),
            destination: "Mumbai".to_string(),
            transport_mode: TransportMode::Bus,
            distance_km: dec!(300),
            remarks: None,
            receipts: Vec::new(),
        }
    }

    fn draft() -> (ClaimEngine, TravelClaim, Actor) {
        let engine = ClaimEngine::default();
        let employee = Actor::employee("emp-1", EmployeeId::new());
        let claim = engine
            .create(new_claim(employee.employee_id.unwrap()), &employee, false, at())
            .unwrap();
        (engine, claim, employee)
    }

    #[test]
    fn test_create_computes_amounts() {
        let (_, claim, _) = draft();
        assert_eq!(claim.status, ClaimStatus::Draft);
        assert_eq!(claim.daily_allowance, Money::new(dec!(3000), Currency::INR));
        assert_eq!(claim.transport_cost, Money::new(dec!(1500), Currency::INR));
        assert_eq!(claim.total_amount, Money::new(dec!(4500), Currency::INR));
        assert!(claim.amounts_consistent());
        assert!(claim.submitted_at.is_none());
    }

    #[test]
    fn test_create_for_someone_else_is_unauthorized() {
        let engine = ClaimEngine::default();
        let hr = Actor::staff("hr-1", Role::Hr);
        let result = engine.create(new_claim(EmployeeId::new()), &hr, false, at());
        assert!(matches!(
            result,
            Err(ClaimError::Unauthorized { action: ActionKind::Create, .. })
        ));
    }

    #[test]
    fn test_create_and_submit() {
        let engine = ClaimEngine::default();
        let employee = Actor::employee("emp-1", EmployeeId::new());
        let claim = engine
            .create(new_claim(employee.employee_id.unwrap()), &employee, true, at())
            .unwrap();
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert_eq!(claim.submitted_at, Some(at()));
    }

    #[test]
    fn test_direct_submission_reports_missing_field_before_bad_distance() {
        let engine = ClaimEngine::default();
        let employee = Actor::employee("emp-1", EmployeeId::new());
        let mut new = new_claim(employee.employee_id.unwrap());
        new.purpose = String::new();
        new.distance_km = dec!(-5);

        let submitted = engine.create(new.clone(), &employee, true, at());
        assert!(matches!(submitted, Err(ClaimError::MissingField("purpose"))));

        let drafted = engine.create(new, &employee, false, at());
        assert!(matches!(drafted, Err(ClaimError::InvalidDistance(d)) if d == dec!(-5)));
    }

    #[test]
    fn test_submit_records_timestamp() {
        let (engine, claim, employee) = draft();
        let transition = engine.submit(&claim, &employee, at()).unwrap();

        assert_eq!(transition.previous_status, ClaimStatus::Draft);
        assert_eq!(transition.claim.status, ClaimStatus::Submitted);
        assert_eq!(transition.changes, vec![FieldChange::SubmittedAt(at())]);
        assert!(transition.status_changed());
    }

    #[test]
    fn test_delete_draft_returns_id() {
        let (engine, claim, employee) = draft();
        let outcome = engine.apply(&claim, ClaimAction::Delete, &employee, at()).unwrap();
        assert_eq!(outcome, TransitionOutcome::Deleted(claim.id));
    }

    #[test]
    fn test_transition_rejects_delete_action() {
        let (engine, claim, employee) = draft();
        let result = engine.transition(&claim, ClaimAction::Delete, &employee, at());
        assert!(matches!(result, Err(ClaimError::InvalidTransition { .. })));
    }

    #[test]
    fn test_allowed_actions_from_draft() {
        assert_eq!(
            ClaimEngine::allowed_actions(ClaimStatus::Draft),
            vec![ActionKind::Edit, ActionKind::Submit, ActionKind::Delete]
        );
        assert!(ClaimEngine::allowed_actions(ClaimStatus::Paid).is_empty());
        assert!(ClaimEngine::allowed_actions(ClaimStatus::Rejected).is_empty());
    }

    #[test]
    fn test_same_start_same_result() {
        let (engine, claim, employee) = draft();
        let first = engine.submit(&claim, &employee, at()).unwrap();
        let second = engine.submit(&claim, &employee, at()).unwrap();
        assert_eq!(first, second);
    }
}
