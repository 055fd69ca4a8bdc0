//! Tests for the claim engine: cost rules and the approval state machine

use chrono::Duration;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, DateRange, EmployeeId, ReceiptId};

use domain_travel::{
    compute_daily_allowance, compute_total, compute_transport_cost, AccessPolicy, ActionKind,
    Actor, Capability, ClaimAction, ClaimEdit, ClaimEngine, ClaimError, ClaimStatus,
    ClaimSummary, FieldChange, NewClaim, RateConfig, ReceiptRef, Role, TransportMode,
    TransportRates, TravelClaim,
};
use test_utils::{
    assert_amounts_consistent, assert_not_reviewed, assert_status, daily_rate_strategy,
    date_range_strategy, distance_strategy, new_claim_strategy, transport_mode_strategy,
    ActorFixtures, ClaimFactory, EngineFixtures, MoneyFixtures, TemporalFixtures,
    TestClaimBuilder,
};

fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    TemporalFixtures::date(y, m, d)
}

fn inr(amount: Decimal) -> core_kernel::Money {
    MoneyFixtures::inr(amount)
}

fn at(hour: u32) -> chrono::DateTime<chrono::Utc> {
    TemporalFixtures::at(hour)
}

struct Fixture {
    engine: ClaimEngine,
    factory: ClaimFactory,
    employee: Actor,
    hr: Actor,
    finance: Actor,
}

impl Fixture {
    fn new() -> Self {
        let engine = EngineFixtures::standard();
        let factory = ClaimFactory::new(engine.clone());
        Self {
            employee: factory.employee().clone(),
            hr: factory.reviewer().clone(),
            finance: ActorFixtures::finance(),
            engine,
            factory,
        }
    }

    fn new_claim(&self) -> NewClaim {
        TestClaimBuilder::new()
            .for_actor(&self.employee)
            .with_remarks("Shared cab to the venue")
            .build()
    }

    fn draft(&self) -> TravelClaim {
        self.factory.draft()
    }

    fn submitted(&self) -> TravelClaim {
        self.in_status(ClaimStatus::Submitted)
    }

    fn under_review(&self) -> TravelClaim {
        self.in_status(ClaimStatus::UnderReview)
    }

    fn approved(&self) -> TravelClaim {
        self.in_status(ClaimStatus::Approved)
    }

    fn rejected(&self) -> TravelClaim {
        self.in_status(ClaimStatus::Rejected)
    }

    fn paid(&self) -> TravelClaim {
        self.in_status(ClaimStatus::Paid)
    }

    fn in_status(&self, status: ClaimStatus) -> TravelClaim {
        self.factory.in_status(status)
    }

    /// Someone allowed to attempt the action, so only legality decides
    fn actor_for(&self, action: ActionKind) -> Actor {
        match action {
            ActionKind::Create | ActionKind::Edit | ActionKind::Submit | ActionKind::Delete => {
                self.employee.clone()
            }
            _ => self.hr.clone(),
        }
    }
}

fn action_of(kind: ActionKind) -> ClaimAction {
    match kind {
        ActionKind::Edit => ClaimAction::Edit(ClaimEdit {
            purpose: Some("Updated".into()),
            ..Default::default()
        }),
        ActionKind::Submit => ClaimAction::Submit,
        ActionKind::Delete => ClaimAction::Delete,
        ActionKind::StartReview => ClaimAction::StartReview,
        ActionKind::Approve => ClaimAction::Approve { admin_notes: None },
        ActionKind::Reject => ClaimAction::Reject {
            admin_notes: Some("Duplicate".into()),
        },
        ActionKind::MarkPaid => ClaimAction::MarkPaid,
        ActionKind::Create => unreachable!("create is not an action on a stored claim"),
    }
}

const ACTIONS: [ActionKind; 7] = [
    ActionKind::Edit,
    ActionKind::Submit,
    ActionKind::Delete,
    ActionKind::StartReview,
    ActionKind::Approve,
    ActionKind::Reject,
    ActionKind::MarkPaid,
];

// ============================================================================
// Cost Calculation Tests
// ============================================================================

mod cost_tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        let allowance = compute_daily_allowance(date(2024, 1, 15), date(2024, 1, 17), inr(dec!(1000))).unwrap();
        let transport = compute_transport_cost(TransportMode::Bus, dec!(300), &TransportRates::default()).unwrap();
        let total = compute_total(allowance, transport).unwrap();

        assert_eq!(allowance, inr(dec!(3000)));
        assert_eq!(transport, inr(dec!(1500)));
        assert_eq!(total, inr(dec!(4500)));
    }

    #[test]
    fn test_allowance_across_month_boundary() {
        let allowance = compute_daily_allowance(date(2024, 2, 28), date(2024, 3, 1), inr(dec!(1000))).unwrap();
        // 2024 is a leap year: 28, 29 Feb and 1 Mar
        assert_eq!(allowance, inr(dec!(3000)));
    }

    #[test]
    fn test_fractional_distance() {
        let cost = compute_transport_cost(TransportMode::Train, dec!(12.5), &TransportRates::default()).unwrap();
        assert_eq!(cost, inr(dec!(100)));
    }

    #[test]
    fn test_custom_rates() {
        let rates = RateConfig::new(
            inr(dec!(750)),
            TransportRates::new(Currency::INR).with_rate(TransportMode::Car, dec!(9)),
        )
        .unwrap();
        let quote = rates
            .quote(DateRange::single_day(date(2024, 6, 1)), TransportMode::Car, dec!(40))
            .unwrap();

        assert_eq!(quote.days, 1);
        assert_eq!(quote.total, inr(dec!(1110)));
        assert!(matches!(
            rates.quote(DateRange::single_day(date(2024, 6, 1)), TransportMode::Bus, dec!(40)),
            Err(ClaimError::UnknownTransportMode(_))
        ));
    }

    #[test]
    fn test_fractional_cost_doubles_exactly() {
        let rates = TransportRates::default();
        let d = dec!(12.34567);
        let single = compute_transport_cost(TransportMode::Train, d, &rates).unwrap();
        let double = compute_transport_cost(TransportMode::Train, d * dec!(2), &rates).unwrap();

        assert_eq!(single.amount(), dec!(98.76536));
        assert_eq!(double, single.checked_add(&single).unwrap());
    }

    proptest! {
        #[test]
        fn prop_allowance_is_inclusive_days_times_rate(period in date_range_strategy(), rate in daily_rate_strategy()) {
            let allowance = compute_daily_allowance(period.start, period.end, rate).unwrap();
            prop_assert_eq!(allowance.amount(), rate.amount() * Decimal::from(period.inclusive_days()));
        }

        #[test]
        fn prop_allowance_monotone_in_end_date(period in date_range_strategy(), extra in 0i64..30) {
            let longer_end = period.end + Duration::days(extra);
            let shorter = compute_daily_allowance(period.start, period.end, MoneyFixtures::daily_rate()).unwrap();
            let longer = compute_daily_allowance(period.start, longer_end, MoneyFixtures::daily_rate()).unwrap();
            prop_assert!(longer.amount() >= shorter.amount());
        }

        #[test]
        fn prop_inverted_range_rejected(len in 1i64..60) {
            let to = date(2024, 3, 1);
            let from = to + Duration::days(len);
            let result = compute_daily_allowance(from, to, MoneyFixtures::daily_rate());
            prop_assert!(
                matches!(result, Err(ClaimError::InvalidRange { .. })),
                "expected InvalidRange, got {:?}",
                result
            );
        }

        #[test]
        fn prop_transport_cost_linear_in_distance(
            a in distance_strategy(),
            b in distance_strategy(),
            mode in transport_mode_strategy()
        ) {
            let rates = TransportRates::default();

            let cost_a = compute_transport_cost(mode, a, &rates).unwrap();
            let cost_b = compute_transport_cost(mode, b, &rates).unwrap();
            let cost_sum = compute_transport_cost(mode, a + b, &rates).unwrap();
            prop_assert_eq!(cost_sum, cost_a.checked_add(&cost_b).unwrap());

            let cost_double = compute_transport_cost(mode, a * Decimal::TWO, &rates).unwrap();
            prop_assert_eq!(cost_double, cost_a.checked_add(&cost_a).unwrap());
        }

        #[test]
        fn prop_total_is_sum(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            let total = compute_total(inr(Decimal::from(a)), inr(Decimal::from(b))).unwrap();
            prop_assert_eq!(total.amount(), Decimal::from(a + b));
        }

        #[test]
        fn prop_submitted_claims_are_priced_consistently(new in new_claim_strategy(EmployeeId::new())) {
            let engine = EngineFixtures::standard();
            let owner = Actor::employee("generated", new.employee_id);
            let expected = engine.quote(new.travel_dates, new.transport_mode, new.distance_km).unwrap();

            let claim = engine.create(new, &owner, true, at(8)).unwrap();
            assert_status(&claim, ClaimStatus::Submitted);
            assert_amounts_consistent(&claim);
            prop_assert_eq!(claim.total_amount, expected.total);
        }
    }
}

// ============================================================================
// State Machine Tests
// ============================================================================

mod state_machine_tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let f = Fixture::new();
        let paid = f.paid();

        assert_eq!(paid.status, ClaimStatus::Paid);
        assert_eq!(paid.submitted_at, Some(at(9)));
        assert_eq!(paid.reviewed_at, Some(at(11)));
        assert_eq!(paid.reviewed_by.as_deref(), Some("hr-1"));
        assert_eq!(paid.paid_at, Some(at(12)));
        assert_eq!(paid.updated_at, at(12));
        assert_eq!(paid.total_amount, inr(dec!(4500)));
    }

    #[test]
    fn test_approve_straight_from_submitted() {
        let f = Fixture::new();
        let transition = f
            .engine
            .approve(&f.submitted(), Some("  Looks fine ".into()), &f.finance, at(10))
            .unwrap();

        assert_eq!(transition.claim.status, ClaimStatus::Approved);
        assert_eq!(transition.claim.admin_notes.as_deref(), Some("Looks fine"));
        assert_eq!(
            transition.changes,
            vec![
                FieldChange::AdminNotes("Looks fine".into()),
                FieldChange::ReviewedAt(at(10)),
                FieldChange::ReviewedBy("finance-1".into()),
            ]
        );
    }

    #[test]
    fn test_only_legal_pairs_succeed() {
        let f = Fixture::new();
        for status in ClaimStatus::ALL {
            let claim = f.in_status(status);
            for kind in ACTIONS {
                let actor = f.actor_for(kind);
                let result = f.engine.apply(&claim, action_of(kind), &actor, at(13));
                let legal = ClaimEngine::target_status(status, kind).is_some();

                assert_eq!(result.is_ok(), legal, "{kind} from {status}");
                if !legal {
                    assert!(matches!(
                        result,
                        Err(ClaimError::InvalidTransition { status: s, action: a }) if s == status && a == kind
                    ));
                }
            }
        }
    }

    #[test]
    fn test_draft_allows_only_edit_submit_delete() {
        let allowed = ClaimEngine::allowed_actions(ClaimStatus::Draft);
        assert_eq!(allowed, vec![ActionKind::Edit, ActionKind::Submit, ActionKind::Delete]);
    }

    #[test]
    fn test_terminal_statuses_reject_everything() {
        let f = Fixture::new();
        for claim in [f.rejected(), f.paid()] {
            for kind in ACTIONS {
                let result = f.engine.apply(&claim, action_of(kind), &f.actor_for(kind), at(14));
                assert!(matches!(result, Err(ClaimError::InvalidTransition { .. })));
            }
        }
    }

    #[test]
    fn test_illegal_transition_wins_over_authorization() {
        let f = Fixture::new();
        // an employee approving a draft is both illegal and unauthorized
        let result = f.engine.approve(&f.draft(), None, &f.employee, at(9));
        assert!(matches!(result, Err(ClaimError::InvalidTransition { .. })));
    }

    #[test]
    fn test_non_reviewer_cannot_approve() {
        let f = Fixture::new();
        let submitted = f.submitted();
        let result = f.engine.approve(&submitted, None, &f.employee, at(10));

        assert!(matches!(
            result,
            Err(ClaimError::Unauthorized { ref actor, action: ActionKind::Approve }) if actor == "employee-1"
        ));
        assert_status(&submitted, ClaimStatus::Submitted);
        assert_not_reviewed(&submitted);
    }

    #[test]
    fn test_other_employee_cannot_submit() {
        let f = Fixture::new();
        let colleague = Actor::employee("ravi", EmployeeId::new());
        let result = f.engine.submit(&f.draft(), &colleague, at(9));
        assert!(matches!(result, Err(ClaimError::Unauthorized { action: ActionKind::Submit, .. })));
    }

    #[test]
    fn test_reviewer_cannot_edit_someone_elses_draft() {
        let f = Fixture::new();
        let result = f.engine.edit(&f.draft(), ClaimEdit::default(), &f.hr, at(9));
        assert!(matches!(result, Err(ClaimError::Unauthorized { action: ActionKind::Edit, .. })));
    }

    #[test]
    fn test_review_requires_capability() {
        let f = Fixture::new();
        let engine = ClaimEngine::new(
            RateConfig::default(),
            AccessPolicy::empty().grant(Role::Manager, Capability::ReviewClaims),
        );
        let manager = ActorFixtures::manager();
        let submitted = engine.submit(&f.draft(), &f.employee, at(9)).unwrap().claim;

        assert!(engine.start_review(&submitted, &f.hr, at(10)).is_err());
        let reviewing = engine.start_review(&submitted, &manager, at(10)).unwrap().claim;
        let approved = engine.approve(&reviewing, None, &manager, at(11)).unwrap().claim;
        assert!(matches!(
            engine.mark_paid(&approved, &manager, at(12)),
            Err(ClaimError::Unauthorized { action: ActionKind::MarkPaid, .. })
        ));
    }

    #[test]
    fn test_reject_without_notes() {
        let f = Fixture::new();
        let reviewing = f.under_review();

        for notes in [None, Some("   ".to_string())] {
            let result = f.engine.reject(&reviewing, notes, &f.hr, at(11));
            assert!(matches!(result, Err(ClaimError::MissingField("adminNotes"))));
        }
        assert_eq!(reviewing.status, ClaimStatus::UnderReview);
    }

    #[test]
    fn test_reject_records_notes_and_reviewer() {
        let f = Fixture::new();
        let rejected = f.rejected();
        assert_eq!(rejected.status, ClaimStatus::Rejected);
        assert_eq!(rejected.admin_notes.as_deref(), Some("Receipts missing"));
        assert_eq!(rejected.reviewed_by.as_deref(), Some("hr-1"));
    }

    #[test]
    fn test_review_fields_not_backdated() {
        let f = Fixture::new();
        let reviewing = f.under_review();
        let approved = f.engine.approve(&reviewing, None, &f.finance, at(15)).unwrap();

        assert_eq!(approved.claim.reviewed_at, Some(at(15)));
        let paid = f.engine.mark_paid(&approved.claim, &f.finance, at(16)).unwrap();
        assert_eq!(paid.claim.reviewed_at, Some(at(15)));
        assert_eq!(paid.changes, vec![FieldChange::PaidAt(at(16))]);
    }

    #[test]
    fn test_start_review_changes_only_status() {
        let f = Fixture::new();
        let submitted = f.submitted();
        let transition = f.engine.start_review(&submitted, &f.hr, at(10)).unwrap();

        assert!(transition.changes.is_empty());
        assert_eq!(transition.claim.reviewed_by, None);
        assert_eq!(transition.previous_status, ClaimStatus::Submitted);
    }

    #[test]
    fn test_failed_action_leaves_claim_unchanged() {
        let f = Fixture::new();
        let draft = f.draft();
        let before = draft.clone();
        let _ = f.engine.mark_paid(&draft, &f.finance, at(9));
        let _ = f.engine.submit(&draft, &f.hr, at(9));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_reapplying_from_same_state_is_stable() {
        let f = Fixture::new();
        let reviewing = f.under_review();
        let first = f.engine.approve(&reviewing, Some("ok".into()), &f.hr, at(11)).unwrap();
        let second = f.engine.approve(&reviewing, Some("ok".into()), &f.hr, at(11)).unwrap();
        assert_eq!(first, second);
    }
}

// ============================================================================
// Validation And Editing Tests
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_submit_with_missing_destination() {
        let f = Fixture::new();
        let draft = f.factory.draft_from(TestClaimBuilder::new().with_destination("  "));

        let result = f.engine.submit(&draft, &f.employee, at(9));
        assert!(matches!(result, Err(ClaimError::MissingField("destination"))));
        assert_eq!(draft.status, ClaimStatus::Draft);
        assert!(draft.submitted_at.is_none());
    }

    #[test]
    fn test_submission_checks_run_in_order() {
        let f = Fixture::new();
        let mut draft = f.factory.draft_from(TestClaimBuilder::new().with_purpose(""));
        draft.origin = String::new();

        let result = f.engine.submit(&draft, &f.employee, at(9));
        assert!(matches!(result, Err(ClaimError::MissingField("purpose"))));
    }

    #[test]
    fn test_submit_with_unpriced_mode() {
        let f = Fixture::new();
        let draft = f.draft();
        let engine = ClaimEngine::new(
            RateConfig::new(
                inr(dec!(1000)),
                TransportRates::new(Currency::INR).with_rate(TransportMode::Train, dec!(8)),
            )
            .unwrap(),
            AccessPolicy::default(),
        );

        let result = engine.submit(&draft, &f.employee, at(9));
        assert!(matches!(result, Err(ClaimError::MissingField("transportMode"))));
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let f = Fixture::new();

        let mut negative = f.new_claim();
        negative.distance_km = dec!(-5);
        assert!(matches!(
            f.engine.create(negative, &f.employee, false, at(8)),
            Err(ClaimError::InvalidDistance(_))
        ));

        let mut inverted = f.new_claim();
        inverted.travel_dates = DateRange { start: date(2024, 1, 17), end: date(2024, 1, 15) };
        assert!(matches!(
            f.engine.create(inverted, &f.employee, false, at(8)),
            Err(ClaimError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_direct_submission_checks_fields_before_pricing() {
        let f = Fixture::new();
        let mut new = f.new_claim();
        new.purpose = String::new();
        new.distance_km = dec!(-5);

        let result = f.engine.create(new, &f.employee, true, at(8));
        assert!(matches!(result, Err(ClaimError::MissingField("purpose"))));
    }

    #[test]
    fn test_create_and_submit_validates() {
        let f = Fixture::new();
        let mut new = f.new_claim();
        new.purpose = "".to_string();
        let result = f.engine.create(new, &f.employee, true, at(8));
        assert!(matches!(result, Err(ClaimError::MissingField("purpose"))));
    }

    #[test]
    fn test_edit_recomputes_amounts() {
        let f = Fixture::new();
        let edit = ClaimEdit {
            transport_mode: Some(TransportMode::Flight),
            distance_km: Some(dec!(1000)),
            travel_dates: Some(TemporalFixtures::single_day()),
            ..Default::default()
        };
        let edited = f.engine.edit(&f.draft(), edit, &f.employee, at(9)).unwrap().claim;

        assert_eq!(edited.status, ClaimStatus::Draft);
        assert_eq!(edited.daily_allowance, inr(dec!(1000)));
        assert_eq!(edited.transport_cost, inr(dec!(12000)));
        assert_eq!(edited.total_amount, inr(dec!(13000)));
        assert!(edited.amounts_consistent());
    }

    #[test]
    fn test_edit_rejects_negative_distance() {
        let f = Fixture::new();
        let edit = ClaimEdit {
            distance_km: Some(dec!(-1)),
            ..Default::default()
        };
        let result = f.engine.edit(&f.draft(), edit, &f.employee, at(9));
        assert!(matches!(result, Err(ClaimError::InvalidDistance(_))));
    }

    #[test]
    fn test_edit_manages_receipts() {
        let f = Fixture::new();
        let receipt = ReceiptRef {
            id: ReceiptId::new(),
            file_name: "ticket.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            uri: "memory://receipts/ticket.pdf".to_string(),
        };

        let with_receipt = f
            .engine
            .edit(&f.draft(), ClaimEdit::attach(receipt.clone()), &f.employee, at(9))
            .unwrap()
            .claim;
        let twice = f
            .engine
            .edit(&with_receipt, ClaimEdit::attach(receipt.clone()), &f.employee, at(9))
            .unwrap()
            .claim;
        assert_eq!(twice.receipts.len(), 1);

        let removed = f
            .engine
            .edit(
                &twice,
                ClaimEdit {
                    remove_receipts: vec![receipt.id],
                    ..Default::default()
                },
                &f.employee,
                at(10),
            )
            .unwrap()
            .claim;
        assert!(removed.receipts.is_empty());
    }

    #[test]
    fn test_submit_uses_current_rates() {
        let f = Fixture::new();
        let draft = f.draft();
        let raised = ClaimEngine::new(
            RateConfig::new(inr(dec!(1200)), TransportRates::default()).unwrap(),
            AccessPolicy::default(),
        );
        let submitted = raised.submit(&draft, &f.employee, at(9)).unwrap().claim;
        assert_eq!(submitted.daily_allowance, inr(dec!(3600)));
        assert_eq!(submitted.total_amount, inr(dec!(5100)));
    }
}

// ============================================================================
// Summary Tests
// ============================================================================

mod summary_tests {
    use super::*;

    #[test]
    fn test_summary_buckets() {
        let f = Fixture::new();
        let claims = vec![f.draft(), f.submitted(), f.under_review(), f.approved(), f.rejected(), f.paid()];
        let summary = ClaimSummary::from_claims(Currency::INR, &claims).unwrap();

        assert_eq!(summary.claim_count, 6);
        assert_eq!(summary.count(ClaimStatus::Draft), 1);
        assert_eq!(summary.total_claimed, inr(dec!(22500)));
        assert_eq!(summary.pending_amount, inr(dec!(9000)));
        assert_eq!(summary.total_approved, inr(dec!(9000)));
        assert_eq!(summary.total_paid, inr(dec!(4500)));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ClaimSummary::from_claims(Currency::INR, &Vec::<TravelClaim>::new()).unwrap();
        assert_eq!(summary.claim_count, 0);
        assert!(summary.total_claimed.is_zero());
        assert_eq!(summary.count(ClaimStatus::Paid), 0);
    }
}
