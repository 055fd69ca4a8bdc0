//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about. Names and places are drawn from `fake`.

use chrono::{DateTime, Utc};
use core_kernel::{ClaimId, DateRange, EmployeeId};
use domain_travel::{
    Actor, ClaimEngine, ClaimStatus, NewClaim, TransportMode, TravelClaim,
};
use fake::faker::address::en::CityName;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{ActorFixtures, TemporalFixtures};

/// Builder for claim input
#[derive(Debug, Clone)]
pub struct TestClaimBuilder {
    employee_id: EmployeeId,
    employee_name: String,
    department: String,
    travel_dates: DateRange,
    purpose: String,
    origin: String,
    destination: String,
    transport_mode: TransportMode,
    distance_km: Decimal,
    remarks: Option<String>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// The reference trip: 3 days and 300 km by bus
    pub fn new() -> Self {
        Self {
            employee_id: EmployeeId::new(),
            employee_name: Name().fake(),
            department: "Engineering".to_string(),
            travel_dates: TemporalFixtures::reference_trip(),
            purpose: "Client workshop".to_string(),
            origin: CityName().fake(),
            destination: CityName().fake(),
            transport_mode: TransportMode::Bus,
            distance_km: dec!(300),
            remarks: None,
        }
    }

    /// Sets the owner to the actor's employee record
    pub fn for_actor(mut self, actor: &Actor) -> Self {
        if let Some(employee_id) = actor.employee_id {
            self.employee_id = employee_id;
        }
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_transport(mut self, mode: TransportMode, distance_km: Decimal) -> Self {
        self.transport_mode = mode;
        self.distance_km = distance_km;
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn build(self) -> NewClaim {
        NewClaim {
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            department: self.department,
            travel_dates: self.travel_dates,
            purpose: self.purpose,
            origin: self.origin,
            destination: self.destination,
            transport_mode: self.transport_mode,
            distance_km: self.distance_km,
            remarks: self.remarks,
            receipts: Vec::new(),
        }
    }
}

/// Builds claims in any status by driving them through the engine
///
/// Timestamps are fixed so results are reproducible.
pub struct ClaimFactory {
    engine: ClaimEngine,
    employee: Actor,
    reviewer: Actor,
    payer: Actor,
}

impl Default for ClaimFactory {
    fn default() -> Self {
        Self::new(ClaimEngine::default())
    }
}

impl ClaimFactory {
    pub fn new(engine: ClaimEngine) -> Self {
        Self {
            engine,
            employee: ActorFixtures::employee(),
            reviewer: ActorFixtures::hr(),
            payer: ActorFixtures::finance(),
        }
    }

    pub fn employee(&self) -> &Actor {
        &self.employee
    }

    pub fn reviewer(&self) -> &Actor {
        &self.reviewer
    }

    pub fn draft(&self) -> TravelClaim {
        self.draft_from(TestClaimBuilder::new())
    }

    pub fn draft_from(&self, builder: TestClaimBuilder) -> TravelClaim {
        self.engine
            .create(builder.for_actor(&self.employee).build(), &self.employee, false, TemporalFixtures::at(8))
            .expect("fixture claim must be valid")
    }

    /// A claim driven from draft to `status` along the usual path
    pub fn in_status(&self, status: ClaimStatus) -> TravelClaim {
        let at = |hour| -> DateTime<Utc> { TemporalFixtures::at(hour) };
        let draft = self.draft();
        if status == ClaimStatus::Draft {
            return draft;
        }

        let submitted = self.step(self.engine.submit(&draft, &self.employee, at(9)));
        if status == ClaimStatus::Submitted {
            return submitted;
        }

        let reviewing = self.step(self.engine.start_review(&submitted, &self.reviewer, at(10)));
        match status {
            ClaimStatus::UnderReview => reviewing,
            ClaimStatus::Rejected => self.step(self.engine.reject(
                &reviewing,
                Some("Receipts missing".to_string()),
                &self.reviewer,
                at(11),
            )),
            ClaimStatus::Approved => self.step(self.engine.approve(&reviewing, None, &self.reviewer, at(11))),
            ClaimStatus::Paid => {
                let approved = self.step(self.engine.approve(&reviewing, None, &self.reviewer, at(11)));
                self.step(self.engine.mark_paid(&approved, &self.payer, at(12)))
            }
            ClaimStatus::Draft | ClaimStatus::Submitted => unreachable!(),
        }
    }

    fn step(
        &self,
        result: Result<domain_travel::ClaimTransition, domain_travel::ClaimError>,
    ) -> TravelClaim {
        result.expect("fixture transition must be legal").claim
    }
}

/// An id that is never stored
pub fn unknown_claim_id() -> ClaimId {
    ClaimId::new()
}
