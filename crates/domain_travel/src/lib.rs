//! Travel & Daily Allowance (TA/DA) Claims Domain
//!
//! This crate implements the cost calculation and approval workflow for
//! employee travel claims. The [`ClaimEngine`] is pure: it takes a claim
//! value and returns the next claim value or a typed failure, and never
//! performs I/O. [`ClaimService`] wires the engine to the persistence,
//! notification and receipt ports.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Submitted -> UnderReview -> Approved -> Paid
//!   |          \______________/  \
//!   v                             -> Rejected
//! (deleted)
//! ```
//!
//! # Cost Rules
//!
//! - daily allowance = inclusive travel days × daily rate
//! - transport cost  = per-km rate for the transport mode × distance
//! - total           = daily allowance + transport cost

pub mod access;
pub mod adapters;
pub mod claim;
pub mod engine;
pub mod error;
pub mod events;
pub mod ports;
pub mod rates;
pub mod service;
pub mod summary;
pub mod validation;

pub use access::{AccessPolicy, Actor, Capability, Role};
pub use claim::{ClaimEdit, ClaimStatus, NewClaim, ReceiptRef, TransportMode, TravelClaim};
pub use engine::{ActionKind, ClaimAction, ClaimEngine, ClaimTransition, FieldChange, TransitionOutcome};
pub use error::ClaimError;
pub use events::ClaimEvent;
pub use ports::{ClaimNotifier, ClaimQuery, ClaimRepository, ReceiptStore, ReceiptUpload};
pub use rates::{
    compute_daily_allowance, compute_total, compute_transport_cost, CostBreakdown, RateConfig,
    TransportRates,
};
pub use service::ClaimService;
pub use summary::ClaimSummary;
