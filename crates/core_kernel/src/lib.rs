//! Core Kernel - Foundational types shared by the TA/DA claims workspace
//!
//! This crate provides the building blocks used by the domain, database and
//! API layers:
//! - Money types with precise decimal arithmetic
//! - Inclusive calendar date ranges for travel periods
//! - Strongly-typed identifiers
//! - Port abstractions (errors, health checks, versioned records)

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{DateRange, TemporalError};
pub use identifiers::{ClaimId, EmployeeId, ReceiptId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata, Versioned,
};
pub use error::CoreError;
