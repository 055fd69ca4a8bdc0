//! Test Utilities Crate
//!
//! Shared test infrastructure, fixtures, and helpers for the TA/DA claims
//! test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common values
//! - `builders`: Builder patterns for claims and claim input
//! - `database`: PostgreSQL test containers
//! - `assertions`: Assertion helpers for claims and money
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
