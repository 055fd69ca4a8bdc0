//! Repository implementations
//!
//! - `travel_claims`: claims with their derived amounts
//! - `receipt_documents`: uploaded receipt bytes
//!
//! Repositories encapsulate SQL and map between database rows and column
//! types. Conversion to domain values happens in the adapters.
//!
//! Every repository follows these principles:
//! - Runtime-checked queries bound with `sqlx::query_as`
//! - Optimistic concurrency through a `version` column

pub mod claims;
pub mod receipts;

pub use claims::{DbClaimStatus, DbTransportMode, TravelClaimRepository, TravelClaimRow};
pub use receipts::{ReceiptDocumentRepository, ReceiptDocumentRow};
