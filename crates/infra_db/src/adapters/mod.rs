//! Domain Adapters
//!
//! Implementations of domain ports on top of the PostgreSQL repositories.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimRepository;
//! use domain_travel::ClaimRepository;
//! use std::sync::Arc;
//!
//! let repository: Arc<dyn ClaimRepository> = Arc::new(PostgresClaimRepository::new(pool));
//! let stored = repository.get(claim_id, None).await?;
//! ```

pub mod claims;
pub mod receipts;

pub use claims::PostgresClaimRepository;
pub use receipts::PostgresReceiptStore;
