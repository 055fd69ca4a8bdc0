//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for travel claims and their receipt documents
//! using SQLx.
//!
//! # Architecture
//!
//! Repositories hide the SQL; adapters implement the domain ports on top of
//! them and translate rows into domain values.
//!
//! # Optimistic Versioning
//!
//! Each claim row carries a `version` that starts at 1 and is incremented by
//! every update. Updates and deletes name the version they were based on;
//! a mismatch changes nothing and is reported as a conflict.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/tada")).await?;
//! run_migrations(&pool).await?;
//! let repository = PostgresClaimRepository::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresClaimRepository, PostgresReceiptStore};
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{ReceiptDocumentRepository, TravelClaimRepository};
