//! Adapters bundled with the claims domain
//!
//! - **InMemoryClaimRepository** / **InMemoryReceiptStore**: process-local
//!   storage for tests
//! - **TracingNotifier**: writes claim events to the log
//! - **RecordingNotifier**: keeps every event for assertions
//!
//! The PostgreSQL repository and receipt store live in `infra_db`.

pub mod memory;
pub mod notifier;

pub use memory::{InMemoryClaimRepository, InMemoryReceiptStore};
pub use notifier::{RecordingNotifier, TracingNotifier};
