//! Database stores for the data access layer
//!
//! Stores are defined as traits so the HTTP layer can run against either the
//! PostgreSQL implementation or the in-memory one used in tests.

pub mod memory;
pub mod postgres;
pub mod traits;
pub mod transaction;

pub use memory::MemorySubmissionStore;
pub use postgres::PgSubmissionStore;
pub use traits::{SessionStore, SubmissionCommitter};
pub use transaction::TransactionGuard;
