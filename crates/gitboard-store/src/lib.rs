//! Key-value store with expiring entries.
//!
//! Two backends behind one enum:
//!
//! - **Memory**: per-process DashMap, used for single-instance deployments
//!   and tests; entries are evicted lazily on read.
//! - **Redis**: deadpool-backed shared store for multi-instance deployments.
//!
//! Callers treat the store as unreliable: every operation returns a
//! `Result`, and the expected recovery is to log and continue rather than
//! fail the primary flow on a store error.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::KvStore;
