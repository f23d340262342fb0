//! Conifer Store - transactional multi-datastore tree store
//!
//! This crate owns the datastore side of the middleware:
//! - Versioned in-memory trees per logical datastore (configuration,
//!   operational), with an async read/publish surface
//! - Per-session transaction chains: sequential edits compose before
//!   commit, reads in a chain observe the chain's own writes
//! - The transaction provider: candidate/running lifecycle, commit with
//!   pre-commit structural validation, discard-changes, advisory
//!   candidate locking

pub mod chain;
pub mod datastore;
pub mod errors;
pub mod lock;
pub mod provider;
pub mod store;

pub use chain::{ReadWriteTransaction, TransactionChain};
pub use datastore::{Datastore, LogicalDatastore};
pub use errors::StoreError;
pub use lock::LockManager;
pub use provider::TransactionProvider;
pub use store::{CommitInfo, DataTree, DataTreeStore, InMemoryDataStore};
