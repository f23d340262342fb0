//! Per-session transaction provider
//!
//! The provider owns a session's candidate transaction chain and fronts
//! every datastore interaction the operation handlers make. It is the
//! boundary where store-internal errors become structured protocol
//! errors.
//!
//! Lifecycle:
//! - the candidate chain is created lazily on first use, seeded from a
//!   snapshot of running;
//! - `commit` validates the candidate tip, publishes it into running
//!   atomically, then drops the chain so the next use starts fresh;
//! - `discard_changes` drops the chain (idempotent);
//! - `close` drops the chain and releases any held lock.
//!
//! Concurrency policy: without the advisory lock, sessions race on the
//! candidate last-writer-wins - each commit publishes its own session's
//! candidate tree wholesale. The lock is the serialization tool; no
//! automatic merge of concurrent candidate contributions is attempted.

use std::sync::Arc;

use tracing::debug;

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::rules::validate_tree;
use conifer_core::schema::SchemaContext;
use conifer_core_types::SessionId;

use crate::chain::{ReadWriteTransaction, TransactionChain};
use crate::datastore::{Datastore, LogicalDatastore};
use crate::lock::LockManager;
use crate::store::{CommitInfo, DataTreeStore};

/// Session-scoped transaction surface over the datastore backend
pub struct TransactionProvider {
    session: SessionId,
    store: Arc<dyn DataTreeStore>,
    locks: Arc<LockManager>,
    candidate: Option<TransactionChain>,
}

impl TransactionProvider {
    /// Create a provider for one session
    pub fn new(session: SessionId, store: Arc<dyn DataTreeStore>, locks: Arc<LockManager>) -> Self {
        Self {
            session,
            store,
            locks,
            candidate: None,
        }
    }

    /// The session this provider serves
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Number of transactions submitted into the candidate chain
    pub fn candidate_generation(&self) -> u64 {
        self.candidate.as_ref().map_or(0, |chain| chain.generation())
    }

    /// Open a read-write transaction against a datastore view
    ///
    /// Candidate transactions observe the chain tip (prior uncommitted
    /// edits included); running and operational transactions observe the
    /// committed store state.
    ///
    /// # Errors
    ///
    /// Returns `lock-denied` when another session holds the candidate
    /// lock and the target is the candidate.
    pub async fn new_read_write_transaction(
        &mut self,
        datastore: Datastore,
    ) -> Result<ReadWriteTransaction> {
        match datastore {
            Datastore::Candidate => {
                if let Some(holder) = self.locks.held_by_other(&self.session) {
                    return Err(RpcError::new(ErrorType::Protocol, ErrorTag::LockDenied)
                        .with_message("candidate datastore is locked by another session")
                        .with_session(holder.as_str()));
                }
                self.ensure_candidate_chain().await?;
                let chain = self.candidate.as_ref().expect("chain just ensured");
                Ok(chain.open_transaction().map_err(RpcError::from)?)
            }
            Datastore::Running => {
                let seed = self
                    .store
                    .snapshot(LogicalDatastore::Configuration)
                    .await
                    .map_err(RpcError::from)?;
                Ok(ReadWriteTransaction::new(Datastore::Running, seed))
            }
            Datastore::Operational => {
                let seed = self
                    .store
                    .snapshot(LogicalDatastore::Operational)
                    .await
                    .map_err(RpcError::from)?;
                Ok(ReadWriteTransaction::new(Datastore::Operational, seed))
            }
        }
    }

    /// Submit a transaction
    ///
    /// Candidate transactions advance the chain tip and publish nothing;
    /// running and operational transactions publish their working tree
    /// into the backend immediately.
    pub async fn submit(&mut self, tx: ReadWriteTransaction) -> Result<Option<CommitInfo>> {
        match tx.datastore() {
            Datastore::Candidate => {
                let chain = self.candidate.get_or_insert_with(|| {
                    TransactionChain::new(Datastore::Candidate, DataNode::data_root())
                });
                chain.submit(tx).map_err(RpcError::from)?;
                debug!(
                    session = self.session.as_str(),
                    generation = chain.generation(),
                    "candidate chain advanced"
                );
                Ok(None)
            }
            Datastore::Running => {
                let info = self
                    .store
                    .publish(LogicalDatastore::Configuration, tx.into_root())
                    .await
                    .map_err(RpcError::from)?;
                Ok(Some(info))
            }
            Datastore::Operational => {
                let info = self
                    .store
                    .publish(LogicalDatastore::Operational, tx.into_root())
                    .await
                    .map_err(RpcError::from)?;
                Ok(Some(info))
            }
        }
    }

    /// Read the subtree at `path` from a datastore view
    ///
    /// Candidate reads observe the session's uncommitted chain tip when a
    /// chain exists, and fall back to running (the candidate mirrors
    /// running until first edited). Running reads never observe candidate
    /// edits.
    pub async fn read(
        &self,
        datastore: Datastore,
        path: &InstanceId,
    ) -> Result<Option<DataNode>> {
        match (datastore, &self.candidate) {
            (Datastore::Candidate, Some(chain)) => {
                Ok(conifer_core::ops::lookup(chain.tip(), path).cloned())
            }
            (view, _) => Ok(self
                .store
                .read(view.logical(), path)
                .await
                .map_err(RpcError::from)?),
        }
    }

    /// Check whether `path` is populated in a datastore view
    pub async fn exists(&self, datastore: Datastore, path: &InstanceId) -> Result<bool> {
        Ok(self.read(datastore, path).await?.is_some())
    }

    /// Validate the candidate and publish it into running atomically
    ///
    /// With no candidate chain this is a successful no-op (`None`). On
    /// structural validation failure the candidate is left untouched; on
    /// backend failure the transaction chain is abandoned.
    ///
    /// # Errors
    ///
    /// * `lock-denied` - another session holds the candidate lock
    /// * validation errors from [`validate_tree`]
    /// * `operation-failed` - backend publication failure
    pub async fn commit(&mut self, schema: &SchemaContext) -> Result<Option<CommitInfo>> {
        if let Some(holder) = self.locks.held_by_other(&self.session) {
            return Err(RpcError::new(ErrorType::Protocol, ErrorTag::LockDenied)
                .with_message("candidate datastore is locked by another session")
                .with_session(holder.as_str()));
        }
        let Some(chain) = &self.candidate else {
            return Ok(None);
        };

        // Structural validation failure leaves the candidate untouched
        validate_tree(chain.tip(), schema)?;

        let tip = chain.tip().clone();
        match self.store.publish(LogicalDatastore::Configuration, tip).await {
            Ok(info) => {
                // Successful commit requires a fresh chain
                self.candidate = None;
                debug!(
                    session = self.session.as_str(),
                    revision = info.revision,
                    "candidate committed into running"
                );
                Ok(Some(info))
            }
            Err(err) => {
                // Backend failure abandons the in-flight transaction
                self.candidate = None;
                Err(RpcError::from(err))
            }
        }
    }

    /// Drop uncommitted candidate edits; idempotent
    pub fn discard_changes(&mut self) {
        if let Some(mut chain) = self.candidate.take() {
            chain.close();
            debug!(session = self.session.as_str(), "candidate changes discarded");
        }
    }

    /// Acquire the advisory lock on a datastore view
    ///
    /// # Errors
    ///
    /// * `operation-not-supported` (protocol) - running/operational are
    ///   never lockable in this design, by policy
    /// * `lock-denied` - the candidate lock is already held
    pub fn lock(&mut self, target: Datastore) -> Result<()> {
        match target {
            Datastore::Candidate => self.locks.acquire(&self.session).map_err(RpcError::from),
            other => Err(
                RpcError::new(ErrorType::Protocol, ErrorTag::OperationNotSupported)
                    .with_message(format!("{} datastore cannot be locked", other)),
            ),
        }
    }

    /// Release the advisory lock on a datastore view
    ///
    /// # Errors
    ///
    /// * `operation-not-supported` (protocol) - running/operational
    /// * `operation-failed` (protocol) - lock not held by this session
    pub fn unlock(&mut self, target: Datastore) -> Result<()> {
        match target {
            Datastore::Candidate => self.locks.release(&self.session).map_err(|_| {
                RpcError::new(ErrorType::Protocol, ErrorTag::OperationFailed)
                    .with_message("lock is not held by this session")
            }),
            other => Err(
                RpcError::new(ErrorType::Protocol, ErrorTag::OperationNotSupported)
                    .with_message(format!("{} datastore cannot be unlocked", other)),
            ),
        }
    }

    /// Session teardown: abandon the chain and release any held lock
    ///
    /// An in-flight commit is never cancelled mid-flight - callers await
    /// it before tearing the session down.
    pub fn close(&mut self) {
        self.discard_changes();
        self.locks.release_if_held(&self.session);
    }

    async fn ensure_candidate_chain(&mut self) -> Result<()> {
        if self.candidate.is_none() {
            let seed = self
                .store
                .snapshot(LogicalDatastore::Configuration)
                .await
                .map_err(RpcError::from)?;
            self.candidate = Some(TransactionChain::new(Datastore::Candidate, seed));
        }
        Ok(())
    }
}

impl Drop for TransactionProvider {
    fn drop(&mut self) {
        self.locks.release_if_held(&self.session);
    }
}
