//! Session context
//!
//! One `Session` per protocol connection. The session owns its transaction
//! provider (and with it the candidate chain and lock-holder state) and is
//! passed by handle through every operation call - no ambient or
//! thread-local state anywhere in the request path.

use std::sync::Arc;

use conifer_core::schema::{SchemaContext, SchemaContextProvider};
use conifer_core_types::SessionId;
use conifer_store::{DataTreeStore, LockManager, TransactionProvider};

use crate::files::FileService;

/// Per-connection context owning transactional state
pub struct Session {
    id: SessionId,
    provider: TransactionProvider,
    schema_provider: Arc<dyn SchemaContextProvider>,
    store: Arc<dyn DataTreeStore>,
    files: Arc<FileService>,
}

impl Session {
    /// Open a session against shared store, lock and schema services
    pub fn new(
        store: Arc<dyn DataTreeStore>,
        locks: Arc<LockManager>,
        schema_provider: Arc<dyn SchemaContextProvider>,
        files: Arc<FileService>,
    ) -> Self {
        let id = SessionId::new();
        let provider = TransactionProvider::new(id.clone(), Arc::clone(&store), locks);
        Self {
            id,
            provider,
            schema_provider,
            store,
            files,
        }
    }

    /// This session's identifier
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The session's transaction provider
    pub fn provider(&mut self) -> &mut TransactionProvider {
        &mut self.provider
    }

    /// Read-only access to the transaction provider
    pub fn provider_ref(&self) -> &TransactionProvider {
        &self.provider
    }

    /// The currently effective schema context
    pub fn schema(&self) -> Arc<SchemaContext> {
        self.schema_provider.schema_context()
    }

    /// The shared datastore backend (for lock-free concurrent reads)
    pub fn store(&self) -> Arc<dyn DataTreeStore> {
        Arc::clone(&self.store)
    }

    /// The URL file-service collaborator
    pub fn files(&self) -> &FileService {
        &self.files
    }

    /// Session teardown: abandon pending transactions, release locks
    ///
    /// An in-flight commit is awaited by its caller before teardown; this
    /// only cancels what is still pending.
    pub fn close(&mut self) {
        self.provider.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
