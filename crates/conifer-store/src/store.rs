//! Versioned in-memory tree store
//!
//! One `DataTree` per logical datastore, guarded by an async RwLock.
//! Reads clone the addressed subtree out so callers never hold the lock
//! across their own awaits; publication swaps in a whole new root and
//! bumps the revision atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use conifer_core::model::{DataNode, InstanceId};
use conifer_core::ops::tree;

use crate::datastore::LogicalDatastore;
use crate::errors::Result;

/// One versioned datastore tree
#[derive(Debug, Clone, PartialEq)]
pub struct DataTree {
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
    pub root: DataNode,
}

impl DataTree {
    /// A fresh, empty tree at revision zero
    pub fn empty() -> Self {
        Self {
            revision: 0,
            updated_at: Utc::now(),
            root: DataNode::data_root(),
        }
    }
}

/// Result of a successful publication into a datastore
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub datastore: LogicalDatastore,
    pub revision: u64,
    pub committed_at: DateTime<Utc>,
}

/// The datastore backend seam
///
/// Every operation returns a future; handlers compose them without
/// blocking a worker thread. The in-memory implementation below is the
/// backend this middleware ships with; a durable backend implements the
/// same trait.
#[async_trait]
pub trait DataTreeStore: Send + Sync {
    /// Read the subtree at `path`, if populated
    async fn read(
        &self,
        datastore: LogicalDatastore,
        path: &InstanceId,
    ) -> Result<Option<DataNode>>;

    /// Check whether `path` addresses a populated node
    async fn exists(&self, datastore: LogicalDatastore, path: &InstanceId) -> Result<bool>;

    /// Clone the whole tree root (seeds candidate chains)
    async fn snapshot(&self, datastore: LogicalDatastore) -> Result<DataNode>;

    /// Current revision of a datastore
    async fn revision(&self, datastore: LogicalDatastore) -> Result<u64>;

    /// Atomically replace a datastore's tree, bumping its revision
    async fn publish(&self, datastore: LogicalDatastore, root: DataNode) -> Result<CommitInfo>;

    /// Merge a subtree into the operational datastore in place
    ///
    /// Operational state is fed by collaborators outside any candidate
    /// lifecycle, so it gets a direct merge rather than a transaction.
    async fn merge_operational(&self, path: &InstanceId, node: DataNode) -> Result<CommitInfo>;
}

/// The in-memory backend: one RwLock-guarded tree per logical datastore
pub struct InMemoryDataStore {
    configuration: RwLock<DataTree>,
    operational: RwLock<DataTree>,
}

impl InMemoryDataStore {
    /// Create a store with empty configuration and operational trees
    pub fn new() -> Self {
        Self {
            configuration: RwLock::new(DataTree::empty()),
            operational: RwLock::new(DataTree::empty()),
        }
    }

    fn tree(&self, datastore: LogicalDatastore) -> &RwLock<DataTree> {
        match datastore {
            LogicalDatastore::Configuration => &self.configuration,
            LogicalDatastore::Operational => &self.operational,
        }
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataTreeStore for InMemoryDataStore {
    async fn read(
        &self,
        datastore: LogicalDatastore,
        path: &InstanceId,
    ) -> Result<Option<DataNode>> {
        let tree = self.tree(datastore).read().await;
        Ok(tree::lookup(&tree.root, path).cloned())
    }

    async fn exists(&self, datastore: LogicalDatastore, path: &InstanceId) -> Result<bool> {
        let tree = self.tree(datastore).read().await;
        Ok(tree::exists(&tree.root, path))
    }

    async fn snapshot(&self, datastore: LogicalDatastore) -> Result<DataNode> {
        let tree = self.tree(datastore).read().await;
        Ok(tree.root.clone())
    }

    async fn revision(&self, datastore: LogicalDatastore) -> Result<u64> {
        let tree = self.tree(datastore).read().await;
        Ok(tree.revision)
    }

    async fn publish(&self, datastore: LogicalDatastore, root: DataNode) -> Result<CommitInfo> {
        let mut tree = self.tree(datastore).write().await;
        tree.root = root;
        tree.revision += 1;
        tree.updated_at = Utc::now();
        debug!(
            datastore = datastore.as_str(),
            revision = tree.revision,
            "published datastore tree"
        );
        Ok(CommitInfo {
            datastore,
            revision: tree.revision,
            committed_at: tree.updated_at,
        })
    }

    async fn merge_operational(&self, path: &InstanceId, node: DataNode) -> Result<CommitInfo> {
        let mut tree = self.operational.write().await;
        tree::merge_at(&mut tree.root, path, node)
            .map_err(|err| crate::errors::StoreError::Backend {
                message: err.to_string(),
            })?;
        tree.revision += 1;
        tree.updated_at = Utc::now();
        Ok(CommitInfo {
            datastore: LogicalDatastore::Operational,
            revision: tree.revision,
            committed_at: tree.updated_at,
        })
    }
}
