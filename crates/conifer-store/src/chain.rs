//! Transaction chains and read-write transactions
//!
//! A chain is the per-session, per-datastore sequence of transactions. The
//! chain tip is the tree the next transaction observes, so sequential
//! edits compose before commit: transaction N+1 reads what transaction N
//! wrote, while nothing leaks into the backing store until the provider
//! publishes the tip.

use conifer_core::model::{DataNode, InstanceId};
use conifer_core::ops::{self, EditEntity};

use crate::datastore::Datastore;
use crate::errors::{Result, StoreError};

/// One read-write transaction over a working tree
///
/// Reads observe the transaction's own uncommitted writes. The
/// transaction is buffered: nothing reaches the chain until `submit`.
#[derive(Debug)]
pub struct ReadWriteTransaction {
    datastore: Datastore,
    root: DataNode,
    dirty: bool,
}

impl ReadWriteTransaction {
    pub(crate) fn new(datastore: Datastore, root: DataNode) -> Self {
        Self {
            datastore,
            root,
            dirty: false,
        }
    }

    /// The datastore view this transaction targets
    pub fn datastore(&self) -> Datastore {
        self.datastore
    }

    /// Read the subtree at `path` from the working tree
    pub fn read(&self, path: &InstanceId) -> Option<DataNode> {
        ops::lookup(&self.root, path).cloned()
    }

    /// Check whether `path` is populated in the working tree
    pub fn exists(&self, path: &InstanceId) -> bool {
        ops::exists(&self.root, path)
    }

    /// Apply one edit entity to the working tree
    ///
    /// # Errors
    ///
    /// Propagates the edit-semantics errors (`data-exists`,
    /// `data-missing`, `bad-element`) unchanged; a failed entity leaves
    /// the working tree exactly as the previous entity left it.
    pub fn apply(&mut self, entity: &EditEntity) -> conifer_core::errors::Result<()> {
        ops::apply_edit(&mut self.root, entity)?;
        self.dirty = true;
        Ok(())
    }

    /// Overwrite the whole working tree
    pub fn replace_root(&mut self, root: DataNode) {
        self.root = root;
        self.dirty = true;
    }

    /// Whether any edit has touched the working tree
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the transaction, yielding the working tree
    pub fn into_root(self) -> DataNode {
        self.root
    }
}

/// Ordered transaction sequence against one datastore view
#[derive(Debug)]
pub struct TransactionChain {
    datastore: Datastore,
    tip: DataNode,
    generation: u64,
    closed: bool,
}

impl TransactionChain {
    /// Start a chain whose first transaction observes `seed`
    pub fn new(datastore: Datastore, seed: DataNode) -> Self {
        Self {
            datastore,
            tip: seed,
            generation: 0,
            closed: false,
        }
    }

    /// The datastore view this chain serves
    pub fn datastore(&self) -> Datastore {
        self.datastore
    }

    /// The tree the next transaction will observe
    pub fn tip(&self) -> &DataNode {
        &self.tip
    }

    /// Number of transactions submitted into this chain
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Open a new transaction observing the chain tip
    ///
    /// # Errors
    ///
    /// Returns `ChainClosed` after `close`.
    pub fn open_transaction(&self) -> Result<ReadWriteTransaction> {
        if self.closed {
            return Err(StoreError::ChainClosed {
                datastore: self.datastore.as_str().to_string(),
            });
        }
        Ok(ReadWriteTransaction::new(self.datastore, self.tip.clone()))
    }

    /// Submit a transaction: its working tree becomes the chain tip
    ///
    /// # Errors
    ///
    /// Returns `ChainClosed` after `close`, `DatastoreMismatch` when the
    /// transaction was opened against a different view.
    pub fn submit(&mut self, tx: ReadWriteTransaction) -> Result<()> {
        if self.closed {
            return Err(StoreError::ChainClosed {
                datastore: self.datastore.as_str().to_string(),
            });
        }
        if tx.datastore() != self.datastore {
            return Err(StoreError::DatastoreMismatch {
                expected: self.datastore.as_str().to_string(),
                actual: tx.datastore().as_str().to_string(),
            });
        }
        self.tip = tx.into_root();
        self.generation += 1;
        Ok(())
    }

    /// Close the chain; subsequent opens and submits fail
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conifer_core::model::QName;
    use conifer_core::ops::EditOperation;

    fn q(local: &str) -> QName {
        QName::new("test", local)
    }

    fn hostname_entity(value: &str) -> EditEntity {
        EditEntity {
            path: InstanceId::of_nodes(vec![q("top"), q("hostname")]),
            operation: EditOperation::Merge,
            payload: DataNode::leaf(q("hostname"), value),
        }
    }

    #[test]
    fn test_chain_composes_sequential_transactions() {
        let mut chain = TransactionChain::new(Datastore::Candidate, DataNode::data_root());

        let mut tx1 = chain.open_transaction().unwrap();
        tx1.apply(&hostname_entity("rt1")).unwrap();
        chain.submit(tx1).unwrap();

        // The next transaction observes the previous one's writes
        let tx2 = chain.open_transaction().unwrap();
        assert!(tx2.exists(&InstanceId::of_nodes(vec![q("top"), q("hostname")])));
        assert_eq!(chain.generation(), 1);
    }

    #[test]
    fn test_unsubmitted_transaction_does_not_move_tip() {
        let chain = TransactionChain::new(Datastore::Candidate, DataNode::data_root());

        let mut tx = chain.open_transaction().unwrap();
        tx.apply(&hostname_entity("rt1")).unwrap();
        drop(tx);

        let fresh = chain.open_transaction().unwrap();
        assert!(!fresh.exists(&InstanceId::of_nodes(vec![q("top"), q("hostname")])));
    }

    #[test]
    fn test_closed_chain_rejects_operations() {
        let mut chain = TransactionChain::new(Datastore::Candidate, DataNode::data_root());
        let tx = chain.open_transaction().unwrap();
        chain.close();

        assert!(matches!(
            chain.open_transaction(),
            Err(StoreError::ChainClosed { .. })
        ));
        assert!(matches!(chain.submit(tx), Err(StoreError::ChainClosed { .. })));
    }

    #[test]
    fn test_submit_rejects_foreign_transaction() {
        let mut chain = TransactionChain::new(Datastore::Candidate, DataNode::data_root());
        let foreign = ReadWriteTransaction::new(Datastore::Running, DataNode::data_root());
        assert!(matches!(
            chain.submit(foreign),
            Err(StoreError::DatastoreMismatch { .. })
        ));
    }

    #[test]
    fn test_failed_apply_leaves_prior_edits_intact() {
        let mut chain = TransactionChain::new(Datastore::Candidate, DataNode::data_root());
        let mut tx = chain.open_transaction().unwrap();
        tx.apply(&hostname_entity("rt1")).unwrap();

        let delete_missing = EditEntity {
            path: InstanceId::of_nodes(vec![q("top"), q("domain")]),
            operation: EditOperation::Delete,
            payload: DataNode::leaf(q("domain"), ""),
        };
        assert!(tx.apply(&delete_missing).is_err());

        // The earlier edit survives the failed one
        assert!(tx.exists(&InstanceId::of_nodes(vec![q("top"), q("hostname")])));
    }
}
