use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::path::PathArgument;
use super::qname::QName;

/// One node of a configuration tree
///
/// Containers, list entries and lists keep their children in insertion
/// order; readers observe exactly the order writers produced. Values are
/// opaque strings - typed decoding belongs to the external YANG toolchain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataNode {
    Container {
        name: QName,
        children: Vec<DataNode>,
    },
    List {
        name: QName,
        /// Every entry is a `ListEntry` with this list's name
        entries: Vec<DataNode>,
    },
    ListEntry {
        name: QName,
        keys: BTreeMap<QName, String>,
        children: Vec<DataNode>,
    },
    Leaf {
        name: QName,
        value: String,
    },
    LeafList {
        name: QName,
        values: Vec<String>,
    },
}

impl DataNode {
    /// Create an empty container
    pub fn container(name: QName) -> Self {
        DataNode::Container {
            name,
            children: Vec::new(),
        }
    }

    /// Create an empty list
    pub fn list(name: QName) -> Self {
        DataNode::List {
            name,
            entries: Vec::new(),
        }
    }

    /// Create a list entry; its key leaves are materialized as children
    pub fn list_entry(name: QName, keys: BTreeMap<QName, String>) -> Self {
        let children = keys
            .iter()
            .map(|(key, value)| DataNode::leaf(key.clone(), value.clone()))
            .collect();
        DataNode::ListEntry {
            name,
            keys,
            children,
        }
    }

    /// Create a leaf
    pub fn leaf(name: QName, value: impl Into<String>) -> Self {
        DataNode::Leaf {
            name,
            value: value.into(),
        }
    }

    /// Create a leaf-list
    pub fn leaf_list(name: QName, values: Vec<String>) -> Self {
        DataNode::LeafList { name, values }
    }

    /// The synthetic document root every datastore tree hangs from
    pub fn data_root() -> Self {
        DataNode::container(QName::unqualified("data"))
    }

    /// The name of this node
    pub fn name(&self) -> &QName {
        match self {
            DataNode::Container { name, .. }
            | DataNode::List { name, .. }
            | DataNode::ListEntry { name, .. }
            | DataNode::Leaf { name, .. }
            | DataNode::LeafList { name, .. } => name,
        }
    }

    /// Borrow inner child nodes (containers and list entries only)
    pub fn children(&self) -> Option<&Vec<DataNode>> {
        match self {
            DataNode::Container { children, .. } | DataNode::ListEntry { children, .. } => {
                Some(children)
            }
            _ => None,
        }
    }

    /// Mutably borrow inner child nodes (containers and list entries only)
    pub fn children_mut(&mut self) -> Option<&mut Vec<DataNode>> {
        match self {
            DataNode::Container { children, .. } | DataNode::ListEntry { children, .. } => {
                Some(children)
            }
            _ => None,
        }
    }

    /// Borrow list entries
    pub fn entries(&self) -> Option<&Vec<DataNode>> {
        match self {
            DataNode::List { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Mutably borrow list entries
    pub fn entries_mut(&mut self) -> Option<&mut Vec<DataNode>> {
        match self {
            DataNode::List { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Key predicates of a list entry
    pub fn entry_keys(&self) -> Option<&BTreeMap<QName, String>> {
        match self {
            DataNode::ListEntry { keys, .. } => Some(keys),
            _ => None,
        }
    }

    /// True when this node holds no children / entries / values
    pub fn is_empty(&self) -> bool {
        match self {
            DataNode::Container { children, .. } | DataNode::ListEntry { children, .. } => {
                children.is_empty()
            }
            DataNode::List { entries, .. } => entries.is_empty(),
            DataNode::Leaf { .. } => false,
            DataNode::LeafList { values, .. } => values.is_empty(),
        }
    }

    /// Find a direct child addressed by one path argument
    ///
    /// `Node` arguments match containers, leaves, leaf-lists and whole
    /// lists by name; `ListEntry` arguments narrow through the named list
    /// into the entry with matching keys.
    pub fn child(&self, arg: &PathArgument) -> Option<&DataNode> {
        match arg {
            PathArgument::Node(qname) => self
                .children()?
                .iter()
                .find(|child| child.name() == qname),
            PathArgument::ListEntry(qname, keys) => {
                let list = self
                    .children()?
                    .iter()
                    .find(|child| child.name() == qname && matches!(child, DataNode::List { .. }))?;
                list.entries()?
                    .iter()
                    .find(|entry| entry.entry_keys() == Some(keys))
            }
        }
    }

    /// Mutable variant of [`DataNode::child`]
    pub fn child_mut(&mut self, arg: &PathArgument) -> Option<&mut DataNode> {
        match arg {
            PathArgument::Node(qname) => self
                .children_mut()?
                .iter_mut()
                .find(|child| child.name() == qname),
            PathArgument::ListEntry(qname, keys) => {
                let list = self.children_mut()?.iter_mut().find(|child| {
                    child.name() == qname && matches!(child, DataNode::List { .. })
                })?;
                list.entries_mut()?
                    .iter_mut()
                    .find(|entry| entry.entry_keys() == Some(keys))
            }
        }
    }

    /// Append a child, preserving insertion order
    ///
    /// Callers are responsible for not introducing duplicate names; the
    /// edit operations in `ops` go through merge/replace for that.
    pub fn push_child(&mut self, child: DataNode) {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(name: &str) -> BTreeMap<QName, String> {
        let mut keys = BTreeMap::new();
        keys.insert(QName::new("test", "name"), name.to_string());
        keys
    }

    #[test]
    fn test_container_child_lookup() {
        let mut top = DataNode::container(QName::new("test", "top"));
        top.push_child(DataNode::leaf(QName::new("test", "hostname"), "rt1"));

        let arg = PathArgument::Node(QName::new("test", "hostname"));
        let child = top.child(&arg).unwrap();
        assert_eq!(child.name().local_name, "hostname");
    }

    #[test]
    fn test_list_entry_lookup_by_keys() {
        let mut users = DataNode::list(QName::new("test", "user"));
        users
            .entries_mut()
            .unwrap()
            .push(DataNode::list_entry(QName::new("test", "user"), keyed("fred")));

        let mut top = DataNode::container(QName::new("test", "top"));
        top.push_child(users);

        let arg = PathArgument::ListEntry(QName::new("test", "user"), keyed("fred"));
        assert!(top.child(&arg).is_some());

        let missing = PathArgument::ListEntry(QName::new("test", "user"), keyed("barney"));
        assert!(top.child(&missing).is_none());
    }

    #[test]
    fn test_list_entry_materializes_key_leaves() {
        let entry = DataNode::list_entry(QName::new("test", "user"), keyed("fred"));
        let key_leaf = entry
            .child(&PathArgument::Node(QName::new("test", "name")))
            .unwrap();
        assert_eq!(
            key_leaf,
            &DataNode::leaf(QName::new("test", "name"), "fred")
        );
    }

    #[test]
    fn test_data_root_is_empty_container() {
        let root = DataNode::data_root();
        assert!(root.is_empty());
        assert_eq!(root.name().local_name, "data");
    }
}
