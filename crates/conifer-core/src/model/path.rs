use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::qname::QName;

/// One step of an instance identifier
///
/// `Node` addresses a container, leaf, leaf-list or a whole list;
/// `ListEntry` narrows into a single keyed entry of a list. Key predicates
/// are kept ordered by key QName so that two identifiers addressing the
/// same entry compare equal regardless of predicate spelling order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathArgument {
    Node(QName),
    ListEntry(QName, BTreeMap<QName, String>),
}

impl PathArgument {
    /// The node name this argument addresses
    pub fn qname(&self) -> &QName {
        match self {
            PathArgument::Node(q) => q,
            PathArgument::ListEntry(q, _) => q,
        }
    }

    /// Key predicates, if this argument narrows into a list entry
    pub fn keys(&self) -> Option<&BTreeMap<QName, String>> {
        match self {
            PathArgument::Node(_) => None,
            PathArgument::ListEntry(_, keys) => Some(keys),
        }
    }
}

impl std::fmt::Display for PathArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathArgument::Node(q) => write!(f, "{}", q),
            PathArgument::ListEntry(q, keys) => {
                write!(f, "{}", q)?;
                for (key, value) in keys {
                    write!(f, "[{}='{}']", key, value)?;
                }
                Ok(())
            }
        }
    }
}

/// Instance identifier: ordered sequence of path arguments
///
/// The empty sequence addresses the datastore document root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(Vec<PathArgument>);

impl InstanceId {
    /// The document root identifier
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create an identifier from explicit arguments
    pub fn new(args: Vec<PathArgument>) -> Self {
        Self(args)
    }

    /// Convenience constructor: a chain of plain node steps
    pub fn of_nodes<I>(names: I) -> Self
    where
        I: IntoIterator<Item = QName>,
    {
        Self(names.into_iter().map(PathArgument::Node).collect())
    }

    /// Check whether this identifier addresses the document root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of path arguments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no path arguments
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the path arguments
    pub fn args(&self) -> &[PathArgument] {
        &self.0
    }

    /// The last path argument, if any
    pub fn last(&self) -> Option<&PathArgument> {
        self.0.last()
    }

    /// The identifier of this node's parent (None at the root)
    pub fn parent(&self) -> Option<InstanceId> {
        if self.0.is_empty() {
            None
        } else {
            Some(InstanceId(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Extend this identifier by one argument
    pub fn child(&self, arg: PathArgument) -> InstanceId {
        let mut args = self.0.clone();
        args.push(arg);
        InstanceId(args)
    }

    /// Extend this identifier by a plain node step
    pub fn child_node(&self, qname: QName) -> InstanceId {
        self.child(PathArgument::Node(qname))
    }

    /// Extend this identifier by a keyed list-entry step
    pub fn child_entry(&self, qname: QName, keys: BTreeMap<QName, String>) -> InstanceId {
        self.child(PathArgument::ListEntry(qname, keys))
    }

    /// Check whether `prefix` is an ancestor-or-self of this identifier
    pub fn starts_with(&self, prefix: &InstanceId) -> bool {
        prefix.0.len() <= self.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Concatenate a relative identifier onto this one
    pub fn join(&self, relative: &InstanceId) -> InstanceId {
        let mut args = self.0.clone();
        args.extend(relative.0.iter().cloned());
        InstanceId(args)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for arg in &self.0 {
            write!(f, "/{}", arg)?;
        }
        Ok(())
    }
}

impl From<Vec<PathArgument>> for InstanceId {
    fn from(args: Vec<PathArgument>) -> Self {
        Self(args)
    }
}
