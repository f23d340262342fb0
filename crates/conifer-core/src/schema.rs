//! Schema context model and provider seam
//!
//! The YANG toolchain that compiles schemas is an external collaborator;
//! this module defines the slice of schema information the middleware
//! consumes: node kinds, list key declarations, mandatory flags, and
//! name-based child lookup that resolves transparently through
//! choice/case levels (data trees never contain choice or case nodes).

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::model::{InstanceId, PathArgument, QName};

/// Statement kind of a schema node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaKind {
    Container,
    List {
        keys: Vec<QName>,
        user_ordered: bool,
    },
    Leaf,
    LeafList,
    Choice,
    Case,
}

/// One node of the compiled schema tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub name: QName,
    pub kind: SchemaKind,
    pub mandatory: bool,
    pub children: Vec<SchemaNode>,
}

impl SchemaNode {
    /// Create a container schema node
    pub fn container(name: QName) -> Self {
        Self {
            name,
            kind: SchemaKind::Container,
            mandatory: false,
            children: Vec::new(),
        }
    }

    /// Create a list schema node with its key set
    pub fn list(name: QName, keys: Vec<QName>) -> Self {
        Self {
            name,
            kind: SchemaKind::List {
                keys,
                user_ordered: false,
            },
            mandatory: false,
            children: Vec::new(),
        }
    }

    /// Create a leaf schema node
    pub fn leaf(name: QName) -> Self {
        Self {
            name,
            kind: SchemaKind::Leaf,
            mandatory: false,
            children: Vec::new(),
        }
    }

    /// Create a leaf-list schema node
    pub fn leaf_list(name: QName) -> Self {
        Self {
            name,
            kind: SchemaKind::LeafList,
            mandatory: false,
            children: Vec::new(),
        }
    }

    /// Create a choice schema node (children must be cases)
    pub fn choice(name: QName) -> Self {
        Self {
            name,
            kind: SchemaKind::Choice,
            mandatory: false,
            children: Vec::new(),
        }
    }

    /// Create a case schema node
    pub fn case(name: QName) -> Self {
        Self {
            name,
            kind: SchemaKind::Case,
            mandatory: false,
            children: Vec::new(),
        }
    }

    /// Mark this node mandatory
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Mark a list as user-ordered
    pub fn user_ordered(mut self) -> Self {
        if let SchemaKind::List { keys, .. } = self.kind.clone() {
            self.kind = SchemaKind::List {
                keys,
                user_ordered: true,
            };
        }
        self
    }

    /// Append a child schema node (builder style)
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children.push(child);
        self
    }

    /// Declared key QNames, for lists
    pub fn list_keys(&self) -> Option<&[QName]> {
        match &self.kind {
            SchemaKind::List { keys, .. } => Some(keys),
            _ => None,
        }
    }

    /// Find a data child by name, resolving through choice/case levels
    ///
    /// Choice and case nodes never appear in data trees, so a data child
    /// named `n` may live arbitrarily deep under nested choices. The first
    /// match in schema order wins; at most one case of a choice can be
    /// active in valid data, so schema order is a deterministic tie-break.
    pub fn data_child(&self, qname: &QName) -> Option<&SchemaNode> {
        for child in &self.children {
            match child.kind {
                SchemaKind::Choice | SchemaKind::Case => {
                    if let Some(found) = child.data_child(qname) {
                        return Some(found);
                    }
                }
                _ => {
                    if &child.name == qname {
                        return Some(child);
                    }
                }
            }
        }
        None
    }

    /// The choice node (if any) that a data child resolves through
    ///
    /// Used by validation to enforce the single-active-case constraint.
    pub fn choice_of(&self, qname: &QName) -> Option<&SchemaNode> {
        for child in &self.children {
            if child.kind == SchemaKind::Choice && child.data_child(qname).is_some() {
                return Some(child);
            }
        }
        None
    }

    /// The case of this choice that a data child belongs to
    ///
    /// Only meaningful on choice nodes; returns None elsewhere.
    pub fn case_of(&self, qname: &QName) -> Option<&SchemaNode> {
        if self.kind != SchemaKind::Choice {
            return None;
        }
        self.children
            .iter()
            .find(|case| case.data_child(qname).is_some() || &case.name == qname)
    }
}

/// Compiled schema tree with path lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaContext {
    root: SchemaNode,
}

impl SchemaContext {
    /// Wrap a schema forest under a synthetic root container
    pub fn new(top_level: Vec<SchemaNode>) -> Self {
        let mut root = SchemaNode::container(QName::unqualified("data"));
        root.children = top_level;
        Self { root }
    }

    /// The synthetic root node
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Find the schema node addressed by an instance identifier
    ///
    /// Returns None when any step names no schema node. ListEntry steps
    /// resolve to the list schema node itself (entries share the list's
    /// schema).
    pub fn find_node(&self, path: &InstanceId) -> Option<&SchemaNode> {
        let mut current = &self.root;
        for arg in path.args() {
            current = current.data_child(arg.qname())?;
            if let PathArgument::ListEntry(_, _) = arg {
                if current.list_keys().is_none() {
                    return None;
                }
            }
        }
        Some(current)
    }
}

/// Seam to the external schema toolchain
///
/// The toolchain compiles and recompiles schemas out of band; consumers
/// hold a provider, read the current context per request, and may register
/// for update notification.
pub trait SchemaContextProvider: Send + Sync {
    /// The currently effective schema context
    fn schema_context(&self) -> Arc<SchemaContext>;

    /// Register a callback fired on every schema update
    fn register_listener(&self, listener: Box<dyn Fn(&Arc<SchemaContext>) + Send + Sync>);
}

/// Provider over a fixed schema, with manual update for tests
pub struct StaticSchemaProvider {
    current: Mutex<Arc<SchemaContext>>,
    listeners: Mutex<Vec<Box<dyn Fn(&Arc<SchemaContext>) + Send + Sync>>>,
}

impl StaticSchemaProvider {
    /// Create a provider serving the given context
    pub fn new(context: SchemaContext) -> Self {
        Self {
            current: Mutex::new(Arc::new(context)),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Swap in a new context and notify listeners
    pub fn update(&self, context: SchemaContext) {
        let context = Arc::new(context);
        *self.current.lock().expect("schema provider poisoned") = Arc::clone(&context);
        for listener in self.listeners.lock().expect("schema provider poisoned").iter() {
            listener(&context);
        }
    }
}

impl SchemaContextProvider for StaticSchemaProvider {
    fn schema_context(&self) -> Arc<SchemaContext> {
        Arc::clone(&self.current.lock().expect("schema provider poisoned"))
    }

    fn register_listener(&self, listener: Box<dyn Fn(&Arc<SchemaContext>) + Send + Sync>) {
        self.listeners
            .lock()
            .expect("schema provider poisoned")
            .push(listener);
    }
}
