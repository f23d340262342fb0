//! Edit entities: the unit of mutation an edit request decomposes into
//!
//! A configuration edit arrives as one payload tree plus per-node operation
//! annotations (the codec extracts operation attributes into a path-keyed
//! map). `split_edits` decomposes that into a document-ordered list of
//! entities, each carrying the most specific operation that applies to its
//! subtree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorTag, ErrorType, Result, RpcError};
use crate::model::{DataNode, InstanceId, PathArgument};

/// Per-node edit operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOperation {
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
    /// Navigation only: the node itself is untouched
    None,
}

impl EditOperation {
    /// Parse a wire operation string
    ///
    /// # Errors
    ///
    /// Returns `invalid-value` for strings outside the operation set.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(EditOperation::Merge),
            "replace" => Ok(EditOperation::Replace),
            "create" => Ok(EditOperation::Create),
            "delete" => Ok(EditOperation::Delete),
            "remove" => Ok(EditOperation::Remove),
            "none" => Ok(EditOperation::None),
            other => Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                .with_message(format!("unknown edit operation '{}'", other))),
        }
    }

    /// The wire string for this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            EditOperation::Merge => "merge",
            EditOperation::Replace => "replace",
            EditOperation::Create => "create",
            EditOperation::Delete => "delete",
            EditOperation::Remove => "remove",
            EditOperation::None => "none",
        }
    }
}

/// Envelope-level fallback operation for un-annotated payload material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultOperation {
    #[default]
    Merge,
    Replace,
    None,
}

impl DefaultOperation {
    /// Parse a wire default-operation string
    ///
    /// # Errors
    ///
    /// Returns `invalid-value` for strings outside {merge, replace, none}.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(DefaultOperation::Merge),
            "replace" => Ok(DefaultOperation::Replace),
            "none" => Ok(DefaultOperation::None),
            other => Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                .with_message(format!("unknown default-operation '{}'", other))),
        }
    }

    /// The wire string for this default
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultOperation::Merge => "merge",
            DefaultOperation::Replace => "replace",
            DefaultOperation::None => "none",
        }
    }

    fn to_operation(self) -> Option<EditOperation> {
        match self {
            DefaultOperation::Merge => Some(EditOperation::Merge),
            DefaultOperation::Replace => Some(EditOperation::Replace),
            DefaultOperation::None => None,
        }
    }
}

/// One requested mutation: target path, operation, payload subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditEntity {
    pub path: InstanceId,
    pub operation: EditOperation,
    pub payload: DataNode,
}

/// Decompose an edit payload into document-ordered edit entities
///
/// An annotated node wins over the inherited default and claims its whole
/// subtree; a node annotated `none` contributes navigation only and its
/// children are visited individually. Un-annotated subtrees with no
/// annotated descendants inherit the default operation wholesale;
/// `default-operation=none` drops them.
///
/// # Errors
///
/// Returns `malformed-message` when a list payload contains a child that
/// is not a keyed entry (entries without keys cannot be addressed).
pub fn split_edits(
    config: &DataNode,
    annotations: &BTreeMap<InstanceId, EditOperation>,
    default_op: DefaultOperation,
) -> Result<Vec<EditEntity>> {
    let mut entities = Vec::new();
    if let Some(children) = config.children() {
        for child in children {
            let path = InstanceId::root().child(step_for(child)?);
            walk(child, path, annotations, default_op, &mut entities)?;
        }
    }
    Ok(entities)
}

fn walk(
    node: &DataNode,
    path: InstanceId,
    annotations: &BTreeMap<InstanceId, EditOperation>,
    default_op: DefaultOperation,
    out: &mut Vec<EditEntity>,
) -> Result<()> {
    match annotations.get(&path) {
        Some(EditOperation::None) => return descend(node, &path, annotations, default_op, out),
        Some(op) => {
            out.push(EditEntity {
                path,
                operation: *op,
                payload: node.clone(),
            });
            return Ok(());
        }
        None => {}
    }

    let annotated_below = annotations
        .keys()
        .any(|key| covers(&path, key) && key != &path);
    if annotated_below {
        descend(node, &path, annotations, default_op, out)
    } else if let Some(operation) = default_op.to_operation() {
        out.push(EditEntity {
            path,
            operation,
            payload: node.clone(),
        });
        Ok(())
    } else {
        Ok(())
    }
}

fn descend(
    node: &DataNode,
    path: &InstanceId,
    annotations: &BTreeMap<InstanceId, EditOperation>,
    default_op: DefaultOperation,
    out: &mut Vec<EditEntity>,
) -> Result<()> {
    match node {
        DataNode::Container { children, .. } | DataNode::ListEntry { children, .. } => {
            for child in children {
                let child_path = path.child(step_for(child)?);
                walk(child, child_path, annotations, default_op, out)?;
            }
            Ok(())
        }
        DataNode::List { entries, .. } => {
            // Entry steps replace the list's own step: an entry path is
            // `<list parent>/<list>[keys]`, not a child of the list step
            let parent = path.parent().unwrap_or_else(InstanceId::root);
            for entry in entries {
                let child_path = parent.child(step_for(entry)?);
                walk(entry, child_path, annotations, default_op, out)?;
            }
            Ok(())
        }
        // A leaf annotated `none` has nothing below it to process
        DataNode::Leaf { .. } | DataNode::LeafList { .. } => Ok(()),
    }
}

/// Ancestor-or-self check that lets a plain list step cover its entries
///
/// `/top/users/user` covers `/top/users/user[name='fred']/...`: the entry
/// step stands in for the list step it narrows.
fn covers(prefix: &InstanceId, key: &InstanceId) -> bool {
    if prefix.len() > key.len() {
        return false;
    }
    prefix.args().iter().zip(key.args()).all(|(p, k)| match (p, k) {
        (PathArgument::Node(pq), PathArgument::Node(kq)) => pq == kq,
        (PathArgument::Node(pq), PathArgument::ListEntry(kq, _)) => pq == kq,
        (PathArgument::ListEntry(pq, pk), PathArgument::ListEntry(kq, kk)) => {
            pq == kq && pk == kk
        }
        (PathArgument::ListEntry(..), PathArgument::Node(..)) => false,
    })
}

fn step_for(node: &DataNode) -> Result<PathArgument> {
    match node {
        DataNode::ListEntry { name, keys, .. } => {
            if keys.is_empty() {
                return Err(
                    RpcError::new(ErrorType::Protocol, ErrorTag::MalformedMessage)
                        .with_message(format!("list entry '{}' carries no keys", name)),
                );
            }
            Ok(PathArgument::ListEntry(name.clone(), keys.clone()))
        }
        other => Ok(PathArgument::Node(other.name().clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QName;

    fn q(local: &str) -> QName {
        QName::new("test", local)
    }

    fn payload() -> DataNode {
        // <config><top><hostname>rt1</hostname><users>...</users></top></config>
        let mut keys = BTreeMap::new();
        keys.insert(q("name"), "fred".to_string());
        let mut users = DataNode::container(q("users"));
        let mut user_list = DataNode::list(q("user"));
        user_list
            .entries_mut()
            .unwrap()
            .push(DataNode::list_entry(q("user"), keys));
        users.push_child(user_list);

        let mut top = DataNode::container(q("top"));
        top.push_child(DataNode::leaf(q("hostname"), "rt1"));
        top.push_child(users);

        let mut config = DataNode::data_root();
        config.push_child(top);
        config
    }

    #[test]
    fn test_unannotated_payload_is_one_default_entity() {
        let entities = split_edits(&payload(), &BTreeMap::new(), DefaultOperation::Merge).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].operation, EditOperation::Merge);
        assert_eq!(format!("{}", entities[0].path), "/test:top");
    }

    #[test]
    fn test_default_none_drops_unannotated_material() {
        let entities = split_edits(&payload(), &BTreeMap::new(), DefaultOperation::None).unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn test_annotated_subtree_wins_over_default() {
        let mut annotations = BTreeMap::new();
        let users_path = InstanceId::of_nodes(vec![q("top"), q("users")]);
        annotations.insert(users_path.clone(), EditOperation::Delete);

        let entities = split_edits(&payload(), &annotations, DefaultOperation::Merge).unwrap();
        // hostname inherits merge, users subtree becomes a delete
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].operation, EditOperation::Merge);
        assert_eq!(format!("{}", entities[0].path), "/test:top/test:hostname");
        assert_eq!(entities[1].operation, EditOperation::Delete);
        assert_eq!(entities[1].path, users_path);
    }

    #[test]
    fn test_document_order_preserved() {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            InstanceId::of_nodes(vec![q("top"), q("hostname")]),
            EditOperation::Replace,
        );
        annotations.insert(
            InstanceId::of_nodes(vec![q("top"), q("users")]),
            EditOperation::Remove,
        );

        let entities = split_edits(&payload(), &annotations, DefaultOperation::None).unwrap();
        // hostname precedes users in the payload document
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].operation, EditOperation::Replace);
        assert_eq!(entities[1].operation, EditOperation::Remove);
    }

    #[test]
    fn test_annotated_list_entry_gets_entry_path() {
        let mut keys = BTreeMap::new();
        keys.insert(q("name"), "fred".to_string());
        let entry_path = InstanceId::of_nodes(vec![q("top"), q("users")])
            .child(PathArgument::ListEntry(q("user"), keys));

        let mut annotations = BTreeMap::new();
        annotations.insert(entry_path.clone(), EditOperation::Delete);

        let entities = split_edits(&payload(), &annotations, DefaultOperation::Merge).unwrap();
        // hostname inherits merge; the entry becomes a delete at the
        // entry path, not at a path extended below the list step
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].operation, EditOperation::Delete);
        assert_eq!(entities[1].path, entry_path);
        assert_eq!(
            format!("{}", entities[1].path),
            "/test:top/test:users/test:user[test:name='fred']"
        );
    }

    #[test]
    fn test_parse_rejects_unknown_operation() {
        let err = EditOperation::parse("purge").unwrap_err();
        assert_eq!(err.tag(), ErrorTag::InvalidValue);
        assert_eq!(err.error_type(), ErrorType::Protocol);
    }

    #[test]
    fn test_default_operation_default_is_merge() {
        assert_eq!(DefaultOperation::default(), DefaultOperation::Merge);
    }
}
