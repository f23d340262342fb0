//! Pre-commit structural validation
//!
//! Runs the structural checks both `commit` and `validate` rely on and
//! returns the first violation found. The checks, in order per node:
//!
//! 1. Every data node has a schema node (no unknown elements)
//! 2. List entries carry every declared key
//! 3. At most one case of any choice is active among a node's children
//! 4. Mandatory children are present under every populated node
//!
//! A completely empty tree is valid: mandatory constraints only bind
//! inside populated subtrees.

use crate::errors::{ErrorTag, ErrorType, Result, RpcError};
use crate::model::{DataNode, InstanceId, PathArgument, QName};
use crate::schema::{SchemaContext, SchemaKind, SchemaNode};

/// Validate a whole configuration tree against the schema
///
/// # Errors
///
/// Returns the first violation encountered:
/// * `unknown-element` (application) - data node without a schema node
/// * `invalid-value` (application) - missing list key, or more than one
///   active case under a choice
/// * `operation-failed` (application) - missing mandatory node
pub fn validate_tree(root: &DataNode, schema: &SchemaContext) -> Result<()> {
    validate_node(root, schema.root(), &InstanceId::root())
}

fn validate_node(node: &DataNode, schema_node: &SchemaNode, path: &InstanceId) -> Result<()> {
    match node {
        DataNode::Container { children, .. } | DataNode::ListEntry { children, .. } => {
            if let DataNode::ListEntry { keys, .. } = node {
                check_entry_keys(keys, schema_node, path)?;
            }
            check_single_active_case(children, schema_node, path)?;
            for child in children {
                let child_schema = schema_node.data_child(child.name()).ok_or_else(|| {
                    RpcError::new(ErrorType::Application, ErrorTag::UnknownElement)
                        .with_path(path.child_node(child.name().clone()))
                        .with_message(format!("'{}' matches no schema node", child.name()))
                })?;
                let child_path = child_step(path, child);
                validate_node(child, child_schema, &child_path)?;
            }
            // Mandatory constraints bind only inside populated nodes; an
            // empty datastore root is valid
            if !children.is_empty() {
                check_mandatory(children, schema_node, path)?;
            }
            Ok(())
        }
        DataNode::List { entries, .. } => {
            for entry in entries {
                let entry_path = child_step(path.parent().as_ref().unwrap_or(path), entry);
                validate_node(entry, schema_node, &entry_path)?;
            }
            Ok(())
        }
        DataNode::Leaf { .. } | DataNode::LeafList { .. } => Ok(()),
    }
}

fn child_step(parent: &InstanceId, child: &DataNode) -> InstanceId {
    match child {
        DataNode::ListEntry { name, keys, .. } => {
            parent.child(PathArgument::ListEntry(name.clone(), keys.clone()))
        }
        other => parent.child_node(other.name().clone()),
    }
}

fn check_entry_keys(
    keys: &std::collections::BTreeMap<QName, String>,
    schema_node: &SchemaNode,
    path: &InstanceId,
) -> Result<()> {
    let Some(declared) = schema_node.list_keys() else {
        return Err(
            RpcError::new(ErrorType::Application, ErrorTag::UnknownElement)
                .with_path(path.clone())
                .with_message("list entry under a non-list schema node"),
        );
    };
    for key in declared {
        if !keys.contains_key(key) {
            return Err(RpcError::new(ErrorType::Application, ErrorTag::InvalidValue)
                .with_path(path.clone())
                .with_message(format!("list entry is missing key '{}'", key)));
        }
    }
    Ok(())
}

fn check_single_active_case(
    children: &[DataNode],
    schema_node: &SchemaNode,
    path: &InstanceId,
) -> Result<()> {
    for choice in schema_node
        .children
        .iter()
        .filter(|c| c.kind == SchemaKind::Choice)
    {
        let mut active_case: Option<&QName> = None;
        for child in children {
            let Some(case) = choice.case_of(child.name()) else {
                continue;
            };
            match active_case {
                None => active_case = Some(&case.name),
                Some(previous) if previous == &case.name => {}
                Some(previous) => {
                    return Err(RpcError::new(ErrorType::Application, ErrorTag::InvalidValue)
                        .with_path(path.clone())
                        .with_message(format!(
                            "choice '{}' has more than one active case ('{}' and '{}')",
                            choice.name, previous, case.name
                        )));
                }
            }
        }
    }
    Ok(())
}

fn check_mandatory(
    children: &[DataNode],
    schema_node: &SchemaNode,
    path: &InstanceId,
) -> Result<()> {
    for declared in &schema_node.children {
        if !declared.mandatory {
            continue;
        }
        let present = match declared.kind {
            SchemaKind::Choice => children
                .iter()
                .any(|child| declared.case_of(child.name()).is_some()),
            _ => children.iter().any(|child| child.name() == &declared.name),
        };
        if !present {
            return Err(
                RpcError::new(ErrorType::Application, ErrorTag::OperationFailed)
                    .with_path(path.child_node(declared.name.clone()))
                    .with_message(format!("mandatory node '{}' is missing", declared.name)),
            );
        }
    }
    Ok(())
}
