//! Path-addressed mutation primitives over configuration trees
//!
//! These functions implement the edit-operation contract used by
//! transactions: merge and replace ensure missing parents along the path,
//! create fails on populated targets, delete fails on absent targets, and
//! remove treats an absent target as a no-op.

use crate::errors::{ErrorTag, ErrorType, Result, RpcError};
use crate::model::{DataNode, InstanceId, PathArgument, QName};

use super::edit::{EditEntity, EditOperation};

/// Find the node addressed by `path`, if present
pub fn lookup<'a>(root: &'a DataNode, path: &InstanceId) -> Option<&'a DataNode> {
    let mut current = root;
    for arg in path.args() {
        current = current.child(arg)?;
    }
    Some(current)
}

/// Check whether `path` addresses a populated node
pub fn exists(root: &DataNode, path: &InstanceId) -> bool {
    lookup(root, path).is_some()
}

/// Apply one edit entity to a tree
///
/// # Errors
///
/// * `data-exists` (protocol) - `create` on a populated target
/// * `data-missing` (protocol) - `delete` on an absent target
/// * `bad-element` (protocol) - the path descends through a leaf
pub fn apply_edit(root: &mut DataNode, entity: &EditEntity) -> Result<()> {
    match entity.operation {
        EditOperation::Merge => merge_at(root, &entity.path, entity.payload.clone()),
        EditOperation::Replace => replace_at(root, &entity.path, entity.payload.clone()),
        EditOperation::Create => create_at(root, &entity.path, entity.payload.clone()),
        EditOperation::Delete => delete_at(root, &entity.path),
        EditOperation::Remove => {
            remove_at(root, &entity.path);
            Ok(())
        }
        EditOperation::None => Ok(()),
    }
}

/// Merge a payload subtree at `path`, creating missing parents
pub fn merge_at(root: &mut DataNode, path: &InstanceId, payload: DataNode) -> Result<()> {
    if path.is_root() {
        merge_node(root, &payload);
        return Ok(());
    }
    let (parent, last) = ensure_parent(root, path)?;
    merge_into(parent, last, payload, path)
}

/// Overwrite the subtree at `path` with the payload, creating missing parents
pub fn replace_at(root: &mut DataNode, path: &InstanceId, payload: DataNode) -> Result<()> {
    if path.is_root() {
        *root = payload;
        return Ok(());
    }
    let (parent, last) = ensure_parent(root, path)?;
    replace_into(parent, last, payload, path)
}

/// Insert the payload at `path`; the target must not already be populated
pub fn create_at(root: &mut DataNode, path: &InstanceId, payload: DataNode) -> Result<()> {
    if exists(root, path) {
        return Err(RpcError::new(ErrorType::Protocol, ErrorTag::DataExists)
            .with_path(path.clone())
            .with_message("target is already populated"));
    }
    replace_at(root, path, payload)
}

/// Remove the subtree at `path`; the target must be populated
pub fn delete_at(root: &mut DataNode, path: &InstanceId) -> Result<()> {
    if !remove_at(root, path) {
        return Err(RpcError::new(ErrorType::Protocol, ErrorTag::DataMissing)
            .with_path(path.clone())
            .with_message("target is not populated"));
    }
    Ok(())
}

/// Remove the subtree at `path` if present; returns whether anything was removed
pub fn remove_at(root: &mut DataNode, path: &InstanceId) -> bool {
    let Some(last) = path.last() else {
        // Removing the root clears the tree
        let cleared = !root.is_empty();
        *root = DataNode::data_root();
        return cleared;
    };
    let Some(parent_path) = path.parent() else {
        return false;
    };
    let Some(parent) = lookup_mut(root, &parent_path) else {
        return false;
    };
    remove_from(parent, last)
}

// ========== Internal navigation ==========

fn lookup_mut<'a>(root: &'a mut DataNode, path: &InstanceId) -> Option<&'a mut DataNode> {
    let mut current = root;
    for arg in path.args() {
        current = current.child_mut(arg)?;
    }
    Some(current)
}

/// Navigate to the parent of `path`, creating missing containers and list
/// entries along the way, and return it with the final path argument.
fn ensure_parent<'a>(
    root: &'a mut DataNode,
    path: &'a InstanceId,
) -> Result<(&'a mut DataNode, &'a PathArgument)> {
    let last = path
        .last()
        .expect("ensure_parent requires a non-root path");
    let mut current = root;
    let args = path.args();
    for (depth, arg) in args[..args.len() - 1].iter().enumerate() {
        current = ensure_step(current, arg).ok_or_else(|| {
            RpcError::new(ErrorType::Protocol, ErrorTag::BadElement)
                .with_path(InstanceId::new(args[..=depth].to_vec()))
                .with_message("path descends through a leaf")
        })?;
    }
    Ok((current, last))
}

fn ensure_step<'a>(node: &'a mut DataNode, arg: &PathArgument) -> Option<&'a mut DataNode> {
    match arg {
        PathArgument::Node(qname) => {
            let children = node.children_mut()?;
            let index = match children.iter().position(|c| c.name() == qname) {
                Some(index) => index,
                None => {
                    children.push(DataNode::container(qname.clone()));
                    children.len() - 1
                }
            };
            Some(&mut children[index])
        }
        PathArgument::ListEntry(qname, keys) => {
            let entries = ensure_list(node, qname)?.entries_mut()?;
            let entry_index = match entries.iter().position(|e| e.entry_keys() == Some(keys)) {
                Some(index) => index,
                None => {
                    entries.push(DataNode::list_entry(qname.clone(), keys.clone()));
                    entries.len() - 1
                }
            };
            Some(&mut entries[entry_index])
        }
    }
}

/// Find or create the list named `qname` among a node's children
///
/// A same-named non-list sibling is left alone; the caller treats the
/// resulting lookup miss as a payload/tree disagreement.
fn ensure_list<'a>(node: &'a mut DataNode, qname: &QName) -> Option<&'a mut DataNode> {
    let children = node.children_mut()?;
    let index = match children
        .iter()
        .position(|c| c.name() == qname && matches!(c, DataNode::List { .. }))
    {
        Some(index) => index,
        None => {
            if children.iter().any(|c| c.name() == qname) {
                return None;
            }
            children.push(DataNode::list(qname.clone()));
            children.len() - 1
        }
    };
    Some(&mut children[index])
}

fn bad_element(path: &InstanceId) -> RpcError {
    RpcError::new(ErrorType::Protocol, ErrorTag::BadElement)
        .with_path(path.clone())
        .with_message("target parent cannot hold children")
}

fn merge_into(
    parent: &mut DataNode,
    arg: &PathArgument,
    payload: DataNode,
    path: &InstanceId,
) -> Result<()> {
    match arg {
        PathArgument::Node(qname) => {
            let children = parent.children_mut().ok_or_else(|| bad_element(path))?;
            if let Some(existing) = children.iter_mut().find(|c| c.name() == qname) {
                merge_node(existing, &payload);
            } else {
                children.push(payload);
            }
            Ok(())
        }
        PathArgument::ListEntry(qname, keys) => {
            let Some(list) = ensure_list(parent, qname) else {
                return Err(bad_element(path));
            };
            let entries = list.entries_mut().ok_or_else(|| bad_element(path))?;
            if let Some(existing) = entries.iter_mut().find(|e| e.entry_keys() == Some(keys)) {
                merge_node(existing, &payload);
            } else {
                entries.push(payload);
            }
            Ok(())
        }
    }
}

fn replace_into(
    parent: &mut DataNode,
    arg: &PathArgument,
    payload: DataNode,
    path: &InstanceId,
) -> Result<()> {
    match arg {
        PathArgument::Node(qname) => {
            let children = parent.children_mut().ok_or_else(|| bad_element(path))?;
            if let Some(index) = children.iter().position(|c| c.name() == qname) {
                children[index] = payload;
            } else {
                children.push(payload);
            }
            Ok(())
        }
        PathArgument::ListEntry(qname, keys) => {
            let Some(list) = ensure_list(parent, qname) else {
                return Err(bad_element(path));
            };
            let entries = list.entries_mut().ok_or_else(|| bad_element(path))?;
            if let Some(index) = entries.iter().position(|e| e.entry_keys() == Some(keys)) {
                entries[index] = payload;
            } else {
                entries.push(payload);
            }
            Ok(())
        }
    }
}

fn remove_from(parent: &mut DataNode, arg: &PathArgument) -> bool {
    match arg {
        PathArgument::Node(qname) => {
            let Some(children) = parent.children_mut() else {
                return false;
            };
            if let Some(index) = children.iter().position(|c| c.name() == qname) {
                children.remove(index);
                true
            } else {
                false
            }
        }
        PathArgument::ListEntry(qname, keys) => {
            let Some(children) = parent.children_mut() else {
                return false;
            };
            let Some(list) = children
                .iter_mut()
                .find(|c| c.name() == qname && matches!(c, DataNode::List { .. }))
            else {
                return false;
            };
            let Some(entries) = list.entries_mut() else {
                return false;
            };
            if let Some(index) = entries.iter().position(|e| e.entry_keys() == Some(keys)) {
                entries.remove(index);
                true
            } else {
                false
            }
        }
    }
}

// ========== Structural merge ==========

/// Recursive structural merge of `incoming` into `existing`
///
/// Containers and list entries merge children by name; lists merge entries
/// by key, preserving existing entry order and appending unseen entries in
/// source order; leaves overwrite; leaf-lists union-append. A kind
/// mismatch overwrites wholesale.
pub fn merge_node(existing: &mut DataNode, incoming: &DataNode) {
    match (&mut *existing, incoming) {
        (
            DataNode::Container {
                children: current, ..
            },
            DataNode::Container {
                children: incoming, ..
            },
        )
        | (
            DataNode::ListEntry {
                children: current, ..
            },
            DataNode::ListEntry {
                children: incoming, ..
            },
        ) => {
            for child in incoming {
                merge_child(current, child);
            }
        }
        (
            DataNode::List {
                entries: current, ..
            },
            DataNode::List {
                entries: incoming, ..
            },
        ) => {
            for entry in incoming {
                if let Some(existing_entry) = current
                    .iter_mut()
                    .find(|e| e.entry_keys() == entry.entry_keys())
                {
                    merge_node(existing_entry, entry);
                } else {
                    current.push(entry.clone());
                }
            }
        }
        (DataNode::Leaf { value: current, .. }, DataNode::Leaf { value: incoming, .. }) => {
            *current = incoming.clone();
        }
        (
            DataNode::LeafList {
                values: current, ..
            },
            DataNode::LeafList {
                values: incoming, ..
            },
        ) => {
            for value in incoming {
                if !current.contains(value) {
                    current.push(value.clone());
                }
            }
        }
        (current, incoming) => *current = incoming.clone(),
    }
}

fn merge_child(children: &mut Vec<DataNode>, incoming: &DataNode) {
    if let Some(existing) = children.iter_mut().find(|c| c.name() == incoming.name()) {
        merge_node(existing, incoming);
    } else {
        children.push(incoming.clone());
    }
}
