//! Subtree-filter resolution
//!
//! Converts a subtree filter pattern into the minimal covering set of
//! concrete instance identifiers to read. The walk is a generic visitor
//! over the abstract tree - filter nodes are plain data nodes, matched
//! against the schema tree by name, never against a document object model.
//!
//! Resolution rules:
//! - a deepest selection node yields the most specific concrete path;
//! - a list element whose filter content covers all declared keys narrows
//!   to that entry; with no or partial keys, resolution stops at the list
//!   node and callers filter in memory below it;
//! - choice/case levels are transparent: the case is picked by the child
//!   actually present in the filter;
//! - names that match no schema node fail with `unknown-element`.

use std::collections::BTreeMap;

use crate::errors::{ErrorTag, ErrorType, Result, RpcError};
use crate::model::{DataNode, InstanceId, PathArgument, QName};
use crate::schema::{SchemaContext, SchemaNode};

/// Resolve a subtree filter into the covering set of concrete paths
///
/// `filter` is the content of the filter element: a pattern tree whose
/// root children are top-level data nodes. An empty filter selects
/// nothing (by contract with the read layer, the caller turns "no filter"
/// into a whole-datastore read before calling this).
///
/// Resolution is deterministic: the result order follows filter document
/// order, so identical inputs always produce the identical path list.
///
/// # Errors
///
/// Returns `unknown-element` (application) naming the first filter node
/// that matches no schema node.
pub fn resolve_subtree(filter: &DataNode, schema: &SchemaContext) -> Result<Vec<InstanceId>> {
    let mut paths = Vec::new();
    let Some(children) = filter.children() else {
        return Ok(paths);
    };
    for child in children {
        visit(child, schema.root(), &InstanceId::root(), &mut paths)?;
    }
    Ok(paths)
}

fn visit(
    filter_node: &DataNode,
    schema_parent: &SchemaNode,
    parent_path: &InstanceId,
    out: &mut Vec<InstanceId>,
) -> Result<()> {
    let qname = filter_node.name();
    let schema_node = schema_parent.data_child(qname).ok_or_else(|| {
        RpcError::new(ErrorType::Application, ErrorTag::UnknownElement)
            .with_path(parent_path.child_node(qname.clone()))
            .with_message(format!("'{}' matches no schema node", qname))
    })?;

    if let Some(declared_keys) = schema_node.list_keys() {
        return visit_list(filter_node, schema_node, declared_keys, parent_path, out);
    }

    let path = parent_path.child_node(qname.clone());
    match filter_node.children() {
        // Selection node: the whole subtree is selected
        None => out.push(path),
        Some(children) if children.is_empty() => out.push(path),
        Some(children) => {
            for child in children {
                visit(child, schema_node, &path, out)?;
            }
        }
    }
    Ok(())
}

fn visit_list(
    filter_node: &DataNode,
    schema_node: &SchemaNode,
    declared_keys: &[QName],
    parent_path: &InstanceId,
    out: &mut Vec<InstanceId>,
) -> Result<()> {
    let qname = filter_node.name().clone();
    let key_values = filter_key_values(filter_node, declared_keys);

    match key_values {
        Some(keys) => {
            let entry_path = parent_path.child(PathArgument::ListEntry(qname, keys));
            let non_key_children: Vec<&DataNode> = filter_node
                .children()
                .map(|children| {
                    children
                        .iter()
                        .filter(|c| !declared_keys.contains(c.name()))
                        .collect()
                })
                .unwrap_or_default();
            if non_key_children.is_empty() {
                out.push(entry_path);
            } else {
                for child in non_key_children {
                    visit(child, schema_node, &entry_path, out)?;
                }
            }
        }
        // No narrowing below ambiguity: unkeyed or partially keyed list
        // filters stop at the list node itself
        None => out.push(parent_path.child_node(qname)),
    }
    Ok(())
}

/// Extract the full key set from a list filter element, if every declared
/// key appears as a valued leaf child
fn filter_key_values(
    filter_node: &DataNode,
    declared_keys: &[QName],
) -> Option<BTreeMap<QName, String>> {
    let children = filter_node.children()?;
    let mut keys = BTreeMap::new();
    for declared in declared_keys {
        let value = children.iter().find_map(|child| match child {
            DataNode::Leaf { name, value } if name == declared && !value.is_empty() => {
                Some(value.clone())
            }
            _ => None,
        })?;
        keys.insert(declared.clone(), value);
    }
    Some(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaNode;

    fn q(local: &str) -> QName {
        QName::new("test", local)
    }

    fn demo_schema() -> SchemaContext {
        let users = SchemaNode::container(q("users")).with_child(
            SchemaNode::list(q("user"), vec![q("name")])
                .with_child(SchemaNode::leaf(q("name")))
                .with_child(SchemaNode::leaf(q("type"))),
        );
        let transport = SchemaNode::choice(q("transport"))
            .with_child(
                SchemaNode::case(q("tcp")).with_child(SchemaNode::leaf(q("tcp-port"))),
            )
            .with_child(
                SchemaNode::case(q("tls")).with_child(SchemaNode::leaf(q("tls-port"))),
            );
        let top = SchemaNode::container(q("top"))
            .with_child(SchemaNode::leaf(q("hostname")))
            .with_child(users)
            .with_child(transport);
        SchemaContext::new(vec![top])
    }

    fn filter_of(node: DataNode) -> DataNode {
        let mut filter = DataNode::container(QName::unqualified("filter"));
        filter.push_child(node);
        filter
    }

    #[test]
    fn test_literal_filter_resolves_to_list_path() {
        // <top><users><user/></users></top> resolves to [top, users, user]
        let mut users = DataNode::container(q("users"));
        users.push_child(DataNode::container(q("user")));
        let mut top = DataNode::container(q("top"));
        top.push_child(users);

        let schema = demo_schema();
        let paths = resolve_subtree(&filter_of(top), &schema).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(format!("{}", paths[0]), "/test:top/test:users/test:user");
    }

    #[test]
    fn test_keyed_list_filter_narrows_to_entry() {
        let mut user = DataNode::container(q("user"));
        user.push_child(DataNode::leaf(q("name"), "fred"));
        let mut users = DataNode::container(q("users"));
        users.push_child(user);
        let mut top = DataNode::container(q("top"));
        top.push_child(users);

        let schema = demo_schema();
        let paths = resolve_subtree(&filter_of(top), &schema).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(
            format!("{}", paths[0]),
            "/test:top/test:users/test:user[test:name='fred']"
        );
    }

    #[test]
    fn test_choice_case_child_resolves_directly() {
        let mut top = DataNode::container(q("top"));
        top.push_child(DataNode::leaf(q("tcp-port"), ""));

        let schema = demo_schema();
        let paths = resolve_subtree(&filter_of(top), &schema).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(format!("{}", paths[0]), "/test:top/test:tcp-port");
    }

    #[test]
    fn test_unknown_element_is_rejected() {
        let mut top = DataNode::container(q("top"));
        top.push_child(DataNode::container(q("bogus")));

        let schema = demo_schema();
        let err = resolve_subtree(&filter_of(top), &schema).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::UnknownElement);
        assert_eq!(err.error_type(), ErrorType::Application);
        assert_eq!(format!("{}", err.path().unwrap()), "/test:top/test:bogus");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut users = DataNode::container(q("users"));
        users.push_child(DataNode::container(q("user")));
        let mut top = DataNode::container(q("top"));
        top.push_child(DataNode::leaf(q("hostname"), ""));
        top.push_child(users);
        let filter = filter_of(top);

        let schema = demo_schema();
        let first = resolve_subtree(&filter, &schema).unwrap();
        let second = resolve_subtree(&filter, &schema).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_empty_filter_selects_nothing() {
        let schema = demo_schema();
        let filter = DataNode::container(QName::unqualified("filter"));
        let paths = resolve_subtree(&filter, &schema).unwrap();
        assert!(paths.is_empty());
    }
}
