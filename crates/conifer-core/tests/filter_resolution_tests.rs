//! Filter Resolution Tests
//!
//! Determinism and path-shape guarantees of subtree-filter resolution
//! against a fixed schema.

use conifer_core::filter::{resolve_fields, resolve_subtree};
use conifer_core::model::{DataNode, InstanceId, QName};
use conifer_core::schema::{SchemaContext, SchemaNode};

fn q(local: &str) -> QName {
    QName::new("test", local)
}

fn demo_schema() -> SchemaContext {
    let users = SchemaNode::container(q("users")).with_child(
        SchemaNode::list(q("user"), vec![q("name")])
            .with_child(SchemaNode::leaf(q("name")))
            .with_child(SchemaNode::leaf(q("type"))),
    );
    let top = SchemaNode::container(q("top"))
        .with_child(SchemaNode::leaf(q("hostname")))
        .with_child(users);
    SchemaContext::new(vec![top])
}

fn filter_of(children: Vec<DataNode>) -> DataNode {
    let mut filter = DataNode::container(QName::unqualified("filter"));
    for child in children {
        filter.push_child(child);
    }
    filter
}

#[test]
fn test_literal_top_users_user_resolves_to_that_path() {
    // The filter selecting top/users/user must resolve to exactly
    // [top, users, user]
    let mut users = DataNode::container(q("users"));
    users.push_child(DataNode::container(q("user")));
    let mut top = DataNode::container(q("top"));
    top.push_child(users);

    let schema = demo_schema();
    let paths = resolve_subtree(&filter_of(vec![top]), &schema).unwrap();

    assert_eq!(
        paths,
        vec![InstanceId::of_nodes(vec![
            q("top"),
            q("users"),
            q("user")
        ])]
    );
}

#[test]
fn test_repeated_resolution_is_identical() {
    let mut users = DataNode::container(q("users"));
    users.push_child(DataNode::container(q("user")));
    let mut top = DataNode::container(q("top"));
    top.push_child(DataNode::leaf(q("hostname"), ""));
    top.push_child(users);
    let filter = filter_of(vec![top]);

    let schema = demo_schema();
    let runs: Vec<_> = (0..5)
        .map(|_| resolve_subtree(&filter, &schema).unwrap())
        .collect();

    for run in &runs[1..] {
        assert_eq!(run, &runs[0]);
    }
}

#[test]
fn test_fields_and_subtree_agree_on_shape() {
    // fields "users/user" and the equivalent subtree filter pick the same
    // path set
    let schema = demo_schema();

    let from_fields = resolve_fields(
        "users/user",
        &InstanceId::of_nodes(vec![q("top")]),
        &schema,
    )
    .unwrap();

    let mut users = DataNode::container(q("users"));
    users.push_child(DataNode::container(q("user")));
    let mut top = DataNode::container(q("top"));
    top.push_child(users);
    let from_subtree = resolve_subtree(&filter_of(vec![top]), &schema).unwrap();

    assert_eq!(from_fields, from_subtree);
}
