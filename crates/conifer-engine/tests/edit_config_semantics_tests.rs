//! Edit-config Semantics Tests
//!
//! Per-operation contracts and error-option behavior:
//!
//! 1. create on a populated path fails data-exists
//! 2. delete on an absent path fails data-missing
//! 3. remove on an absent path is a no-op, idempotently
//! 4. stop-on-error halts at the first failure, prior edits remain
//! 5. continue-on-error reports every failure and keeps every success

mod common;

use std::collections::BTreeMap;

use common::*;
use conifer_core::errors::ErrorTag;
use conifer_core::model::{DataNode, InstanceId, PathArgument};
use conifer_engine::{dispatch, RpcRequest, RpcReply};

fn fred_path() -> InstanceId {
    InstanceId::of_nodes(vec![q("top"), q("users")])
        .child(PathArgument::ListEntry(q("user"), keyed("fred")))
}

fn annotated_edit(
    payload: Vec<DataNode>,
    annotations: Vec<(InstanceId, &str)>,
    error_option: Option<&str>,
) -> RpcRequest {
    let mut children = vec![datastore_clause("target", "candidate")];
    if let Some(option) = error_option {
        children.push(leaf_elem("error-option", option));
    }
    children.push(elem("config", payload));

    let mut map = BTreeMap::new();
    for (path, operation) in annotations {
        map.insert(path, operation.to_string());
    }
    RpcRequest::new("edit-config", elem("edit-config", children)).with_annotations(map)
}

async fn seed_candidate(session: &mut conifer_engine::Session) {
    let reply = dispatch(session, &edit_config_request("candidate", vec![demo_payload()])).await;
    assert!(reply.is_ok());
}

#[tokio::test]
async fn test_create_on_existing_path_fails_data_exists() {
    let bed = TestBed::new();
    let mut session = bed.session();
    seed_candidate(&mut session).await;

    let reply = dispatch(
        &mut session,
        &annotated_edit(vec![demo_payload()], vec![(fred_path(), "create")], None),
    )
    .await;

    let err = reply.first_error().unwrap();
    assert_eq!(err.tag(), ErrorTag::DataExists);
    assert_eq!(err.path(), Some(&fred_path()));
}

#[tokio::test]
async fn test_delete_on_missing_path_fails_data_missing() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let reply = dispatch(
        &mut session,
        &annotated_edit(vec![demo_payload()], vec![(fred_path(), "delete")], None),
    )
    .await;

    let err = reply.first_error().unwrap();
    assert_eq!(err.tag(), ErrorTag::DataMissing);
}

#[tokio::test]
async fn test_remove_on_missing_path_is_idempotent_noop() {
    let bed = TestBed::new();
    let mut session = bed.session();

    // Removing an absent path twice in sequence succeeds both times
    for _ in 0..2 {
        let reply = dispatch(
            &mut session,
            &annotated_edit(vec![demo_payload()], vec![(fred_path(), "remove")], None),
        )
        .await;
        assert!(reply.is_ok(), "remove errored: {:?}", reply.first_error());
    }
}

#[tokio::test]
async fn test_delete_then_remove_equivalence() {
    let bed = TestBed::new();
    let mut session = bed.session();
    seed_candidate(&mut session).await;

    // delete succeeds on the populated entry
    let reply = dispatch(
        &mut session,
        &annotated_edit(vec![demo_payload()], vec![(fred_path(), "delete")], None),
    )
    .await;
    assert!(reply.is_ok());

    // the same delete now fails, while remove still succeeds
    let reply = dispatch(
        &mut session,
        &annotated_edit(vec![demo_payload()], vec![(fred_path(), "delete")], None),
    )
    .await;
    assert_eq!(reply.first_error().unwrap().tag(), ErrorTag::DataMissing);

    let reply = dispatch(
        &mut session,
        &annotated_edit(vec![demo_payload()], vec![(fred_path(), "remove")], None),
    )
    .await;
    assert!(reply.is_ok());
}

/// `<top><hostname/><users><user>fred</user><user>{name}</user></users>
/// <server/></top>` - extra entries land between the fred entry and the
/// trailing server container, fixing the document order the tests rely on
fn payload_with_extra_users(names: &[&str]) -> DataNode {
    let mut top = demo_payload();
    let users = top
        .child_mut(&PathArgument::Node(q("users")))
        .expect("users container");
    let list = users
        .child_mut(&PathArgument::Node(q("user")))
        .expect("user list");
    for name in names {
        list.entries_mut().unwrap().push(user_entry(name));
    }
    let mut server = DataNode::container(q("server"));
    server.push_child(DataNode::leaf(q("address"), "192.0.2.1"));
    top.push_child(server);
    top
}

#[tokio::test]
async fn test_stop_on_error_keeps_prior_edits_and_halts() {
    let bed = TestBed::new();
    let mut session = bed.session();

    // Document order: hostname merge (ok), fred merge (ok), delete of the
    // never-created "missing" entry (fails), server merge (never attempted)
    let reply = dispatch(
        &mut session,
        &annotated_edit(
            vec![payload_with_extra_users(&["missing"])],
            vec![(
                InstanceId::of_nodes(vec![q("top"), q("users")])
                    .child(PathArgument::ListEntry(q("user"), keyed("missing"))),
                "delete",
            )],
            None,
        ),
    )
    .await;

    // The RPC reports exactly one failure
    match &reply {
        RpcReply::Errors(errors) => assert_eq!(errors.len(), 1),
        other => panic!("expected errors, got {:?}", other),
    }

    // The hostname edit preceding the failure remains in the candidate
    let candidate = dispatch(&mut session, &get_config_request("candidate", None)).await;
    let data = candidate.data().unwrap();
    assert!(conifer_core::ops::lookup(data, &hostname_path()).is_some());
    // The server edit following the failure was never applied
    assert!(conifer_core::ops::lookup(
        data,
        &InstanceId::of_nodes(vec![q("top"), q("server")])
    )
    .is_none());
}

#[tokio::test]
async fn test_continue_on_error_reports_all_failures_keeps_all_successes() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let missing_a = InstanceId::of_nodes(vec![q("top"), q("users")])
        .child(PathArgument::ListEntry(q("user"), keyed("ghost-a")));
    let missing_b = InstanceId::of_nodes(vec![q("top"), q("users")])
        .child(PathArgument::ListEntry(q("user"), keyed("ghost-b")));

    let reply = dispatch(
        &mut session,
        &annotated_edit(
            vec![payload_with_extra_users(&["ghost-a", "ghost-b"])],
            vec![(missing_a, "delete"), (missing_b, "delete")],
            Some("continue-on-error"),
        ),
    )
    .await;

    match &reply {
        RpcReply::Errors(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().all(|e| e.tag() == ErrorTag::DataMissing));
        }
        other => panic!("expected errors, got {:?}", other),
    }

    // Every successful edit survived, including the one after the failures
    let candidate = dispatch(&mut session, &get_config_request("candidate", None)).await;
    let data = candidate.data().unwrap();
    assert!(conifer_core::ops::lookup(data, &hostname_path()).is_some());
    assert!(conifer_core::ops::lookup(
        data,
        &InstanceId::of_nodes(vec![q("top"), q("server")])
    )
    .is_some());
}

#[tokio::test]
async fn test_missing_target_is_rejected() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let request = RpcRequest::new(
        "edit-config",
        elem("edit-config", vec![elem("config", vec![demo_payload()])]),
    );
    let reply = dispatch(&mut session, &request).await;
    assert_eq!(
        reply.first_error().unwrap().tag(),
        ErrorTag::MissingElement
    );
}
