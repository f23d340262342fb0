//! YANG-Patch Tests
//!
//! Ordered edit lists with per-edit-id status over the running
//! configuration: document-order application, per-edit status reporting,
//! and all-or-nothing publication on failure.

mod common;

use common::*;
use conifer_core::errors::ErrorTag;
use conifer_core::model::{DataNode, InstanceId, PathArgument};
use conifer_core::ops::EditOperation;
use conifer_engine::restconf::{yang_patch, PatchEdit, YangPatch};
use conifer_store::{DataTreeStore, Datastore, LogicalDatastore};

fn entry_path(name: &str) -> InstanceId {
    InstanceId::of_nodes(vec![q("top"), q("users")])
        .child(PathArgument::ListEntry(q("user"), keyed(name)))
}

fn create_edit(edit_id: &str, name: &str) -> PatchEdit {
    PatchEdit {
        edit_id: edit_id.to_string(),
        operation: EditOperation::Create,
        target: entry_path(name),
        value: Some(user_entry(name)),
    }
}

#[tokio::test]
async fn test_patch_applies_edits_in_order() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let patch = YangPatch {
        patch_id: "add-users".to_string(),
        comment: None,
        edits: vec![
            create_edit("add-key3", "key3"),
            create_edit("add-key1", "key1"),
            create_edit("add-key2", "key2"),
        ],
    };
    let status = yang_patch(&mut session, patch).await.unwrap();

    assert!(status.ok);
    assert_eq!(status.patch_id, "add-users");
    assert_eq!(status.edits.len(), 3);
    assert!(status.edits.iter().all(|edit| edit.ok));

    // Entry order in running follows edit order
    let list = session
        .store()
        .read(LogicalDatastore::Configuration, &user_list_path())
        .await
        .unwrap()
        .unwrap();
    let order: Vec<String> = list
        .entries()
        .unwrap()
        .iter()
        .map(|entry| entry.entry_keys().unwrap()[&q("name")].clone())
        .collect();
    assert_eq!(order, vec!["key3", "key1", "key2"]);
}

#[tokio::test]
async fn test_failed_patch_publishes_nothing() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let patch = YangPatch {
        patch_id: "broken".to_string(),
        comment: Some("second edit deletes a missing entry".to_string()),
        edits: vec![
            create_edit("add-fred", "fred"),
            PatchEdit {
                edit_id: "drop-ghost".to_string(),
                operation: EditOperation::Delete,
                target: entry_path("ghost"),
                value: None,
            },
            create_edit("add-barney", "barney"),
        ],
    };
    let status = yang_patch(&mut session, patch).await.unwrap();

    assert!(!status.ok);
    // Both attempted edits are reported, in order; the third never ran
    assert_eq!(status.edits.len(), 2);
    assert_eq!(status.edits[0].edit_id, "add-fred");
    assert!(status.edits[0].ok);
    assert_eq!(status.edits[1].edit_id, "drop-ghost");
    assert!(!status.edits[1].ok);
    assert_eq!(
        status.first_error().unwrap().tag(),
        ErrorTag::DataMissing
    );

    // Atomicity: the successful first edit was not published either
    let read = session
        .provider()
        .read(Datastore::Running, &entry_path("fred"))
        .await
        .unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn test_patch_edit_without_value_is_invalid() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let patch = YangPatch {
        patch_id: "no-value".to_string(),
        comment: None,
        edits: vec![PatchEdit {
            edit_id: "merge-without-value".to_string(),
            operation: EditOperation::Merge,
            target: hostname_path(),
            value: None,
        }],
    };
    let status = yang_patch(&mut session, patch).await.unwrap();

    assert!(!status.ok);
    assert_eq!(
        status.first_error().unwrap().tag(),
        ErrorTag::InvalidValue
    );
}

#[tokio::test]
async fn test_patch_mirrors_edit_config_create_semantics() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let first = YangPatch {
        patch_id: "first".to_string(),
        comment: None,
        edits: vec![create_edit("add-fred", "fred")],
    };
    assert!(yang_patch(&mut session, first).await.unwrap().ok);

    // Creating the same entry again fails data-exists, like edit-config
    let second = YangPatch {
        patch_id: "second".to_string(),
        comment: None,
        edits: vec![create_edit("add-fred-again", "fred")],
    };
    let status = yang_patch(&mut session, second).await.unwrap();
    assert!(!status.ok);
    assert_eq!(status.first_error().unwrap().tag(), ErrorTag::DataExists);
}

#[tokio::test]
async fn test_patch_remove_is_tolerant_delete_is_not() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let remove = YangPatch {
        patch_id: "remove-absent".to_string(),
        comment: None,
        edits: vec![PatchEdit {
            edit_id: "rm".to_string(),
            operation: EditOperation::Remove,
            target: entry_path("ghost"),
            value: None,
        }],
    };
    assert!(yang_patch(&mut session, remove).await.unwrap().ok);

    let delete = YangPatch {
        patch_id: "delete-absent".to_string(),
        comment: None,
        edits: vec![PatchEdit {
            edit_id: "del".to_string(),
            operation: EditOperation::Delete,
            target: entry_path("ghost"),
            value: None,
        }],
    };
    let status = yang_patch(&mut session, delete).await.unwrap();
    assert!(!status.ok);
    assert_eq!(status.first_error().unwrap().tag(), ErrorTag::DataMissing);
}
