//! Scenario 03: rollback-on-error is a hard-fail policy
//!
//! error-option=rollback-on-error always fails with
//! (severity=error, tag=operation-not-supported, type=application),
//! regardless of payload validity, and never touches the store.

mod common;

use common::*;
use conifer_core::errors::{ErrorSeverity, ErrorTag, ErrorType};
use conifer_engine::{dispatch, RpcRequest};

fn rollback_request(payload: Vec<conifer_core::model::DataNode>) -> RpcRequest {
    RpcRequest::new(
        "edit-config",
        elem(
            "edit-config",
            vec![
                datastore_clause("target", "candidate"),
                leaf_elem("error-option", "rollback-on-error"),
                elem("config", payload),
            ],
        ),
    )
}

#[tokio::test]
async fn test_rollback_on_error_fails_with_valid_payload() {
    let bed = TestBed::new();
    let mut session = bed.session();

    let reply = dispatch(&mut session, &rollback_request(vec![demo_payload()])).await;

    let err = reply.first_error().unwrap();
    assert_eq!(err.severity(), ErrorSeverity::Error);
    assert_eq!(err.tag(), ErrorTag::OperationNotSupported);
    assert_eq!(err.error_type(), ErrorType::Application);
}

#[tokio::test]
async fn test_rollback_on_error_fails_with_garbage_payload() {
    let bed = TestBed::new();
    let mut session = bed.session();

    // A payload naming nothing in the schema: the error-option check
    // still fires first
    let garbage = elem("nonsense", Vec::new());
    let reply = dispatch(&mut session, &rollback_request(vec![garbage])).await;

    let err = reply.first_error().unwrap();
    assert_eq!(err.tag(), ErrorTag::OperationNotSupported);
    assert_eq!(err.error_type(), ErrorType::Application);
}

#[tokio::test]
async fn test_rollback_on_error_leaves_candidate_untouched() {
    let bed = TestBed::new();
    let mut session = bed.session();

    dispatch(&mut session, &rollback_request(vec![demo_payload()])).await;

    let candidate = dispatch(&mut session, &get_config_request("candidate", None)).await;
    assert!(candidate.is_empty_data());
}
