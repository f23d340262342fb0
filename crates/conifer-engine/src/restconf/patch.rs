//! YANG-Patch: ordered edit lists with per-edit status
//!
//! A patch applies its edits in order inside one running transaction.
//! Unlike edit-config against the candidate, a patch is atomic: the first
//! failing edit stops processing and the transaction is dropped, so a
//! failed patch publishes nothing. The status reports every attempted
//! edit by id, the failing one carrying its error.

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::ops::{EditEntity, EditOperation};
use conifer_store::Datastore;

use crate::session::Session;

/// One edit of a patch
#[derive(Debug, Clone)]
pub struct PatchEdit {
    pub edit_id: String,
    pub operation: EditOperation,
    pub target: InstanceId,
    pub value: Option<DataNode>,
}

impl PatchEdit {
    fn to_entity(&self) -> Result<EditEntity> {
        let payload = match self.operation {
            EditOperation::Merge | EditOperation::Replace | EditOperation::Create => self
                .value
                .clone()
                .ok_or_else(|| {
                    RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue).with_message(
                        format!("edit '{}' requires a value", self.edit_id),
                    )
                })?,
            EditOperation::Delete | EditOperation::Remove => synthesized_payload(&self.target),
            EditOperation::None => {
                return Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                    .with_message(format!("edit '{}' has no operation", self.edit_id)))
            }
        };
        Ok(EditEntity {
            path: self.target.clone(),
            operation: self.operation,
            payload,
        })
    }
}

/// A whole patch document
#[derive(Debug, Clone)]
pub struct YangPatch {
    pub patch_id: String,
    pub comment: Option<String>,
    pub edits: Vec<PatchEdit>,
}

/// Status of one attempted edit
#[derive(Debug, Clone)]
pub struct EditStatus {
    pub edit_id: String,
    pub ok: bool,
    pub error: Option<RpcError>,
}

/// Status of the whole patch
#[derive(Debug, Clone)]
pub struct PatchStatus {
    pub patch_id: String,
    pub ok: bool,
    pub edits: Vec<EditStatus>,
}

impl PatchStatus {
    /// The first failing edit's error, if the patch failed
    pub fn first_error(&self) -> Option<&RpcError> {
        self.edits.iter().find_map(|edit| edit.error.as_ref())
    }
}

/// Apply a patch atomically against the running configuration
///
/// A failed patch publishes nothing; the returned status reports every
/// edit attempted, in order, with the failing edit's structured error.
pub async fn yang_patch(session: &mut Session, patch: YangPatch) -> Result<PatchStatus> {
    let mut tx = session
        .provider()
        .new_read_write_transaction(Datastore::Running)
        .await?;

    let mut statuses = Vec::new();
    let mut failed = false;
    for edit in &patch.edits {
        let outcome = edit.to_entity().and_then(|entity| tx.apply(&entity));
        match outcome {
            Ok(()) => statuses.push(EditStatus {
                edit_id: edit.edit_id.clone(),
                ok: true,
                error: None,
            }),
            Err(err) => {
                statuses.push(EditStatus {
                    edit_id: edit.edit_id.clone(),
                    ok: false,
                    error: Some(err),
                });
                failed = true;
                break;
            }
        }
    }

    if failed {
        // Transaction dropped: a failed patch publishes nothing
        return Ok(PatchStatus {
            patch_id: patch.patch_id,
            ok: false,
            edits: statuses,
        });
    }

    session.provider().submit(tx).await?;
    Ok(PatchStatus {
        patch_id: patch.patch_id,
        ok: true,
        edits: statuses,
    })
}

fn synthesized_payload(target: &InstanceId) -> DataNode {
    match target.last() {
        Some(arg) => DataNode::container(arg.qname().clone()),
        None => DataNode::data_root(),
    }
}
