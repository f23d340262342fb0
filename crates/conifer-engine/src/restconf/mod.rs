//! RESTCONF data-resource surface
//!
//! HTTP routing and media-type handling live in the external binding;
//! this module implements the datastore semantics behind `/data` paths.
//! Writes target the running configuration, each request in its own
//! transaction submitted on success.

pub mod patch;

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::filter::resolve_fields;
use conifer_core::model::{DataNode, InstanceId, PathArgument};
use conifer_core::ops::{tree, EditEntity, EditOperation};
use conifer_store::{Datastore, DataTreeStore, LogicalDatastore};

use crate::session::Session;

pub use patch::{yang_patch, EditStatus, PatchEdit, PatchStatus, YangPatch};

/// The `content` query parameter: which datastores a read covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Content {
    #[default]
    All,
    Config,
    Nonconfig,
}

impl Content {
    /// Parse the wire value
    ///
    /// # Errors
    ///
    /// Returns `invalid-value` outside {all, config, nonconfig}.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Content::All),
            "config" => Ok(Content::Config),
            "nonconfig" => Ok(Content::Nonconfig),
            other => Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                .with_message(format!("unknown content value '{}'", other))),
        }
    }
}

/// Outcome of a PUT: whether the resource existed before
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResult {
    Created,
    Replaced,
}

/// Read a data resource
///
/// `content=all` reads configuration and operational concurrently and
/// merges them, configuration winning on overlapping leaves. A `fields`
/// expression narrows the result to the selected subtrees.
pub async fn read_data(
    session: &mut Session,
    path: &InstanceId,
    content: Content,
    fields: Option<&str>,
) -> Result<Option<DataNode>> {
    if let Some(expr) = fields {
        let schema = session.schema();
        let subpaths = resolve_fields(expr, path, &schema)?;
        let mut assembled = DataNode::data_root();
        let mut matched = false;
        for subpath in &subpaths {
            if let Some(node) = read_content(session, subpath, content).await? {
                tree::replace_at(&mut assembled, subpath, node)?;
                matched = true;
            }
        }
        if !matched {
            return Ok(None);
        }
        return Ok(tree::lookup(&assembled, path).cloned());
    }
    read_content(session, path, content).await
}

async fn read_content(
    session: &mut Session,
    path: &InstanceId,
    content: Content,
) -> Result<Option<DataNode>> {
    let store = session.store();
    match content {
        Content::Config => Ok(store
            .read(LogicalDatastore::Configuration, path)
            .await
            .map_err(RpcError::from)?),
        Content::Nonconfig => Ok(store
            .read(LogicalDatastore::Operational, path)
            .await
            .map_err(RpcError::from)?),
        Content::All => {
            // Independent reads are issued concurrently
            let (config, operational) = tokio::join!(
                store.read(LogicalDatastore::Configuration, path),
                store.read(LogicalDatastore::Operational, path),
            );
            let config = config.map_err(RpcError::from)?;
            let operational = operational.map_err(RpcError::from)?;
            Ok(match (config, operational) {
                (Some(config), Some(mut merged)) => {
                    // Configuration wins on overlap
                    tree::merge_node(&mut merged, &config);
                    Some(merged)
                }
                (Some(config), None) => Some(config),
                (None, operational) => operational,
            })
        }
    }
}

/// Plain PATCH: merge the body into the resource at `path`
pub async fn plain_patch(session: &mut Session, path: &InstanceId, body: DataNode) -> Result<()> {
    apply_single(
        session,
        EditEntity {
            path: path.clone(),
            operation: EditOperation::Merge,
            payload: body,
        },
    )
    .await
}

/// PUT: replace the resource, creating it when absent
pub async fn put_data(
    session: &mut Session,
    path: &InstanceId,
    body: DataNode,
) -> Result<PutResult> {
    let existed = session.provider().exists(Datastore::Running, path).await?;
    apply_single(
        session,
        EditEntity {
            path: path.clone(),
            operation: EditOperation::Replace,
            payload: body,
        },
    )
    .await?;
    Ok(if existed {
        PutResult::Replaced
    } else {
        PutResult::Created
    })
}

/// POST: create the body as a new child of `parent`
///
/// # Errors
///
/// `data-exists` when the resource is already populated.
pub async fn post_data(
    session: &mut Session,
    parent: &InstanceId,
    body: DataNode,
) -> Result<InstanceId> {
    let step = match &body {
        DataNode::ListEntry { name, keys, .. } => {
            PathArgument::ListEntry(name.clone(), keys.clone())
        }
        other => PathArgument::Node(other.name().clone()),
    };
    let path = parent.child(step);
    apply_single(
        session,
        EditEntity {
            path: path.clone(),
            operation: EditOperation::Create,
            payload: body,
        },
    )
    .await?;
    Ok(path)
}

/// DELETE: remove the resource
///
/// # Errors
///
/// `data-missing` when the resource is absent.
pub async fn delete_data(session: &mut Session, path: &InstanceId) -> Result<()> {
    apply_single(
        session,
        EditEntity {
            path: path.clone(),
            operation: EditOperation::Delete,
            payload: DataNode::data_root(),
        },
    )
    .await
}

/// One entity, one running transaction, submitted on success
async fn apply_single(session: &mut Session, entity: EditEntity) -> Result<()> {
    let mut tx = session
        .provider()
        .new_read_write_transaction(Datastore::Running)
        .await?;
    tx.apply(&entity)?;
    session.provider().submit(tx).await?;
    Ok(())
}
