//! NETCONF operation handlers
//!
//! Requests arrive as already-decoded input trees (wire codecs are
//! external collaborators). `Operation::parse` is the dispatch table from
//! RPC name to typed handler; each handler runs the same pipeline:
//! Parse -> Validate-Shape -> Resolve-Target -> Execute -> Map-Result.

pub mod copy_config;
pub mod edit_config;
pub mod get;
pub mod lifecycle;
pub mod validate;

use std::collections::BTreeMap;
use std::time::Instant;

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::{log_op_end, log_op_error, log_op_start};
use conifer_store::Datastore;

use crate::reply::RpcReply;
use crate::session::Session;

pub use copy_config::{ConfigSource, ConfigTarget, CopyConfig, DeleteConfig};
pub use edit_config::{EditConfig, ErrorOption};
pub use get::{Get, GetConfig};
pub use lifecycle::{Commit, DiscardChanges, Lock, Unlock};
pub use validate::{Validate, ValidateSource};

/// One decoded protocol request
///
/// `input` holds the rpc element's children (`<target>`, `<config>`,
/// `<filter>`, ...); `annotations` carries the per-node operation
/// attributes the codec extracted from the edit payload, keyed by path
/// relative to the config root.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub name: String,
    pub input: DataNode,
    pub annotations: BTreeMap<InstanceId, String>,
}

impl RpcRequest {
    /// A request without payload annotations
    pub fn new(name: impl Into<String>, input: DataNode) -> Self {
        Self {
            name: name.into(),
            input,
            annotations: BTreeMap::new(),
        }
    }

    /// Attach operation-attribute annotations
    pub fn with_annotations(mut self, annotations: BTreeMap<InstanceId, String>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Typed operation inventory - the dispatch target of every RPC name
#[derive(Debug, Clone)]
pub enum Operation {
    Get(Get),
    GetConfig(GetConfig),
    EditConfig(EditConfig),
    Commit(Commit),
    DiscardChanges(DiscardChanges),
    Lock(Lock),
    Unlock(Unlock),
    Validate(Validate),
    CopyConfig(CopyConfig),
    DeleteConfig(DeleteConfig),
}

impl Operation {
    /// Parse a request into its typed handler
    ///
    /// # Errors
    ///
    /// * `operation-not-supported` (rpc) - unknown RPC name
    /// * handler-specific shape errors
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        match request.name.as_str() {
            "get" => Ok(Operation::Get(Get::parse(request)?)),
            "get-config" => Ok(Operation::GetConfig(GetConfig::parse(request)?)),
            "edit-config" => Ok(Operation::EditConfig(EditConfig::parse(request)?)),
            "commit" => Ok(Operation::Commit(Commit)),
            "discard-changes" => Ok(Operation::DiscardChanges(DiscardChanges)),
            "lock" => Ok(Operation::Lock(Lock::parse(request)?)),
            "unlock" => Ok(Operation::Unlock(Unlock::parse(request)?)),
            "validate" => Ok(Operation::Validate(Validate::parse(request)?)),
            "copy-config" => Ok(Operation::CopyConfig(CopyConfig::parse(request)?)),
            "delete-config" => Ok(Operation::DeleteConfig(DeleteConfig::parse(request)?)),
            other => Err(RpcError::new(ErrorType::Rpc, ErrorTag::OperationNotSupported)
                .with_message(format!("unknown rpc '{}'", other))),
        }
    }

    /// Execute the operation against a session
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        match self {
            Operation::Get(op) => op.execute(session).await,
            Operation::GetConfig(op) => op.execute(session).await,
            Operation::EditConfig(op) => op.execute(session).await,
            Operation::Commit(op) => op.execute(session).await,
            Operation::DiscardChanges(op) => op.execute(session).await,
            Operation::Lock(op) => op.execute(session).await,
            Operation::Unlock(op) => op.execute(session).await,
            Operation::Validate(op) => op.execute(session).await,
            Operation::CopyConfig(op) => op.execute(session).await,
            Operation::DeleteConfig(op) => op.execute(session).await,
        }
    }
}

/// Handle one request end-to-end and map the outcome into a reply
pub async fn dispatch(session: &mut Session, request: &RpcRequest) -> RpcReply {
    let started = Instant::now();
    log_op_start!(request.name.as_str(), session_id = session.id().as_str());

    let outcome = match Operation::parse(request) {
        Ok(operation) => operation.execute(session).await,
        Err(err) => Err(err),
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(reply) => {
            log_op_end!(request.name.as_str(), duration_ms = duration_ms);
            reply
        }
        Err(err) => {
            log_op_error!(request.name.as_str(), err, duration_ms = duration_ms);
            RpcReply::Errors(vec![err])
        }
    }
}

// ========== Shared parse helpers ==========

/// Find a direct child element by local name
pub(crate) fn find_child<'a>(node: &'a DataNode, local: &str) -> Option<&'a DataNode> {
    node.children()?
        .iter()
        .find(|child| child.name().local_name == local)
}

/// Require a direct child element by local name
pub(crate) fn require_child<'a>(node: &'a DataNode, local: &str, rpc: &str) -> Result<&'a DataNode> {
    find_child(node, local).ok_or_else(|| {
        RpcError::new(ErrorType::Protocol, ErrorTag::MissingElement)
            .with_message(format!("{} requires a <{}> element", rpc, local))
    })
}

/// The leaf value of an element, when it is a leaf
pub(crate) fn leaf_value(node: &DataNode) -> Option<&str> {
    match node {
        DataNode::Leaf { value, .. } => Some(value),
        _ => None,
    }
}

/// Parse a `<source>`/`<target>` clause naming a datastore
///
/// The clause holds exactly one child element whose name is the
/// datastore. An empty clause is `invalid-value` per the lock contract.
pub(crate) fn parse_datastore_clause(clause: &DataNode, clause_name: &str) -> Result<Datastore> {
    let children = clause.children().map(Vec::as_slice).unwrap_or_default();
    let child = children.first().ok_or_else(|| {
        RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
            .with_message(format!("<{}> names no datastore", clause_name))
    })?;
    Datastore::from_name(&child.name().local_name).ok_or_else(|| {
        RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue).with_message(format!(
            "unknown datastore '{}' in <{}>",
            child.name().local_name,
            clause_name
        ))
    })
}

/// Re-root an inline `<config>` element's children under a data root
pub(crate) fn config_to_root(config: &DataNode) -> DataNode {
    let mut root = DataNode::data_root();
    if let Some(children) = config.children() {
        for child in children {
            root.push_child(child.clone());
        }
    }
    root
}
