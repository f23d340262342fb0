//! get and get-config
//!
//! Both run the same read pipeline; they differ only in which datastore
//! view they resolve to. An absent filter selects the whole datastore; a
//! read that yields nothing returns the explicitly empty data element,
//! never an absent one.

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::filter::resolve_subtree;
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::ops::tree;
use conifer_store::Datastore;

use crate::reply::RpcReply;
use crate::session::Session;

use super::{find_child, parse_datastore_clause, RpcRequest};

/// `get`: read from the operational datastore
#[derive(Debug, Clone)]
pub struct Get {
    filter: Option<DataNode>,
}

impl Get {
    /// Parse the optional subtree filter
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        Ok(Self {
            filter: find_child(&request.input, "filter").cloned(),
        })
    }

    /// Execute against the operational datastore
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        let data = read_with_filter(session, Datastore::Operational, self.filter.as_ref()).await?;
        Ok(RpcReply::Data(data))
    }
}

/// `get-config`: read from candidate or running
#[derive(Debug, Clone)]
pub struct GetConfig {
    source: Datastore,
    filter: Option<DataNode>,
}

impl GetConfig {
    /// Parse the source datastore and optional subtree filter
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        let source_clause = super::require_child(&request.input, "source", "get-config")?;
        let source = parse_datastore_clause(source_clause, "source")?;
        if source == Datastore::Operational {
            return Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                .with_message("get-config reads candidate or running, not operational"));
        }
        Ok(Self {
            source,
            filter: find_child(&request.input, "filter").cloned(),
        })
    }

    /// Execute against the requested configuration view
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        let data = read_with_filter(session, self.source, self.filter.as_ref()).await?;
        Ok(RpcReply::Data(data))
    }
}

/// Resolve the filter to paths, read each, and assemble one result tree
///
/// `None` means "no data matched" - the reply mapper renders it as the
/// explicitly empty data element.
pub(crate) async fn read_with_filter(
    session: &mut Session,
    datastore: Datastore,
    filter: Option<&DataNode>,
) -> Result<Option<DataNode>> {
    match filter {
        None => {
            let root = session
                .provider()
                .read(datastore, &InstanceId::root())
                .await?;
            Ok(root.filter(|node| !node.is_empty()))
        }
        Some(filter) => {
            let schema = session.schema();
            let paths = resolve_subtree(filter, &schema)?;
            let mut result = DataNode::data_root();
            let mut matched = false;
            for path in &paths {
                if let Some(node) = session.provider().read(datastore, path).await? {
                    tree::replace_at(&mut result, path, node)?;
                    matched = true;
                }
            }
            Ok(matched.then_some(result))
        }
    }
}
