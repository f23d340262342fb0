//! copy-config and delete-config
//!
//! Sources may be a datastore, an inline `<config>` element, or a url;
//! targets a datastore or a url. Url endpoints pass through the file
//! service and its allow-lists. Copying into running validates first and
//! publishes atomically through the same path commit uses; delete-config
//! of running is unconditionally rejected - running is only ever replaced
//! via commit, never deleted.

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::rules::validate_tree;
use conifer_store::Datastore;

use crate::reply::RpcReply;
use crate::session::Session;

use super::{config_to_root, find_child, leaf_value, require_child, RpcRequest};

/// A copy-config source clause
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Datastore(Datastore),
    Config(DataNode),
    Url(String),
}

/// A copy-config / delete-config target clause
#[derive(Debug, Clone)]
pub enum ConfigTarget {
    Datastore(Datastore),
    Url(String),
}

/// `copy-config`: replace the target with the source wholesale
#[derive(Debug, Clone)]
pub struct CopyConfig {
    source: ConfigSource,
    target: ConfigTarget,
}

impl CopyConfig {
    /// Parse source and target clauses
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        let source = parse_source(require_child(&request.input, "source", "copy-config")?)?;
        let target = parse_target(require_child(&request.input, "target", "copy-config")?)?;

        if let (ConfigSource::Datastore(source_ds), ConfigTarget::Datastore(target_ds)) =
            (&source, &target)
        {
            if source_ds == target_ds {
                return Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                    .with_message("copy-config source and target are identical"));
            }
        }
        Ok(Self { source, target })
    }

    /// Load the source tree and replace the target
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        let tree = match self.source {
            ConfigSource::Datastore(datastore) => session
                .provider()
                .read(datastore, &InstanceId::root())
                .await?
                .unwrap_or_else(DataNode::data_root),
            ConfigSource::Config(config) => config_to_root(&config),
            ConfigSource::Url(url) => session.files().load_config(&url).await?,
        };

        match self.target {
            ConfigTarget::Datastore(Datastore::Candidate) => {
                replace_datastore(session, Datastore::Candidate, tree).await?;
            }
            ConfigTarget::Datastore(Datastore::Running) => {
                // Running is only ever replaced by validated content
                let schema = session.schema();
                validate_tree(&tree, &schema)?;
                replace_datastore(session, Datastore::Running, tree).await?;
            }
            ConfigTarget::Datastore(Datastore::Operational) => {
                return Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                    .with_message("copy-config cannot target the operational datastore"));
            }
            ConfigTarget::Url(url) => {
                session.files().store_config(&url, &tree).await?;
            }
        }
        Ok(RpcReply::Ok)
    }
}

/// `delete-config`: delete the target configuration wholesale
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    target: ConfigTarget,
}

impl DeleteConfig {
    /// Parse the target clause
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        Ok(Self {
            target: parse_target(require_child(&request.input, "target", "delete-config")?)?,
        })
    }

    /// Clear the target; running is unconditionally rejected
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        match self.target {
            ConfigTarget::Datastore(Datastore::Running) => Err(RpcError::new(
                ErrorType::Protocol,
                ErrorTag::OperationNotSupported,
            )
            .with_message("running may only be replaced via commit, never deleted")),
            ConfigTarget::Datastore(Datastore::Candidate) => {
                replace_datastore(session, Datastore::Candidate, DataNode::data_root()).await?;
                Ok(RpcReply::Ok)
            }
            ConfigTarget::Datastore(Datastore::Operational) => {
                Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                    .with_message("delete-config cannot target the operational datastore"))
            }
            ConfigTarget::Url(url) => {
                session.files().delete_config(&url).await?;
                Ok(RpcReply::Ok)
            }
        }
    }
}

async fn replace_datastore(
    session: &mut Session,
    datastore: Datastore,
    tree: DataNode,
) -> Result<()> {
    let mut tx = session
        .provider()
        .new_read_write_transaction(datastore)
        .await?;
    tx.replace_root(tree);
    session.provider().submit(tx).await?;
    Ok(())
}

fn parse_source(clause: &DataNode) -> Result<ConfigSource> {
    let config = find_child(clause, "config");
    let url = find_child(clause, "url");
    let datastore = named_datastore(clause);

    reject_combined(&[config.is_some(), url.is_some(), datastore.is_some()], "source")?;

    if let Some(config) = config {
        return Ok(ConfigSource::Config(config.clone()));
    }
    if let Some(url) = url {
        return Ok(ConfigSource::Url(leaf_value(url).unwrap_or_default().to_string()));
    }
    match datastore {
        Some(datastore) => Ok(ConfigSource::Datastore(datastore)),
        None => Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
            .with_message("<source> names no datastore, config or url")),
    }
}

fn parse_target(clause: &DataNode) -> Result<ConfigTarget> {
    let url = find_child(clause, "url");
    let datastore = named_datastore(clause);

    reject_combined(&[url.is_some(), datastore.is_some()], "target")?;

    if let Some(url) = url {
        return Ok(ConfigTarget::Url(leaf_value(url).unwrap_or_default().to_string()));
    }
    match datastore {
        Some(datastore) => Ok(ConfigTarget::Datastore(datastore)),
        None => Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
            .with_message("<target> names no datastore or url")),
    }
}

fn named_datastore(clause: &DataNode) -> Option<Datastore> {
    clause
        .children()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .find_map(|child| Datastore::from_name(&child.name().local_name))
}

fn reject_combined(present: &[bool], clause_name: &str) -> Result<()> {
    if present.iter().filter(|p| **p).count() > 1 {
        return Err(
            RpcError::new(ErrorType::Application, ErrorTag::OperationNotSupported)
                .with_message(format!("<{}> accepts exactly one kind", clause_name)),
        );
    }
    Ok(())
}
