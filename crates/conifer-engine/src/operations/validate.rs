//! validate
//!
//! Runs commit's structural checks without committing. The source is
//! exactly one of: the candidate datastore, an inline `<config>` element,
//! or a `<url>` resolved through the file service. Combining a datastore
//! with inline config is rejected, as is an empty source.

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::rules::validate_tree;
use conifer_store::Datastore;

use crate::reply::RpcReply;
use crate::session::Session;

use super::{config_to_root, find_child, leaf_value, RpcRequest};

/// What a validate request names as its source
#[derive(Debug, Clone)]
pub enum ValidateSource {
    Candidate,
    Config(DataNode),
    Url(String),
}

/// `validate`: structural validation without commit
#[derive(Debug, Clone)]
pub struct Validate {
    source: ValidateSource,
}

impl Validate {
    /// Parse and shape-check the source clause
    ///
    /// # Errors
    ///
    /// * `invalid-value` (application) - empty source, or a datastore
    ///   other than candidate
    /// * `operation-not-supported` (application) - more than one source
    ///   kind in the same request
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        let clause = find_child(&request.input, "source").ok_or_else(|| {
            RpcError::new(ErrorType::Application, ErrorTag::InvalidValue)
                .with_message("validate requires a <source> element")
        })?;

        let config = find_child(clause, "config");
        let url = find_child(clause, "url");
        let datastore = clause.children().map(Vec::as_slice).unwrap_or_default().iter().find_map(
            |child| Datastore::from_name(&child.name().local_name),
        );

        let named = [config.is_some(), url.is_some(), datastore.is_some()]
            .iter()
            .filter(|present| **present)
            .count();
        if named > 1 {
            return Err(
                RpcError::new(ErrorType::Application, ErrorTag::OperationNotSupported)
                    .with_message("validate accepts exactly one source kind"),
            );
        }

        if let Some(config) = config {
            return Ok(Self {
                source: ValidateSource::Config(config.clone()),
            });
        }
        if let Some(url) = url {
            return Ok(Self {
                source: ValidateSource::Url(leaf_value(url).unwrap_or_default().to_string()),
            });
        }
        match datastore {
            Some(Datastore::Candidate) => Ok(Self {
                source: ValidateSource::Candidate,
            }),
            Some(other) => Err(RpcError::new(ErrorType::Application, ErrorTag::InvalidValue)
                .with_message(format!("validate source '{}' is not supported", other))),
            None => Err(RpcError::new(ErrorType::Application, ErrorTag::InvalidValue)
                .with_message("validate source is empty")),
        }
    }

    /// Load the source tree and run the structural checks
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        let root = match self.source {
            ValidateSource::Candidate => session
                .provider()
                .read(Datastore::Candidate, &InstanceId::root())
                .await?
                .unwrap_or_else(DataNode::data_root),
            ValidateSource::Config(config) => config_to_root(&config),
            ValidateSource::Url(url) => session.files().load_config(&url).await?,
        };
        let schema = session.schema();
        validate_tree(&root, &schema)?;
        Ok(RpcReply::Ok)
    }
}
