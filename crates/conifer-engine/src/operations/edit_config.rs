//! edit-config
//!
//! Decomposes the payload into document-ordered edit entities and applies
//! them inside one transaction against the target view. Error handling
//! follows the error-option:
//!
//! - `stop-on-error` (default): processing halts at the first failure;
//!   edits already applied in this call remain (the transaction is still
//!   submitted), only the overall RPC reports failure
//! - `continue-on-error`: every entity is attempted; all failures are
//!   reported, all successes remain
//! - `rollback-on-error`: permanently unsupported - fails before any
//!   store interaction, regardless of payload validity

use std::collections::BTreeMap;

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_core::model::{DataNode, InstanceId};
use conifer_core::ops::{split_edits, DefaultOperation, EditOperation};
use conifer_store::Datastore;

use crate::reply::RpcReply;
use crate::session::Session;

use super::{find_child, leaf_value, parse_datastore_clause, require_child, RpcRequest};

/// edit-config error-option values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorOption {
    #[default]
    StopOnError,
    ContinueOnError,
    RollbackOnError,
}

impl ErrorOption {
    /// Parse a wire error-option string
    ///
    /// # Errors
    ///
    /// Returns `invalid-value` for strings outside the option set.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "stop-on-error" => Ok(ErrorOption::StopOnError),
            "continue-on-error" => Ok(ErrorOption::ContinueOnError),
            "rollback-on-error" => Ok(ErrorOption::RollbackOnError),
            other => Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                .with_message(format!("unknown error-option '{}'", other))),
        }
    }
}

/// `edit-config`: apply an ordered edit list to candidate or running
#[derive(Debug, Clone)]
pub struct EditConfig {
    target: Datastore,
    default_operation: DefaultOperation,
    error_option: ErrorOption,
    config: DataNode,
    annotations: BTreeMap<InstanceId, EditOperation>,
}

impl EditConfig {
    /// Parse target, options, payload and operation annotations
    ///
    /// rollback-on-error is rejected here - before any store interaction
    /// and regardless of payload validity.
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        let target_clause = require_child(&request.input, "target", "edit-config")?;
        let target = parse_datastore_clause(target_clause, "target")?;
        if target == Datastore::Operational {
            return Err(RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
                .with_message("edit-config targets candidate or running, not operational"));
        }

        let default_operation = match find_child(&request.input, "default-operation") {
            Some(node) => DefaultOperation::parse(leaf_value(node).unwrap_or_default())?,
            None => DefaultOperation::default(),
        };

        let error_option = match find_child(&request.input, "error-option") {
            Some(node) => ErrorOption::parse(leaf_value(node).unwrap_or_default())?,
            None => ErrorOption::default(),
        };
        if error_option == ErrorOption::RollbackOnError {
            return Err(
                RpcError::new(ErrorType::Application, ErrorTag::OperationNotSupported)
                    .with_message("error-option 'rollback-on-error' is not supported"),
            );
        }

        let config = require_child(&request.input, "config", "edit-config")?.clone();

        let mut annotations = BTreeMap::new();
        for (path, operation) in &request.annotations {
            annotations.insert(path.clone(), EditOperation::parse(operation)?);
        }

        Ok(Self {
            target,
            default_operation,
            error_option,
            config,
            annotations,
        })
    }

    /// Apply the edit list in document order within one transaction
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        let entities = split_edits(&self.config, &self.annotations, self.default_operation)?;

        let mut tx = session
            .provider()
            .new_read_write_transaction(self.target)
            .await?;

        let mut errors = Vec::new();
        for entity in &entities {
            match tx.apply(entity) {
                Ok(()) => {}
                Err(err) => {
                    errors.push(err);
                    if self.error_option == ErrorOption::StopOnError {
                        break;
                    }
                }
            }
        }

        // Edits already applied in this call remain, in every error mode
        session.provider().submit(tx).await?;

        if errors.is_empty() {
            Ok(RpcReply::Ok)
        } else {
            Ok(RpcReply::Errors(errors))
        }
    }
}
