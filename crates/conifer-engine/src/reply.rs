//! Response/error mapper
//!
//! Every operation outcome becomes exactly one reply shape: `Ok` (a void
//! result, rendered `<ok/>`), `Data` (a result tree; `None` renders the
//! explicitly empty data element), or `Errors` (one or more structured
//! protocol errors, detection order preserved, first error always
//! present). The mapper is a pure projection - it never invents tags and
//! never downgrades severity.

use serde::Serialize;

use conifer_core::errors::RpcError;
use conifer_core::model::DataNode;

/// One protocol reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RpcReply {
    /// Void success
    Ok,
    /// Result tree; `None` is the explicitly empty data element
    Data(Option<DataNode>),
    /// One or more structured errors, detection order preserved
    Errors(Vec<RpcError>),
}

impl RpcReply {
    /// Project an operation outcome into a reply
    pub fn from_result(result: conifer_core::errors::Result<RpcReply>) -> RpcReply {
        match result {
            Ok(reply) => reply,
            Err(err) => RpcReply::Errors(vec![err]),
        }
    }

    /// Whether this reply reports success
    pub fn is_ok(&self) -> bool {
        !matches!(self, RpcReply::Errors(_))
    }

    /// The first error, when this reply reports failure
    pub fn first_error(&self) -> Option<&RpcError> {
        match self {
            RpcReply::Errors(errors) => errors.first(),
            _ => None,
        }
    }

    /// The result tree, when this reply carries data
    pub fn data(&self) -> Option<&DataNode> {
        match self {
            RpcReply::Data(Some(node)) => Some(node),
            _ => None,
        }
    }

    /// Whether this reply is the explicitly empty data element
    pub fn is_empty_data(&self) -> bool {
        matches!(self, RpcReply::Data(None))
    }
}
