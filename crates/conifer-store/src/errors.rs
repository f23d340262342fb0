use conifer_core::errors::{ErrorTag, ErrorType, RpcError};
use conifer_core_types::SessionId;
use thiserror::Error;

/// Result type alias for store-internal operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store-internal error taxonomy
///
/// These cover infrastructure-level failures below the protocol surface.
/// The transaction provider converts them into structured protocol errors
/// at the boundary; nothing above the provider sees a `StoreError`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The candidate datastore is locked by another session
    #[error("candidate datastore is locked by session {holder}")]
    LockDenied { holder: SessionId },

    /// The transaction chain was closed (session teardown or post-commit)
    #[error("transaction chain for {datastore} is closed")]
    ChainClosed { datastore: String },

    /// A transaction was submitted into the wrong chain
    #[error("transaction targets {actual}, chain serves {expected}")]
    DatastoreMismatch { expected: String, actual: String },

    /// The backend rejected or lost a commit
    #[error("datastore backend failure: {message}")]
    Backend { message: String },
}

/// Conversion into the structured protocol error surface
///
/// Lock conflicts keep their holder so the reply can name the session;
/// everything infrastructure-shaped becomes `operation-failed`.
impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LockDenied { holder } => {
                RpcError::new(ErrorType::Protocol, ErrorTag::LockDenied)
                    .with_message("candidate datastore is locked by another session")
                    .with_session(holder.as_str())
            }
            StoreError::ChainClosed { datastore } => {
                RpcError::new(ErrorType::Application, ErrorTag::OperationFailed)
                    .with_message(format!("transaction chain for {} is closed", datastore))
            }
            StoreError::DatastoreMismatch { expected, actual } => {
                RpcError::new(ErrorType::Application, ErrorTag::OperationFailed)
                    .with_message(format!(
                        "transaction targets {}, chain serves {}",
                        actual, expected
                    ))
            }
            StoreError::Backend { message } => {
                RpcError::new(ErrorType::Application, ErrorTag::OperationFailed)
                    .with_message(message)
            }
        }
    }
}
