//! Conifer Core - protocol-independent configuration tree kernel
//!
//! This crate provides the foundational data structures and operations for
//! conifer, including:
//! - QName / instance-identifier / data-node tree model
//! - Schema context model with a provider seam for the external YANG toolchain
//! - Subtree-filter and fields-parameter resolution to instance identifiers
//! - Edit-operation semantics (merge, replace, create, delete, remove)
//! - Structural validation rules shared by commit and validate
//! - The structured protocol error facility (error-type/tag/severity)
//! - The tracing-based logging facility

pub mod errors;
pub mod filter;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;
pub mod schema;

// Re-export commonly used types
pub use errors::{ErrorSeverity, ErrorTag, ErrorType, Result, RpcError};
pub use model::{DataNode, InstanceId, PathArgument, QName};
pub use ops::{DefaultOperation, EditEntity, EditOperation};
pub use schema::{SchemaContext, SchemaContextProvider, SchemaKind, SchemaNode, StaticSchemaProvider};
