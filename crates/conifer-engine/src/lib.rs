//! Conifer Engine - protocol operation surface
//!
//! This crate maps protocol requests onto the transactional datastore:
//! - `Session`: the per-connection context owning its transaction provider
//! - `operations`: the NETCONF operation handlers and dispatch table
//! - `reply`: the response/error mapper producing exactly one reply shape
//! - `restconf`: the RESTCONF data-resource surface (PATCH/PUT/POST/DELETE,
//!   YANG-Patch ordered edit lists)
//! - `files`: the URL file-service collaborator with directory allow-lists
//! - `config`: TOML-backed engine configuration

pub mod config;
pub mod files;
pub mod operations;
pub mod reply;
pub mod restconf;
pub mod session;

pub use config::EngineConfig;
pub use files::FileService;
pub use operations::{dispatch, Operation, RpcRequest};
pub use reply::RpcReply;
pub use session::Session;
