//! commit, discard-changes, lock, unlock
//!
//! Thin handlers: each resolves its target and delegates to the
//! session's transaction provider, which owns the lifecycle policy.

use conifer_core::errors::{ErrorTag, ErrorType, Result, RpcError};
use conifer_store::Datastore;

use crate::reply::RpcReply;
use crate::session::Session;

use super::{find_child, parse_datastore_clause, RpcRequest};

/// `commit`: publish the candidate into running
#[derive(Debug, Clone)]
pub struct Commit;

impl Commit {
    /// Validate and publish; a changeless commit is a successful no-op
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        let schema = session.schema();
        session.provider().commit(&schema).await?;
        Ok(RpcReply::Ok)
    }
}

/// `discard-changes`: reset the candidate to running
#[derive(Debug, Clone)]
pub struct DiscardChanges;

impl DiscardChanges {
    /// Always succeeds; discarding a pristine candidate is a no-op
    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        session.provider().discard_changes();
        Ok(RpcReply::Ok)
    }
}

/// `lock`: acquire the advisory lock on a datastore
#[derive(Debug, Clone)]
pub struct Lock {
    target: Datastore,
}

impl Lock {
    /// Parse the target; a target-less lock is `invalid-value`
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        Ok(Self {
            target: parse_lock_target(request, "lock")?,
        })
    }

    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        session.provider().lock(self.target)?;
        Ok(RpcReply::Ok)
    }
}

/// `unlock`: release the advisory lock on a datastore
#[derive(Debug, Clone)]
pub struct Unlock {
    target: Datastore,
}

impl Unlock {
    /// Parse the target; a target-less unlock is `invalid-value`
    pub fn parse(request: &RpcRequest) -> Result<Self> {
        Ok(Self {
            target: parse_lock_target(request, "unlock")?,
        })
    }

    pub async fn execute(self, session: &mut Session) -> Result<RpcReply> {
        session.provider().unlock(self.target)?;
        Ok(RpcReply::Ok)
    }
}

fn parse_lock_target(request: &RpcRequest, rpc: &str) -> Result<Datastore> {
    let clause = find_child(&request.input, "target").ok_or_else(|| {
        RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue)
            .with_message(format!("{} requires a <target> element", rpc))
    })?;
    parse_datastore_clause(clause, "target")
}
