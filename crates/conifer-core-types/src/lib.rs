//! Core types shared across conifer facilities
//!
//! This crate provides foundational types used by the protocol, store and
//! logging layers:
//!
//! - **Correlation types**: RequestId, SessionId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, SessionId, TraceId};
