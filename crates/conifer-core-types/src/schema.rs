//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_SESSION_ID: &str = "session_id";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Protocol identifiers
pub const FIELD_RPC: &str = "rpc";
pub const FIELD_DATASTORE: &str = "datastore";
pub const FIELD_PATH: &str = "path";
pub const FIELD_REVISION: &str = "revision";

// Collection sizes
pub const FIELD_EDIT_COUNT: &str = "edit_count";
pub const FIELD_PATH_COUNT: &str = "path_count";

// Error fields
pub const FIELD_ERR_TAG: &str = "err.tag";
pub const FIELD_ERR_TYPE: &str = "err.type";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
