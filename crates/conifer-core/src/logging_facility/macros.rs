//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use conifer_core::log_op_start;
/// log_op_start!("edit_config");
/// log_op_start!("edit_config", datastore = "candidate");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = conifer_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = conifer_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use conifer_core::log_op_end;
/// log_op_end!("edit_config", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = conifer_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = conifer_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use conifer_core::{log_op_error, errors::{ErrorTag, ErrorType, RpcError}};
/// let err = RpcError::new(ErrorType::Protocol, ErrorTag::DataMissing);
/// log_op_error!("edit_config", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let rpc_err: &$crate::errors::RpcError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = conifer_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_tag = rpc_err.tag().tag(),
            err_type = rpc_err.error_type().as_str(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let rpc_err: &$crate::errors::RpcError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = conifer_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_tag = rpc_err.tag().tag(),
            err_type = rpc_err.error_type().as_str(),
            $($field)*
        );
    }};
}
