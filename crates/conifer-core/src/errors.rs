use serde::{Deserialize, Serialize};

use crate::model::InstanceId;

/// Result type alias using RpcError
pub type Result<T> = std::result::Result<T, RpcError>;

// ========== Protocol Error Facility ==========

/// Protocol error classification layer
///
/// Identifies which conceptual layer of the protocol stack detected the
/// failure. Every protocol-level failure carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

impl ErrorType {
    /// Get the stable wire string for this error type
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        }
    }
}

/// Canonical error tag taxonomy
///
/// This taxonomy provides a stable, structured classification of all
/// protocol failures. Each tag maps to a stable wire string used for
/// programmatic error handling, testing, and reply serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorTag {
    // Shape / validation
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    MalformedMessage,

    // State conflict
    DataExists,
    DataMissing,
    InUse,

    // Access / locking
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,

    // Unsupported feature / backend
    OperationNotSupported,
    OperationFailed,
    PartialOperation,
}

impl ErrorTag {
    /// Get the stable wire tag string for this error tag
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::TooBig => "too-big",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::MalformedMessage => "malformed-message",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::InUse => "in-use",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::ResourceDenied => "resource-denied",
            ErrorTag::RollbackFailed => "rollback-failed",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::PartialOperation => "partial-operation",
        }
    }
}

/// Error severity as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl ErrorSeverity {
    /// Get the stable wire string for this severity
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Error => "error",
            ErrorSeverity::Warning => "warning",
        }
    }
}

/// Canonical structured protocol error
///
/// Every failure in the system surfaces as one of these - created at the
/// point of failure detection, enriched with context on the way up, and
/// projected unmodified into the protocol reply. Nothing is logged-and-
/// swallowed below the reply mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    error_type: ErrorType,
    tag: ErrorTag,
    severity: ErrorSeverity,
    path: Option<InstanceId>,
    message: Option<String>,
    app_tag: Option<String>,
    session_id: Option<String>,
}

impl RpcError {
    /// Create a new error with the specified type and tag, severity `error`
    pub fn new(error_type: ErrorType, tag: ErrorTag) -> Self {
        Self {
            error_type,
            tag,
            severity: ErrorSeverity::Error,
            path: None,
            message: None,
            app_tag: None,
            session_id: None,
        }
    }

    /// Downgrade the severity to `warning`
    pub fn as_warning(mut self) -> Self {
        self.severity = ErrorSeverity::Warning;
        self
    }

    /// Add the offending instance identifier
    pub fn with_path(mut self, path: InstanceId) -> Self {
        self.path = Some(path);
        self
    }

    /// Add a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add an application-specific sub-tag
    pub fn with_app_tag(mut self, app_tag: impl Into<String>) -> Self {
        self.app_tag = Some(app_tag.into());
        self
    }

    /// Add the session that caused or holds the conflicting state
    /// (used for lock-denied to name the lock holder)
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Get the error type
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Get the error tag
    pub fn tag(&self) -> ErrorTag {
        self.tag
    }

    /// Get the severity
    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    /// Get the offending path, if any
    pub fn path(&self) -> Option<&InstanceId> {
        self.path.as_ref()
    }

    /// Get the message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Get the application sub-tag, if any
    pub fn app_tag(&self) -> Option<&str> {
        self.app_tag.as_deref()
    }

    /// Get the conflicting session id, if any
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {}",
            self.error_type.as_str(),
            self.severity.as_str(),
            self.tag.tag()
        )?;
        if let Some(path) = &self.path {
            write!(f, " at {}", path)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        if let Some(session_id) = &self.session_id {
            write!(f, " (session: {})", session_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

// ========== End Protocol Error Facility ==========

/// Conversion from serde_json::Error: URL-backed config payloads that fail
/// to decode surface as a backend failure, never a panic.
impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::new(ErrorType::Application, ErrorTag::OperationFailed)
            .with_message(format!("payload decode failed: {}", err))
    }
}
