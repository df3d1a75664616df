//! Error types for the HR portal ERP bridge.
//!
//! Errors fall into three classes that drive dispatch policy:
//! - transport failures (nothing resembling a response envelope arrived),
//! - RPC errors (the backend answered with a well-formed `error` envelope),
//! - validation errors (the call was rejected before touching the network).

use thiserror::Error;

/// Main error type for the portal bridge.
#[derive(Debug, Error)]
pub enum PortalError {
    // Transport errors
    #[error("Transport error: {reason}")]
    Transport {
        reason: String,
        /// HTTP status, when a response without an RPC error body arrived.
        status: Option<u16>,
    },

    // Envelope errors
    #[error("RPC error: {message}")]
    Rpc { message: String, code: Option<i64> },

    // Caller errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PortalError::Transport {
                reason: "timeout".to_string(),
                status: None,
            }
        } else {
            PortalError::Transport {
                reason: err.to_string(),
                status: err.status().map(|s| s.as_u16()),
            }
        }
    }
}

impl PortalError {
    /// Shorthand for a transport failure without a status code.
    pub fn transport(reason: impl Into<String>) -> Self {
        PortalError::Transport {
            reason: reason.into(),
            status: None,
        }
    }

    /// Shorthand for an RPC error without a backend code.
    pub fn rpc(message: impl Into<String>) -> Self {
        PortalError::Rpc {
            message: message.into(),
            code: None,
        }
    }

    /// Shorthand for a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PortalError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when no response envelope exists for the failed call.
    ///
    /// Timeouts are reported as `Transport { reason: "timeout" }`. Only these
    /// failures are eligible for mock fallback.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, PortalError::Transport { .. })
    }

    /// True for a well-formed rejection from a reachable backend.
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, PortalError::Rpc { .. })
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes:
    /// - -32000: Transport/connectivity error
    /// - -32001: Backend rejected the call (original code is kept when known)
    pub fn to_rpc_error_code(&self) -> i64 {
        match self {
            PortalError::Transport { .. } => -32000,
            PortalError::Rpc { code, .. } => code.unwrap_or(-32001),
            PortalError::Validation { .. } => -32602,
            _ => -32603,
        }
    }
}
