//! Middleware error types

use std::fmt;

use tessen_json_rpc::{RpcErrorCode, RpcErrorObject};

/// Errors that can occur during middleware execution.
///
/// These are converted to JSON-RPC error results at the dispatcher boundary
/// and propagate to the client with the code each variant maps to. Middleware
/// should use semantic variants rather than building error objects directly.
///
/// # JSON-RPC codes
///
/// - `Unauthenticated` / `Unauthorized` → `SERVER_ERROR` (-32000)
/// - `InvalidRequest` → `INVALID_REQUEST` (-32600)
/// - `InvalidParams` → `INVALID_PARAMS` (-32602)
/// - `Internal` → `INTERNAL_ERROR` (-32603)
/// - `Custom` → the code carried by the variant
#[derive(Debug, Clone, PartialEq)]
pub enum MiddlewareError {
    /// Authentication required but not provided
    Unauthenticated(String),

    /// Authentication provided but insufficient permissions
    Unauthorized(String),

    /// Request validation failed
    InvalidRequest(String),

    /// Parameter validation failed
    InvalidParams(String),

    /// Internal middleware error (details not exposed to the client)
    Internal(String),

    /// Any code from the closed enumeration with a custom message
    Custom {
        code: RpcErrorCode,
        message: String,
    },
}

impl fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated(msg) => write!(f, "Authentication required: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            Self::InvalidParams(msg) => write!(f, "Invalid params: {}", msg),
            Self::Internal(msg) => write!(f, "Internal middleware error: {}", msg),
            Self::Custom { code, message } => write!(f, "{}: {}", code.code(), message),
        }
    }
}

impl std::error::Error for MiddlewareError {}

impl MiddlewareError {
    /// Create an unauthenticated error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an invalid params error
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a custom error with an explicit code
    pub fn custom(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self::Custom {
            code,
            message: message.into(),
        }
    }

    /// The JSON-RPC error object this error propagates as, unchanged.
    pub fn to_error_object(&self) -> RpcErrorObject {
        match self {
            Self::Unauthenticated(_) | Self::Unauthorized(_) => {
                RpcErrorObject::new(RpcErrorCode::ServerError, Some(self.to_string()), None)
            }
            Self::InvalidRequest(msg) => {
                RpcErrorObject::new(RpcErrorCode::InvalidRequest, Some(msg.clone()), None)
            }
            Self::InvalidParams(msg) => RpcErrorObject::invalid_params(msg),
            // Internal details stay out of the wire form.
            Self::Internal(_) => RpcErrorObject::internal_error(None),
            Self::Custom { code, message } => {
                RpcErrorObject::new(*code, Some(message.clone()), None)
            }
        }
    }
}
