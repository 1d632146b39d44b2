use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::message::promote_empty;

/// JSON-RPC error codes (closed enumeration, reserved range)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError,
}

impl RpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            RpcErrorCode::ParseError => -32700,
            RpcErrorCode::InvalidRequest => -32600,
            RpcErrorCode::MethodNotFound => -32601,
            RpcErrorCode::InvalidParams => -32602,
            RpcErrorCode::InternalError => -32603,
            RpcErrorCode::ServerError => -32000,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RpcErrorCode::ParseError => "Parse error",
            RpcErrorCode::InvalidRequest => "Invalid Request",
            RpcErrorCode::MethodNotFound => "Method not found",
            RpcErrorCode::InvalidParams => "Invalid params",
            RpcErrorCode::InternalError => "Internal error",
            RpcErrorCode::ServerError => "Server error",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(RpcErrorCode::ParseError),
            -32600 => Some(RpcErrorCode::InvalidRequest),
            -32601 => Some(RpcErrorCode::MethodNotFound),
            -32602 => Some(RpcErrorCode::InvalidParams),
            -32603 => Some(RpcErrorCode::InternalError),
            -32000 => Some(RpcErrorCode::ServerError),
            _ => None,
        }
    }

    /// True for codes in the reserved server error range (-32099..=-32000).
    pub fn is_server_error(&self) -> bool {
        (crate::error_codes::SERVER_ERROR_START..=crate::error_codes::SERVER_ERROR_END)
            .contains(&self.code())
    }
}

impl fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC error object: `{code, message, data?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    pub fn new(code: RpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn parse_error(data: Option<Value>) -> Self {
        Self::new(RpcErrorCode::ParseError, None, data)
    }

    pub fn invalid_request(data: Option<Value>) -> Self {
        Self::new(RpcErrorCode::InvalidRequest, None, data)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            RpcErrorCode::MethodNotFound,
            Some(format!("Method '{}' not found", method)),
            None,
        )
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::new(RpcErrorCode::InvalidParams, Some(message.to_string()), None)
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(RpcErrorCode::InternalError, message, None)
    }

    pub fn server_error(message: &str, data: Option<Value>) -> Self {
        Self::new(RpcErrorCode::ServerError, Some(message.to_string()), data)
    }

    /// Encode as a wire object. Empty collections inside `data` become `{}`.
    pub fn to_wire(&self) -> Value {
        let mut wire = serde_json::Map::new();
        wire.insert("code".to_string(), Value::Number(self.code.into()));
        wire.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            wire.insert("data".to_string(), promote_empty(data.clone()));
        }
        Value::Object(wire)
    }
}

impl fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC Error {}: {}", self.code, self.message)
    }
}

/// An application-level fault raised by handlers or middleware.
///
/// `Explicit` faults carry a code/message chosen by application code and pass
/// through the dispatcher's error-exposure policy unredacted. `Operational`
/// faults are server-side conditions reported as `SERVER_ERROR`. `Unexpected`
/// wraps any other error at the dispatch boundary; its message is only exposed
/// in `data` when the router's exposure policy allows it.
#[derive(Debug, Error)]
pub enum RpcFault {
    #[error("{message}")]
    Explicit {
        code: RpcErrorCode,
        message: String,
        data: Option<Value>,
    },

    #[error("server fault: {0}")]
    Operational(String),

    #[error("internal fault: {0}")]
    Unexpected(Box<dyn std::error::Error + Send + Sync>),
}

impl RpcFault {
    pub fn explicit(code: RpcErrorCode, message: impl Into<String>, data: Option<Value>) -> Self {
        RpcFault::Explicit {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::explicit(RpcErrorCode::InvalidParams, message, None)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::explicit(RpcErrorCode::InvalidRequest, message, None)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::explicit(
            RpcErrorCode::MethodNotFound,
            format!("Method '{}' not found", method),
            None,
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::explicit(RpcErrorCode::InternalError, message, None)
    }

    pub fn server(message: impl Into<String>) -> Self {
        RpcFault::Operational(message.into())
    }

    pub fn unexpected<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RpcFault::Unexpected(Box::new(source))
    }

    /// The JSON-RPC code this fault maps to.
    pub fn code(&self) -> RpcErrorCode {
        match self {
            RpcFault::Explicit { code, .. } => *code,
            RpcFault::Operational(_) => RpcErrorCode::ServerError,
            RpcFault::Unexpected(_) => RpcErrorCode::InternalError,
        }
    }

    /// Convert into an error object. `expose_details` controls whether the
    /// underlying message of an `Unexpected` fault is surfaced in `data`;
    /// explicit and operational faults keep their own message either way.
    pub fn to_error_object(&self, expose_details: bool) -> RpcErrorObject {
        match self {
            RpcFault::Explicit {
                code,
                message,
                data,
            } => RpcErrorObject::new(*code, Some(message.clone()), data.clone()),
            RpcFault::Operational(message) => RpcErrorObject::server_error(message, None),
            RpcFault::Unexpected(source) => {
                let mut object = RpcErrorObject::internal_error(None);
                object.data = expose_details.then(|| Value::String(source.to_string()));
                object
            }
        }
    }
}

/// Faults raised while decoding a JSON-RPC envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON-RPC envelope")]
    NotAnObject,

    #[error("incoming call is missing a method")]
    MissingMethod,

    #[error("malformed '{0}' field")]
    InvalidField(&'static str),
}

impl EnvelopeError {
    /// The JSON-RPC code this decoding fault maps to.
    pub fn error_code(&self) -> RpcErrorCode {
        match self {
            EnvelopeError::Json(_) => RpcErrorCode::ParseError,
            _ => RpcErrorCode::InvalidRequest,
        }
    }
}
