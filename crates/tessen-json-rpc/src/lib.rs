//! # JSON-RPC 2.0 Message Model
//!
//! A pure, transport-agnostic JSON-RPC 2.0 message model. This crate provides
//! the envelope value types and their (de)serialization rules without any
//! routing or transport code.
//!
//! ## Features
//! - Full JSON-RPC 2.0 envelope compliance
//! - Transport agnostic (works with HTTP, WebSocket, TCP, etc.)
//! - Fail-fast response construction (a response is a result *or* an error)
//! - Empty collections in outgoing payloads encode as `{}`, never `[]`

pub mod error;
pub mod message;
pub mod notification;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use error::{EnvelopeError, RpcErrorCode, RpcErrorObject, RpcFault};
pub use message::RpcMessage;
pub use notification::RpcNotification;
pub use request::{RpcParams, RpcRequest};
pub use response::{ResponseError, RpcResponse};
pub use types::{JsonRpcVersion, MessageId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
