use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::RpcErrorObject;
use crate::message::promote_empty;
use crate::types::{JsonRpcVersion, MessageId};

/// Raised when a response is constructed with an invalid result/error shape.
///
/// JSON-RPC forbids a response carrying both members; constructing one is a
/// programming error rejected up front rather than resolved silently.
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("RPC response must contain either a result or an error")]
    MissingResultOrError,

    #[error("RPC response must contain either a result or an error, not both")]
    ResultAndError,
}

/// A JSON-RPC response: a result or an error, never both.
///
/// Fields are private so the result/error mutual exclusion holds by
/// construction. An empty result collection encodes as `{}`, never `[]`.
#[derive(Debug, Clone)]
pub struct RpcResponse {
    version: JsonRpcVersion,
    id: MessageId,
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Build a response, rejecting invalid result/error combinations.
    pub fn new(
        id: MessageId,
        result: Option<Value>,
        error: Option<RpcErrorObject>,
    ) -> Result<Self, ResponseError> {
        match (&result, &error) {
            (None, None) => Err(ResponseError::MissingResultOrError),
            (Some(_), Some(_)) => Err(ResponseError::ResultAndError),
            _ => Ok(Self {
                version: JsonRpcVersion::V2_0,
                id,
                result,
                error,
            }),
        }
    }

    /// A successful response. A `Null` payload becomes an empty result object.
    pub fn result(id: MessageId, result: Value) -> Self {
        let result = if result.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            result
        };
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// An error response.
    pub fn error(id: MessageId, error: RpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn payload(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error_object(&self) -> Option<&RpcErrorObject> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Encode as a wire object: `jsonrpc`, `id`, and exactly one of
    /// `result`/`error`. Empty collections in the result become `{}`.
    pub fn to_wire(&self) -> Value {
        let mut wire = serde_json::Map::new();
        wire.insert(
            "jsonrpc".to_string(),
            Value::String(self.version.as_str().to_string()),
        );
        wire.insert("id".to_string(), self.id.to_value());

        match (&self.result, &self.error) {
            (_, Some(error)) => {
                wire.insert("error".to_string(), error.to_wire());
            }
            (Some(result), None) => {
                wire.insert("result".to_string(), promote_empty(result.clone()));
            }
            (None, None) => unreachable!("response invariant enforced at construction"),
        }

        Value::Object(wire)
    }

    pub fn to_wire_string(&self) -> String {
        self.to_wire().to_string()
    }
}

impl Serialize for RpcResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

impl std::fmt::Display for RpcResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}
