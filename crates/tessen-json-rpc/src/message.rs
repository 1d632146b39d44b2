//! Envelope decoding and encoding.
//!
//! A raw payload decodes into one of the message kinds by inspecting the
//! envelope keys, in order: `error` → error result, `result` → success
//! result, no usable `id` → notification, otherwise request.

use serde_json::{Map, Value};

use crate::error::{EnvelopeError, RpcErrorObject};
use crate::notification::RpcNotification;
use crate::request::{RpcParams, RpcRequest};
use crate::response::RpcResponse;
use crate::types::MessageId;

/// Rewrite every empty collection to an empty object.
///
/// JSON-RPC interop requirement: not all clients accept `[]` where an
/// object-shaped value is expected, so empty collections always encode as
/// `{}` on the wire.
pub(crate) fn promote_empty(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Value::Object(Map::new())
            } else {
                Value::Array(items.into_iter().map(promote_empty).collect())
            }
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, promote_empty(item)))
                .collect(),
        ),
        other => other,
    }
}

/// Union of the four JSON-RPC message kinds.
///
/// Success and error results share the [`RpcResponse`] representation;
/// [`RpcResponse::is_error`] tells them apart.
#[derive(Debug, Clone)]
pub enum RpcMessage {
    Request(RpcRequest),
    Notification(RpcNotification),
    Response(RpcResponse),
}

impl RpcMessage {
    /// Decode a raw JSON-RPC payload.
    pub fn parse(raw: &str) -> Result<Self, EnvelopeError> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// Decode an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let envelope = match value {
            Value::Object(map) => map,
            _ => return Err(EnvelopeError::NotAnObject),
        };

        let id = match envelope.get("id") {
            None | Some(Value::Null) => MessageId::Null,
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|_| EnvelopeError::InvalidField("id"))?,
        };

        if let Some(raw) = envelope.get("error") {
            let error: RpcErrorObject = serde_json::from_value(raw.clone())
                .map_err(|_| EnvelopeError::InvalidField("error"))?;
            return Ok(RpcMessage::Response(RpcResponse::error(id, error)));
        }

        if let Some(result) = envelope.get("result") {
            return Ok(RpcMessage::Response(RpcResponse::result(
                id,
                result.clone(),
            )));
        }

        let method = match envelope.get("method").and_then(Value::as_str) {
            Some(method) if !method.is_empty() => method.to_string(),
            _ => return Err(EnvelopeError::MissingMethod),
        };

        let params = match envelope.get("params") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<RpcParams>(raw.clone())
                    .map_err(|_| EnvelopeError::InvalidField("params"))?,
            ),
        };

        if id.is_null() {
            Ok(RpcMessage::Notification(RpcNotification::new(
                method, params,
            )))
        } else {
            Ok(RpcMessage::Request(RpcRequest::new(id, method, params)))
        }
    }

    pub fn id(&self) -> Option<&MessageId> {
        match self {
            RpcMessage::Request(request) => Some(request.id()),
            RpcMessage::Notification(_) => None,
            RpcMessage::Response(response) => Some(response.id()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RpcMessage::Response(response) if response.is_error())
    }

    /// Encode as a wire object; always carries `"jsonrpc": "2.0"`.
    pub fn to_wire(&self) -> Value {
        match self {
            RpcMessage::Request(request) => request.to_wire(),
            RpcMessage::Notification(notification) => notification.to_wire(),
            RpcMessage::Response(response) => response.to_wire(),
        }
    }

    pub fn to_wire_string(&self) -> String {
        self.to_wire().to_string()
    }
}

impl From<RpcRequest> for RpcMessage {
    fn from(request: RpcRequest) -> Self {
        RpcMessage::Request(request)
    }
}

impl From<RpcNotification> for RpcMessage {
    fn from(notification: RpcNotification) -> Self {
        RpcMessage::Notification(notification)
    }
}

impl From<RpcResponse> for RpcMessage {
    fn from(response: RpcResponse) -> Self {
        RpcMessage::Response(response)
    }
}
