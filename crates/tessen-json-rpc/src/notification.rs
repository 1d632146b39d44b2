use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::message::promote_empty;
use crate::request::{RpcParams, RpcRequest};
use crate::types::{JsonRpcVersion, MessageId};

/// A JSON-RPC notification (request without an id).
///
/// Fire-and-forget: no response is transmitted for a notification even if the
/// handler errors, though the dispatcher still computes one for telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcNotification {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RpcParams>,
}

impl RpcNotification {
    pub fn new(method: String, params: Option<RpcParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
        }
    }

    /// Create a new notification with no parameters
    pub fn new_no_params(method: String) -> Self {
        Self::new(method, None)
    }

    /// Create a new notification with object parameters
    pub fn new_with_object_params(method: String, params: HashMap<String, Value>) -> Self {
        Self::new(method, Some(RpcParams::Object(params)))
    }

    /// Create a new notification with array parameters
    pub fn new_with_array_params(method: String, params: Vec<Value>) -> Self {
        Self::new(method, Some(RpcParams::Array(params)))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&RpcParams> {
        self.params.as_ref()
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.as_ref()?.get_index(index)
    }

    /// View this notification as a request with a null id, for dispatching.
    pub fn to_request(&self) -> RpcRequest {
        RpcRequest::new(MessageId::Null, self.method.clone(), self.params.clone())
    }

    /// Encode as a wire object. Never carries an `id` field.
    pub fn to_wire(&self) -> Value {
        let mut wire = serde_json::Map::new();
        wire.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
        wire.insert("method".to_string(), Value::String(self.method.clone()));
        if let Some(params) = &self.params {
            wire.insert("params".to_string(), promote_empty(params.to_value()));
        }
        Value::Object(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_string};

    #[test]
    fn test_notification_serialization() {
        let notification = RpcNotification::new_no_params("test_notification".to_string());

        let json_str = to_string(&notification).unwrap();
        let parsed: RpcNotification = from_str(&json_str).unwrap();

        assert_eq!(parsed.method, "test_notification");
        assert!(parsed.params.is_none());
    }

    #[test]
    fn test_notification_with_params() {
        let mut params = HashMap::new();
        params.insert("message".to_string(), json!("Hello"));
        params.insert("level".to_string(), json!("info"));

        let notification = RpcNotification::new_with_object_params("log".to_string(), params);

        assert_eq!(notification.get_param("message"), Some(&json!("Hello")));
        assert_eq!(notification.get_param("level"), Some(&json!("info")));
    }

    #[test]
    fn test_notification_json_format() {
        let notification = RpcNotification::new_no_params("ping".to_string());
        let json_str = serde_json::to_string(&notification.to_wire()).unwrap();

        // Should not contain an "id" field
        assert!(!json_str.contains("\"id\""));
        assert!(json_str.contains("\"jsonrpc\":\"2.0\""));
        assert!(json_str.contains("\"method\":\"ping\""));
    }

    #[test]
    fn test_notification_as_request() {
        let notification = RpcNotification::new_no_params("ping".to_string());
        let request = notification.to_request();
        assert!(request.is_notification());
        assert_eq!(request.method(), "ping");
    }
}
