use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::message::promote_empty;
use crate::types::{JsonRpcVersion, MessageId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RpcParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(HashMap<String, Value>),
}

impl RpcParams {
    /// Get a parameter by name (for object params)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            RpcParams::Object(map) => map.get(key),
            RpcParams::Array(_) => None, // Can't get by name from array
        }
    }

    /// Get a parameter by index (for array params only)
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            RpcParams::Array(vec) => vec.get(index),
            RpcParams::Object(_) => None, // Can't get by index from object
        }
    }

    /// Convert to HashMap for easier processing (arrays become indexed keys)
    pub fn to_map(&self) -> HashMap<String, Value> {
        match self {
            RpcParams::Object(map) => map.clone(),
            RpcParams::Array(vec) => vec
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
        }
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        match self {
            RpcParams::Object(map) => map.is_empty(),
            RpcParams::Array(vec) => vec.is_empty(),
        }
    }

    /// Convert to a serde_json::Value for serialization
    pub fn to_value(&self) -> Value {
        match self {
            RpcParams::Object(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            RpcParams::Array(arr) => Value::Array(arr.clone()),
        }
    }
}

impl From<HashMap<String, Value>> for RpcParams {
    fn from(map: HashMap<String, Value>) -> Self {
        RpcParams::Object(map)
    }
}

impl From<Vec<Value>> for RpcParams {
    fn from(vec: Vec<Value>) -> Self {
        RpcParams::Array(vec)
    }
}

/// A JSON-RPC request.
///
/// The `method` string doubles as the routing key and may embed named
/// placeholders (`{name}`, `{name?}`) understood by the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    #[serde(default, skip_serializing_if = "MessageId::is_null")]
    pub id: MessageId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RpcParams>,
}

impl RpcRequest {
    pub fn new(id: MessageId, method: String, params: Option<RpcParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            method,
            params,
        }
    }

    /// Create a new request with no parameters
    pub fn new_no_params(id: MessageId, method: String) -> Self {
        Self::new(id, method, None)
    }

    /// Create a new request with object parameters
    pub fn new_with_object_params(
        id: MessageId,
        method: String,
        params: HashMap<String, Value>,
    ) -> Self {
        Self::new(id, method, Some(RpcParams::Object(params)))
    }

    /// Create a new request with array parameters
    pub fn new_with_array_params(id: MessageId, method: String, params: Vec<Value>) -> Self {
        Self::new(id, method, Some(RpcParams::Array(params)))
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&RpcParams> {
        self.params.as_ref()
    }

    /// The method string as seen by the matcher.
    pub fn path_info(&self) -> &str {
        &self.method
    }

    /// A request carrying a null id is semantically a notification.
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.as_ref()?.get_index(index)
    }

    /// Encode as a wire object. Empty collections inside `params` become `{}`.
    pub fn to_wire(&self) -> Value {
        let mut wire = serde_json::Map::new();
        wire.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
        wire.insert("method".to_string(), Value::String(self.method.clone()));
        if let Some(params) = &self.params {
            wire.insert("params".to_string(), promote_empty(params.to_value()));
        }
        if !self.id.is_null() {
            wire.insert("id".to_string(), self.id.to_value());
        }
        Value::Object(wire)
    }
}
