//! Per-dispatch request scope.

use serde_json::{Map, Value};

use tessen_json_rpc::{MessageId, RpcParams, RpcRequest};

use crate::binder::BoundParameters;

/// The scope a dispatch carries through its middleware chain.
///
/// Holds the incoming request, the pattern that matched it and the parameters
/// bound for this dispatch. This object is created per request; nothing in it
/// is shared with concurrent dispatches of the same definition.
#[derive(Debug)]
pub struct DispatchContext<'a> {
    request: &'a RpcRequest,
    matched_pattern: &'a str,
    parameters: &'a BoundParameters,
    metadata: Map<String, Value>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        request: &'a RpcRequest,
        matched_pattern: &'a str,
        parameters: &'a BoundParameters,
    ) -> Self {
        Self {
            request,
            matched_pattern,
            parameters,
            metadata: Map::new(),
        }
    }

    pub fn request(&self) -> &RpcRequest {
        self.request
    }

    /// The concrete method string of the incoming call.
    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// The pattern of the definition that matched this call.
    pub fn matched_pattern(&self) -> &str {
        self.matched_pattern
    }

    pub fn id(&self) -> &MessageId {
        self.request.id()
    }

    pub fn params(&self) -> Option<&RpcParams> {
        self.request.params()
    }

    /// Parameters bound from the method string for this dispatch.
    pub fn parameters(&self) -> &BoundParameters {
        self.parameters
    }

    /// Metadata accumulated by earlier middleware in this chain.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }
}
