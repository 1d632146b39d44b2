//! Handler contract for registered procedures.
//!
//! A handler is any async callable accepting the bound method parameters and
//! the request payload. It returns either a plain value, which the dispatcher
//! wraps as a success result, or an explicit response it built itself.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use tessen_json_rpc::{RpcFault, RpcRequest, RpcResponse};

use crate::binder::BoundParameters;

/// What a handler hands back to the dispatcher.
#[derive(Debug)]
pub enum HandlerReply {
    /// A raw value, success-wrapped by the dispatcher.
    Value(Value),
    /// A fully-formed response the handler built itself (e.g. an explicit
    /// error result with an application-chosen code).
    Response(RpcResponse),
}

impl From<Value> for HandlerReply {
    fn from(value: Value) -> Self {
        HandlerReply::Value(value)
    }
}

impl From<serde_json::Map<String, Value>> for HandlerReply {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        HandlerReply::Value(Value::Object(map))
    }
}

impl From<RpcResponse> for HandlerReply {
    fn from(response: RpcResponse) -> Self {
        HandlerReply::Response(response)
    }
}

impl From<()> for HandlerReply {
    fn from(_: ()) -> Self {
        HandlerReply::Value(Value::Null)
    }
}

/// Trait for procedure actions.
#[async_trait]
pub trait ProcedureHandler: Send + Sync {
    /// Invoke the procedure with bound method parameters.
    ///
    /// Errors returned here are caught at the dispatcher boundary and
    /// converted to JSON-RPC error results; they never escape to the
    /// transport as raw errors.
    async fn call(
        &self,
        parameters: BoundParameters,
        request: &RpcRequest,
    ) -> Result<HandlerReply, RpcFault>;

    /// Middleware this handler type declares for itself, gathered after the
    /// definition's own middleware. Explicit capability, no introspection.
    fn declared_middleware(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A simple function-based handler
pub struct FnHandler<F>
where
    F: Fn(BoundParameters, RpcRequest) -> BoxFuture<'static, Result<HandlerReply, RpcFault>>
        + Send
        + Sync,
{
    handler_fn: F,
    middleware: Vec<String>,
}

impl<F> FnHandler<F>
where
    F: Fn(BoundParameters, RpcRequest) -> BoxFuture<'static, Result<HandlerReply, RpcFault>>
        + Send
        + Sync,
{
    pub fn new(handler_fn: F) -> Self {
        Self {
            handler_fn,
            middleware: Vec::new(),
        }
    }

    pub fn with_middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = middleware.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl<F> ProcedureHandler for FnHandler<F>
where
    F: Fn(BoundParameters, RpcRequest) -> BoxFuture<'static, Result<HandlerReply, RpcFault>>
        + Send
        + Sync,
{
    async fn call(
        &self,
        parameters: BoundParameters,
        request: &RpcRequest,
    ) -> Result<HandlerReply, RpcFault> {
        (self.handler_fn)(parameters, request.clone()).await
    }

    fn declared_middleware(&self) -> Vec<String> {
        self.middleware.clone()
    }
}
