//! The router: registration surface and dispatch pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use futures::future::BoxFuture;
use serde_json::Value;

use tessen_json_rpc::{
    MessageId, RpcErrorObject, RpcFault, RpcMessage, RpcNotification, RpcRequest, RpcResponse,
};

use crate::binder::{BoundParameters, bind};
use crate::definition::ProcedureDefinition;
use crate::error::{RegistrationError, RouterError};
use crate::group::{GroupAttributes, apply_prefix};
use crate::handler::{FnHandler, HandlerReply, ProcedureHandler};
use crate::middleware::{
    DispatchContext, MiddlewareOutcome, MiddlewareRegistry, ResolvedMiddleware, RpcMiddleware,
};
use crate::registry::ProcedureRegistry;

/// Whether internal fault details may surface in `error.data`.
///
/// Explicit application faults always keep their own code, message and data;
/// this policy only governs unexpected faults caught at the dispatch
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorExposure {
    /// Redact internal fault details from the wire form (default).
    #[default]
    Sanitize,
    /// Surface the underlying fault message in `error.data`.
    Expose,
}

/// JSON-RPC procedure router and dispatcher.
///
/// Registration happens through `&mut self` during startup; dispatch takes
/// `&self`, so a router shared behind an `Arc` serves concurrent requests
/// without locking. No router state is written during a dispatch; bindings
/// live in a per-request scope.
pub struct RpcRouter {
    registry: ProcedureRegistry,
    middleware: MiddlewareRegistry,
    patterns: HashMap<String, String>,
    exposure: ErrorExposure,
}

impl std::fmt::Debug for RpcRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcRouter")
            .field("patterns", &self.patterns)
            .field("exposure", &self.exposure)
            .finish_non_exhaustive()
    }
}

impl Default for RpcRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcRouter {
    pub fn new() -> Self {
        Self {
            registry: ProcedureRegistry::new(),
            middleware: MiddlewareRegistry::new(),
            patterns: HashMap::new(),
            exposure: ErrorExposure::default(),
        }
    }

    pub fn builder() -> RpcRouterBuilder {
        RpcRouterBuilder::new()
    }

    pub fn registry(&self) -> &ProcedureRegistry {
        &self.registry
    }

    pub fn middleware_registry(&self) -> &MiddlewareRegistry {
        &self.middleware
    }

    // -- Registration surface -------------------------------------------------

    /// Register a procedure under a method pattern.
    ///
    /// The returned definition handle accepts fluent configuration:
    /// constraints, defaults, middleware, fallback marking.
    pub fn procedure<H>(&mut self, method: &str, handler: H) -> &mut ProcedureDefinition
    where
        H: ProcedureHandler + 'static,
    {
        self.register(method, Arc::new(handler))
    }

    /// Register a closure-based procedure.
    pub fn procedure_fn<F>(&mut self, method: &str, handler: F) -> &mut ProcedureDefinition
    where
        F: Fn(BoundParameters, RpcRequest) -> BoxFuture<'static, Result<HandlerReply, RpcFault>>
            + Send
            + Sync
            + 'static,
    {
        self.register(method, Arc::new(FnHandler::new(handler)))
    }

    fn register(
        &mut self,
        method: &str,
        action: Arc<dyn ProcedureHandler>,
    ) -> &mut ProcedureDefinition {
        let group = self.registry.current_group().cloned().unwrap_or_default();
        let full_method = apply_prefix(group.prefix.as_deref(), method);

        let mut definition = ProcedureDefinition::new(&full_method, action);
        definition.prepend_middleware(group.middleware.clone());
        definition.merge_wheres(&group.wheres);
        definition.merge_wheres(&self.patterns);
        definition.set_namespace(group.namespace.clone());

        debug!(method = %full_method, "registering procedure");
        self.registry.add(definition)
    }

    /// Register a batch of procedures under shared group attributes. The
    /// attribute frame is pushed for the duration of the closure and popped
    /// afterwards, so the stack stays balanced by construction.
    pub fn group<F>(&mut self, attributes: GroupAttributes, routes: F)
    where
        F: FnOnce(&mut Self),
    {
        self.registry.push_group(attributes);
        routes(self);
        self.registry.pop_group();
    }

    /// Start a group scoped to a method prefix.
    pub fn prefix(&mut self, prefix: impl Into<String>) -> GroupBuilder<'_> {
        GroupBuilder::new(self).prefix(prefix)
    }

    /// Start a group scoped to a middleware list.
    pub fn middleware<I, S>(&mut self, names: I) -> GroupBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupBuilder::new(self).middleware(names)
    }

    /// Eagerly compile every registered pattern so malformed patterns and
    /// constraints fail here, at startup, instead of during dispatch.
    pub fn ensure_compiled(&self) -> Result<(), RegistrationError> {
        self.registry.ensure_compiled()?;
        Ok(())
    }

    // -- Dispatch -------------------------------------------------------------

    /// Dispatch a request to its matching procedure.
    ///
    /// Never returns `Err` and never panics for business-reachable
    /// conditions: every outcome, including a missing method, terminates in
    /// a valid JSON-RPC response.
    pub async fn dispatch(&self, request: &RpcRequest) -> RpcResponse {
        let id = request.id().clone();
        debug!(method = request.method(), "dispatching procedure call");

        // Matched
        let definition = match self.registry.match_method(request.path_info()) {
            Ok(definition) => definition,
            Err(RouterError::NotFound { method }) => {
                debug!(%method, "no procedure matched");
                return RpcResponse::error(id, RpcErrorObject::method_not_found(&method));
            }
        };

        // Bound
        let bound = match bind(definition, request.path_info()) {
            Ok(bound) => bound,
            Err(error) => {
                // The matcher admitted this method; failing to bind now is an
                // internal fault, not a client error.
                warn!(pattern = definition.method(), %error, "binding failed after match");
                return RpcResponse::error(id, RpcErrorObject::internal_error(None));
            }
        };

        // MiddlewareRunning
        let chain = match self
            .middleware
            .resolve(&definition.gather_middleware(), definition.excluded_middleware())
        {
            Ok(chain) => chain,
            Err(error) => {
                warn!(pattern = definition.method(), %error, "middleware resolution failed");
                return RpcResponse::error(id, RpcErrorObject::internal_error(None));
            }
        };

        let mut ctx = DispatchContext::new(request, definition.method(), &bound);
        let mut executed = 0;
        let mut short_circuit: Option<RpcResponse> = None;

        for middleware in &chain {
            executed += 1;
            match middleware.instance.before_dispatch(&mut ctx).await {
                Ok(MiddlewareOutcome::Continue) => {}
                Ok(MiddlewareOutcome::Respond(response)) => {
                    debug!(middleware = %middleware.name, "middleware short-circuited dispatch");
                    short_circuit = Some(response);
                    break;
                }
                Err(error) => {
                    debug!(middleware = %middleware.name, %error, "middleware rejected dispatch");
                    short_circuit =
                        Some(RpcResponse::error(id.clone(), error.to_error_object()));
                    break;
                }
            }
        }

        // HandlerExecuting
        let mut response = match short_circuit {
            Some(response) => response,
            None => match definition.action().call(bound.clone(), request).await {
                Ok(HandlerReply::Value(value)) => RpcResponse::result(id.clone(), value),
                Ok(HandlerReply::Response(response)) => response,
                Err(fault) => {
                    warn!(method = request.method(), %fault, "handler fault");
                    RpcResponse::error(
                        id.clone(),
                        fault.to_error_object(self.exposure == ErrorExposure::Expose),
                    )
                }
            },
        };

        // ResponseReady / Failed: unwind the executed part of the chain in
        // reverse order on every terminal path.
        response = self
            .run_after_hooks(&chain[..executed], &ctx, response, &id)
            .await;

        response
    }

    async fn run_after_hooks(
        &self,
        executed: &[ResolvedMiddleware],
        ctx: &DispatchContext<'_>,
        mut response: RpcResponse,
        id: &MessageId,
    ) -> RpcResponse {
        for middleware in executed.iter().rev() {
            if let Err(error) = middleware.instance.after_dispatch(ctx, &mut response).await {
                debug!(middleware = %middleware.name, %error, "after-dispatch hook failed");
                response = RpcResponse::error(id.clone(), error.to_error_object());
            }
        }
        response
    }

    /// Dispatch a notification through the same pipeline.
    ///
    /// The response is still computed (callers may want it for logging or
    /// telemetry) but it carries a null id and is never transmitted.
    pub async fn dispatch_notification(&self, notification: &RpcNotification) -> RpcResponse {
        let request = notification.to_request();
        self.dispatch(&request).await
    }

    /// Transport-facing convenience: decode a raw payload, dispatch it, and
    /// encode the reply. Returns `None` for notifications (fire-and-forget).
    pub async fn handle_payload(&self, raw: &str) -> Option<String> {
        match RpcMessage::parse(raw) {
            Ok(RpcMessage::Request(request)) => {
                Some(self.dispatch(&request).await.to_wire_string())
            }
            Ok(RpcMessage::Notification(notification)) => {
                let response = self.dispatch_notification(&notification).await;
                if response.is_error() {
                    debug!(
                        method = notification.method(),
                        "notification produced an error result (not transmitted)"
                    );
                }
                None
            }
            Ok(RpcMessage::Response(_)) => {
                // A server endpoint does not accept response envelopes.
                let error = RpcErrorObject::invalid_request(Some(Value::String(
                    "response envelopes are not routable".to_string(),
                )));
                Some(RpcResponse::error(MessageId::Null, error).to_wire_string())
            }
            Err(envelope_error) => {
                debug!(%envelope_error, "rejecting malformed payload");
                let error = RpcErrorObject::new(
                    envelope_error.error_code(),
                    Some(envelope_error.to_string()),
                    None,
                );
                Some(RpcResponse::error(MessageId::Null, error).to_wire_string())
            }
        }
    }
}

/// Builder collecting router-wide configuration before registration starts:
/// middleware aliases, groups and priority, global `where` patterns and the
/// error-exposure policy. Nothing here is process-global; two routers built
/// with different configuration coexist.
#[derive(Default)]
pub struct RpcRouterBuilder {
    middleware: MiddlewareRegistry,
    patterns: HashMap<String, String>,
    exposure: ErrorExposure,
}

impl RpcRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a middleware instance under a short-hand name.
    pub fn register_middleware<M>(mut self, name: impl Into<String>, middleware: M) -> Self
    where
        M: RpcMiddleware + 'static,
    {
        self.middleware.register(name, Arc::new(middleware));
        self
    }

    /// Register a middleware group alias.
    pub fn middleware_group<I, S>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.register_group(name, members);
        self
    }

    /// Force the listed middleware to always execute in the given order.
    pub fn middleware_priority<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.set_priority(names);
        self
    }

    /// Register a global `where` pattern merged into every definition.
    /// A definition's own constraint for the same parameter wins.
    pub fn pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), pattern.into());
        self
    }

    pub fn error_exposure(mut self, exposure: ErrorExposure) -> Self {
        self.exposure = exposure;
        self
    }

    /// Build the router, validating global patterns up front.
    pub fn build(self) -> Result<RpcRouter, RegistrationError> {
        for (name, pattern) in &self.patterns {
            regex::Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                RegistrationError::InvalidGlobalPattern {
                    name: name.clone(),
                    source,
                }
            })?;
        }

        Ok(RpcRouter {
            registry: ProcedureRegistry::new(),
            middleware: self.middleware,
            patterns: self.patterns,
            exposure: self.exposure,
        })
    }
}

/// Fluent group registration: collects attributes, then registers a batch of
/// procedures under them.
pub struct GroupBuilder<'r> {
    router: &'r mut RpcRouter,
    attributes: GroupAttributes,
}

impl<'r> GroupBuilder<'r> {
    fn new(router: &'r mut RpcRouter) -> Self {
        Self {
            router,
            attributes: GroupAttributes::new(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attributes.prefix = Some(prefix.into());
        self
    }

    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .middleware
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn where_(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.attributes.wheres.insert(name.into(), pattern.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.attributes.namespace = Some(namespace.into());
        self
    }

    /// Register the batch.
    pub fn group<F>(self, routes: F)
    where
        F: FnOnce(&mut RpcRouter),
    {
        self.router.group(self.attributes, routes);
    }
}
