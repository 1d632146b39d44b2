//! Core middleware trait definitions

use async_trait::async_trait;

use tessen_json_rpc::RpcResponse;

use super::{DispatchContext, MiddlewareError};

/// Outcome of a middleware's before-dispatch hook.
#[derive(Debug)]
pub enum MiddlewareOutcome {
    /// Continue to the next middleware or the handler.
    Continue,
    /// Short-circuit: this response goes back to the caller and neither
    /// downstream middleware nor the handler run.
    Respond(RpcResponse),
}

/// Core middleware trait for intercepting procedure dispatch.
///
/// # Lifecycle
///
/// 1. **Before dispatch**: called in resolved order before the handler runs.
///    A middleware may inspect the context, continue, short-circuit with its
///    own response, or fail with a semantic error.
/// 2. **After dispatch**: called in reverse order over the middleware that
///    actually ran, on every terminal path (including short-circuits and
///    handler faults), so partially-run chains always fully unwind.
#[async_trait]
pub trait RpcMiddleware: Send + Sync {
    /// Called before the handler executes.
    ///
    /// Errors stop the chain and become a JSON-RPC error result with the
    /// code the error variant maps to, propagated unchanged.
    async fn before_dispatch(
        &self,
        ctx: &mut DispatchContext<'_>,
    ) -> Result<MiddlewareOutcome, MiddlewareError>;

    /// Called after the handler (or a short-circuit) produced a response.
    /// May modify the response. Default is a no-op.
    #[allow(unused_variables)]
    async fn after_dispatch(
        &self,
        ctx: &DispatchContext<'_>,
        response: &mut RpcResponse,
    ) -> Result<(), MiddlewareError> {
        Ok(())
    }

    /// Family-exclusion hook: return true when `name` denotes a family this
    /// middleware belongs to, so excluding the family name excludes this
    /// instance even if it is registered under a different alias.
    fn excluded_by(&self, _name: &str) -> bool {
        false
    }
}
