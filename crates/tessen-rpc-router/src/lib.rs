//! # JSON-RPC Procedure Router
//!
//! Routing and dispatch for JSON-RPC 2.0 method calls: procedure
//! registration with prefix/group/attribute inheritance, compiled pattern
//! matching against method strings, parameter binding, middleware
//! resolution and ordering, and an execution pipeline that turns every
//! request into a spec-compliant result or error.
//!
//! Method strings are not URLs, but they borrow the URL-style `{param}`
//! placeholder syntax: a pattern like `hello.{name}` matches `hello.World`
//! and binds `name = "World"`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tessen_json_rpc::{MessageId, RpcRequest};
//! use tessen_rpc_router::RpcRouter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = RpcRouter::new();
//!
//!     router.procedure_fn("hello.{name}", |parameters, _request| {
//!         Box::pin(async move {
//!             let name = parameters.get_str("name").unwrap_or("stranger").to_string();
//!             Ok(json!({"greeting": format!("Hello, {}", name)}).into())
//!         })
//!     });
//!
//!     router.ensure_compiled()?;
//!
//!     let request = RpcRequest::new_no_params(MessageId::Number(1), "hello.World".into());
//!     let response = router.dispatch(&request).await;
//!     println!("{}", response.to_wire_string());
//!     Ok(())
//! }
//! ```

pub mod binder;
pub mod definition;
pub mod error;
pub mod group;
pub mod handler;
pub mod middleware;
pub mod pattern;
pub mod registry;
pub mod router;

// Re-export main types
pub use binder::{BindError, BoundParameters, bind};
pub use definition::ProcedureDefinition;
pub use error::{RegistrationError, RouterError};
pub use group::GroupAttributes;
pub use handler::{FnHandler, HandlerReply, ProcedureHandler};
pub use middleware::{
    DispatchContext, MiddlewareError, MiddlewareOutcome, MiddlewareRegistry, ResolveError,
    ResolvedMiddleware, RpcMiddleware,
};
pub use pattern::{CompiledPattern, PatternError};
pub use registry::ProcedureRegistry;
pub use router::{ErrorExposure, GroupBuilder, RpcRouter, RpcRouterBuilder};

// Re-export the message model this router dispatches
pub use tessen_json_rpc;

/// Commonly used imports for building procedure servers.
pub mod prelude {
    pub use crate::binder::BoundParameters;
    pub use crate::group::GroupAttributes;
    pub use crate::handler::{FnHandler, HandlerReply, ProcedureHandler};
    pub use crate::middleware::{
        DispatchContext, MiddlewareError, MiddlewareOutcome, RpcMiddleware,
    };
    pub use crate::router::{ErrorExposure, RpcRouter};
    pub use tessen_json_rpc::{
        MessageId, RpcErrorCode, RpcErrorObject, RpcFault, RpcMessage, RpcNotification,
        RpcParams, RpcRequest, RpcResponse,
    };
}
