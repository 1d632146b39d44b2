//! Middleware system for the dispatch pipeline.
//!
//! This module provides a trait-based middleware architecture for
//! intercepting procedure calls before and after the handler runs.
//! Middleware can be used for authentication, logging, rate limiting, and
//! custom business logic, and may short-circuit a dispatch with its own
//! response.
//!
//! # Overview
//!
//! - [`RpcMiddleware`] - Core trait for implementing middleware
//! - [`DispatchContext`] - Per-dispatch request scope handed through the chain
//! - [`MiddlewareRegistry`] - Name/alias/group/priority configuration,
//!   injected at router construction (no process-wide state)
//! - [`MiddlewareError`] - Semantic errors converted to JSON-RPC error results
//!
//! # Examples
//!
//! ```rust,no_run
//! use tessen_rpc_router::middleware::{
//!     DispatchContext, MiddlewareError, MiddlewareOutcome, RpcMiddleware,
//! };
//! use async_trait::async_trait;
//!
//! struct LoggingMiddleware;
//!
//! #[async_trait]
//! impl RpcMiddleware for LoggingMiddleware {
//!     async fn before_dispatch(
//!         &self,
//!         ctx: &mut DispatchContext<'_>,
//!     ) -> Result<MiddlewareOutcome, MiddlewareError> {
//!         println!("Request: {}", ctx.method());
//!         Ok(MiddlewareOutcome::Continue)
//!     }
//! }
//! ```

pub mod context;
pub mod error;
pub mod resolver;
pub mod traits;

pub use context::DispatchContext;
pub use error::MiddlewareError;
pub use resolver::{MiddlewareRegistry, ResolveError, ResolvedMiddleware};
pub use traits::{MiddlewareOutcome, RpcMiddleware};
