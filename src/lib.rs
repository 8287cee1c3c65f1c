//! # routekit
//!
//! **routekit** is an HTTP request router: typed path placeholders, first-match-wins
//! dispatch in registration order, nested route groups, onion-style middleware,
//! resource routes and named-route reversal.
//!
//! ## Overview
//!
//! routekit operates on an already-extracted method and path. It does not parse
//! HTTP, serve sockets, or decide status codes beyond answering "not found" when
//! nothing matches; those belong to the host application.
//!
//! ## Architecture
//!
//! - **[`router`]** - Registration: pattern compilation, route table, groups,
//!   resources and the name registry
//! - **[`dispatcher`]** - Request-time matching and handler invocation
//! - **[`middleware`]** - Continuation-passing middleware and the composer
//! - **[`config`]** - Dispatch-time configuration (case sensitivity, path normalization)
//! - **[`logging`]** - `tracing` subscriber bootstrap
//! - **[`error`]** - Registration and URL generation errors
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Dispatcher
//!     participant Table as RouteTable
//!     participant Chain as Middleware Chain
//!     participant Handler
//!
//!     Host->>Dispatcher: run(HandlerRequest)
//!     Dispatcher->>Dispatcher: normalize path
//!     Dispatcher->>Table: find(method, path)
//!     Table->>Table: literal index, then ordered scan
//!     alt No Route Match
//!         Dispatcher->>Handler: not-found handler (global middleware)
//!     else Matched
//!         Table-->>Dispatcher: RouteMatch (route, params)
//!         Dispatcher->>Chain: compose(route.middleware, handler)
//!         Chain->>Handler: next.run(req)
//!         Handler-->>Chain: HandlerResponse
//!     end
//!     Chain-->>Host: HandlerResult
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use routekit::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult};
//! use routekit::middleware::TracingMiddleware;
//! use routekit::router::{ResourceOptions, ResourceSource, Router};
//! use std::sync::Arc;
//!
//! fn home(_req: &mut HandlerRequest) -> HandlerResult {
//!     Ok(HandlerResponse::json(200, serde_json::json!({ "hello": "world" })))
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.alias_middleware("trace", Arc::new(TracingMiddleware));
//! router.get("/", home)?.name("home")?.middleware("trace")?;
//! router.api_resource("/posts", ResourceSource::controller("PostController"), ResourceOptions::new())?;
//!
//! let dispatcher = router.build();
//! let res = dispatcher.run(HandlerRequest::new(http::Method::GET, "/"))?;
//! assert_eq!(res.status, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Registration is single-threaded. The [`dispatcher::Dispatcher`] produced by
//! [`router::Router::build`] is immutable and `Send + Sync`; share it in an `Arc`
//! or swap tables at runtime with [`dispatcher::SharedDispatcher`].
//!
//! Middleware and handlers are synchronous. Asynchronous work inside a middleware
//! blocks the current thread (or coroutine) until it resolves, after which the
//! middleware decides whether to call its continuation. Host-level cancellation
//! tokens travel in [`dispatcher::HandlerRequest::extensions`].

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;

pub use dispatcher::{Dispatcher, HandlerRef, HandlerRequest, HandlerResponse, HandlerResult};
pub use error::{ConfigurationError, HandlerResolutionError, UrlError};
pub use router::{Router, RouteMatch};
