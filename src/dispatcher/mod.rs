//! # Dispatcher Module
//!
//! Serves requests from a routing table built by [`crate::router::Router`].
//!
//! ## Request Flow
//!
//! 1. The request path is normalized (query stripped, percent-decoded, trailing
//!    slash removed).
//! 2. The route table is consulted once: literal templates first, then a scan in
//!    registration order. The first structural match wins.
//! 3. On a match, the route's resolved middleware is composed around its handler
//!    and the chain runs. Otherwise the not-found handler responsible for the path
//!    runs, wrapped in the router-wide middleware.
//!
//! ## Handlers
//!
//! A route's handler is a [`HandlerRef`]: a function, a `Type@method` reference
//! resolved through the [`ControllerRegistry`] at call time, or an action on a
//! live [`Controller`] instance.
//!
//! ## Errors
//!
//! Handler and middleware errors are returned from [`Dispatcher::run`] as they
//! are; the dispatcher neither catches nor converts them.

mod core;
mod handler;
mod not_found;
mod request;


pub use self::core::{Dispatcher, SharedDispatcher};
pub(crate) use self::core::{find_route, parse_method};
pub use self::handler::{Controller, ControllerRegistry, HandlerFn, HandlerRef};
pub use self::not_found::NotFoundHandlers;
pub use self::request::{
    HandlerRequest, HandlerResponse, HandlerResult, HeaderVec, MAX_INLINE_HEADERS,
};
