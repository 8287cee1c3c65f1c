//! # Middleware Module
//!
//! Onion-style middleware: every middleware wraps a continuation ([`Next`]) and
//! decides whether, and when, to call it.
//!
//! ```text
//! global ─┐
//!   group ─┐
//!     route ─┐
//!        handler
//!     route ─┘
//!   group ─┘
//! global ─┘
//! ```
//!
//! The first middleware in a list runs outermost. A route's list is resolved when
//! the route is registered: router-wide middleware, then each enclosing group from
//! outer to inner, then the route's own.

mod core;
mod metrics;
mod tracing;


pub use self::core::{compose, from_fn, Middleware, Next};
pub use self::metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
