//! # Router Module
//!
//! Route registration and path matching.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates with typed placeholders into anchored matchers
//! - Keeping routes in registration order, which is also their match priority
//! - Scoping prefixes, middleware and name prefixes through nested groups
//! - Expanding resources into their conventional CRUD routes
//! - Reversing named routes into URLs
//!
//! ## Architecture
//!
//! Registration and dispatch are separate phases:
//!
//! 1. **Registration**: [`Router`] accumulates routes. Group frames live only for
//!    the duration of the group callback.
//!
//! 2. **Dispatch**: [`Router::build`] freezes the table into a
//!    [`crate::dispatcher::Dispatcher`], which only reads it.
//!
//! ## Example
//!
//! ```rust
//! use routekit::router::Router;
//! use routekit::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult};
//!
//! fn show(req: &mut HandlerRequest) -> HandlerResult {
//!     let id = req.get_path_param("id").unwrap_or_default().to_string();
//!     Ok(HandlerResponse::json(200, serde_json::json!({ "id": id })))
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.get("/posts/{id:num}", show)?.name("posts.show")?;
//!
//! let dispatcher = router.build();
//! if let Some(route_match) = dispatcher.dispatch("GET", "/posts/42") {
//!     println!("Route: {}", route_match.route.path());
//!     println!("Path params: {:?}", route_match.path_params);
//! }
//! assert_eq!(dispatcher.url_for("posts.show", &[&5])?, "/posts/5");
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! - Placeholder-free templates are answered by a hash lookup and string equality
//! - Other routes are scanned linearly: O(n) in the number of routes
//! - Parameters are stored inline for up to eight placeholders

mod core;
mod names;
mod path;
mod pattern;
mod resource;
mod table;


pub use self::core::{GroupOptions, MiddlewareRef, RouteRef, Router, ANY_METHODS};
pub use self::names::{NameRegistry, ReverseTemplate};
pub use self::path::{join, normalize_request_path, normalize_template};
pub use self::pattern::{CompiledPattern, PlaceholderKind, Segment};
pub use self::resource::{
    conventional_name, ResourceAction, ResourceOptions, ResourceSource,
};
pub use self::table::{ParamVec, Route, RouteMatch, RouteTable, MAX_INLINE_PARAMS};
