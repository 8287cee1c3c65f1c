//! Dispatcher core module - hot path for request dispatch.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use arc_swap::ArcSwap;
use http::Method;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::handler::{ControllerRegistry, HandlerRef};
use super::not_found::NotFoundHandlers;
use super::request::{HandlerRequest, HandlerResponse, HandlerResult};
use crate::config::RouterConfig;
use crate::error::UrlError;
use crate::middleware::{compose, Middleware, Next};
use crate::router::{normalize_request_path, NameRegistry, Route, RouteMatch, RouteTable};

/// Parse a method token the way requests spell it (`get`, `Get`, `GET`)
pub(crate) fn parse_method(token: &str) -> Option<Method> {
    Method::from_bytes(token.trim().to_ascii_uppercase().as_bytes()).ok()
}

/// Normalize `path` and look it up in `table`
pub(crate) fn find_route(
    table: &RouteTable,
    config: &RouterConfig,
    method: &Method,
    path: &str,
) -> Option<RouteMatch> {
    let path = normalize_request_path(path, config);

    debug!(method = %method, path = %path, "Route match attempt");

    let match_start = Instant::now();
    let result = table.find(method, &path);
    let match_duration = match_start.elapsed();

    match &result {
        Some(matched) => {
            if match_duration > Duration::from_micros(config.slow_match_threshold_us) {
                warn!(
                    method = %method,
                    path = %path,
                    route_pattern = %matched.route.path(),
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                debug!(
                    method = %method,
                    path = %path,
                    route_pattern = %matched.route.path(),
                    path_params = ?matched.path_params,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }
        }
        None => {
            debug!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
        }
    }

    result
}

/// Immutable routing state serving requests
///
/// Produced by [`crate::router::Router::build`]. Holds no per-request state, so
/// one instance can serve any number of threads concurrently.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) table: RouteTable,
    pub(crate) names: NameRegistry,
    pub(crate) not_found: NotFoundHandlers,
    pub(crate) controllers: ControllerRegistry,
    /// Router-wide middleware, wrapped around not-found handlers
    pub(crate) global_middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) config: RouterConfig,
}

impl Dispatcher {
    /// Match a request given as a method token and a raw path
    ///
    /// Returns `None` when nothing matches, including unknown method tokens. Pure:
    /// calling it any number of times changes nothing.
    ///
    /// ```rust
    /// use routekit::router::Router;
    /// use routekit::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult};
    ///
    /// fn show(_req: &mut HandlerRequest) -> HandlerResult {
    ///     Ok(HandlerResponse::json(200, serde_json::json!({})))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.get("/posts/{id:num}", show).unwrap().name("posts.show").unwrap();
    /// let dispatcher = router.build();
    ///
    /// let matched = dispatcher.dispatch("GET", "/posts/42").unwrap();
    /// assert_eq!(matched.get_path_param("id"), Some("42"));
    /// assert!(dispatcher.dispatch("GET", "/posts/abc").is_none());
    /// assert!(dispatcher.dispatch("DELETE", "/posts/42").is_none());
    /// ```
    #[must_use]
    pub fn dispatch(&self, method: &str, path: &str) -> Option<RouteMatch> {
        let method = parse_method(method)?;
        self.route(&method, path)
    }

    /// Match a request with an already-parsed method
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        find_route(&self.table, &self.config, method, path)
    }

    /// Dispatch `req` and invoke the matched chain or the not-found handler
    ///
    /// Exactly one handler runs per call. On a match the request's `path`,
    /// `route_pattern`, `route_name` and `path_params` are filled in before the
    /// route's middleware sees it.
    ///
    /// # Errors
    ///
    /// Whatever the chain returns: handler and middleware errors, and
    /// [`crate::error::HandlerResolutionError`] for handler references that
    /// cannot be resolved.
    pub fn run(&self, mut req: HandlerRequest) -> HandlerResult {
        req.path = normalize_request_path(&req.path, &self.config).into_owned();

        match self.table.find(&req.method, &req.path) {
            Some(RouteMatch { route, path_params }) => {
                req.route_pattern = Some(route.path().to_string());
                req.route_name = route.name().map(str::to_string);
                req.path_params = path_params;

                info!(
                    request_id = %req.request_id,
                    method = %req.method,
                    path = %req.path,
                    route_pattern = %route.path(),
                    handler = ?route.handler(),
                    middleware_count = route.middleware().len(),
                    "Request dispatched to route"
                );
                self.invoke(&route, &mut req)
            }
            None => {
                info!(
                    request_id = %req.request_id,
                    method = %req.method,
                    path = %req.path,
                    "No route matched - invoking not-found handler"
                );
                match self.not_found.select(&req.path) {
                    Some(handler) => {
                        let endpoint = Next::new(|req: &mut HandlerRequest| {
                            handler.invoke(req, &self.controllers)
                        });
                        compose(&self.global_middleware, endpoint).run(&mut req)
                    }
                    None => {
                        let endpoint =
                            Next::new(|_: &mut HandlerRequest| Ok(HandlerResponse::not_found()));
                        compose(&self.global_middleware, endpoint).run(&mut req)
                    }
                }
            }
        }
    }

    fn invoke(&self, route: &Route, req: &mut HandlerRequest) -> HandlerResult {
        let handler: &HandlerRef = route.handler();
        let endpoint =
            Next::new(|req: &mut HandlerRequest| handler.invoke(req, &self.controllers));
        compose(route.middleware(), endpoint).run(req)
    }

    /// Generate the URL of a named route, substituting `args` by position
    ///
    /// # Errors
    ///
    /// [`UrlError::RouteNotFound`] for unknown names, [`UrlError::MissingArgument`]
    /// when a required placeholder has no argument.
    pub fn url_for(&self, name: &str, args: &[&dyn Display]) -> Result<String, UrlError> {
        self.names.url_for(name, args)
    }

    /// Methods of every route whose template matches `path`
    ///
    /// Lets a host tell "405 Method Not Allowed" apart from "404 Not Found".
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let path = normalize_request_path(path, &self.config);
        self.table.allowed_methods(&path)
    }

    /// Routes in registration (priority) order
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.table.iter()
    }

    /// Templates of all routes, in registration order
    #[must_use]
    pub fn route_patterns(&self) -> Vec<String> {
        self.table.iter().map(|route| route.path().to_string()).collect()
    }

    /// Log every registered route at INFO
    pub fn dump_routes(&self) {
        info!(routes_count = self.table.len(), "Registered routes");
        for route in self.table.iter() {
            info!(
                methods = ?route.methods(),
                path = %route.path(),
                name = route.name().unwrap_or(""),
                handler = ?route.handler(),
                "Route"
            );
        }
    }

    /// The configuration requests are normalized with
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// A dispatcher that can be replaced while requests are being served
///
/// Readers take a snapshot with [`SharedDispatcher::load`] and keep using it even
/// if a new routing table is swapped in meanwhile.
pub struct SharedDispatcher {
    current: ArcSwap<Dispatcher>,
}

impl SharedDispatcher {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(dispatcher),
        }
    }

    /// Snapshot of the live dispatcher
    #[must_use]
    pub fn load(&self) -> Arc<Dispatcher> {
        self.current.load_full()
    }

    /// Swap in a rebuilt dispatcher, returning the previous one
    pub fn replace(&self, dispatcher: Dispatcher) -> Arc<Dispatcher> {
        let routes_count = dispatcher.table.len();
        let previous = self.current.swap(Arc::new(dispatcher));
        info!(
            routes_count = routes_count,
            previous_routes_count = previous.table.len(),
            "Routing table replaced"
        );
        previous
    }

    /// Run `req` against the live dispatcher
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::run`].
    pub fn run(&self, req: HandlerRequest) -> HandlerResult {
        self.current.load().run(req)
    }
}
