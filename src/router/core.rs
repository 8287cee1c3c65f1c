//! Route registration: the router builder, group stack and middleware resolution.

use http::Method;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, info};

use super::names::NameRegistry;
use super::path::{join, normalize_template};
use super::pattern::CompiledPattern;
use super::resource::{ResourceAction, ResourceOptions, ResourceSource};
use super::table::{Route, RouteMatch, RouteTable};
use crate::config::RouterConfig;
use crate::dispatcher::{
    find_route, parse_method, Controller, ControllerRegistry, Dispatcher, HandlerRef,
    NotFoundHandlers,
};
use crate::error::{ConfigurationError, UrlError};
use crate::middleware::Middleware;

/// Methods registered by [`Router::any`]
pub const ANY_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// A middleware given directly or by alias
#[derive(Clone)]
pub enum MiddlewareRef {
    Inline(Arc<dyn Middleware>),
    /// Resolved against [`Router::alias_middleware`] when the route is registered
    Named(String),
}

impl From<Arc<dyn Middleware>> for MiddlewareRef {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        MiddlewareRef::Inline(middleware)
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        MiddlewareRef::Named(name.to_string())
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        MiddlewareRef::Named(name)
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareRef::Inline(_) => f.write_str("Inline(..)"),
            MiddlewareRef::Named(name) => write!(f, "Named({name:?})"),
        }
    }
}

/// Settings of one group level
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    prefix: String,
    middleware: Vec<MiddlewareRef>,
    name_prefix: String,
}

impl GroupOptions {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Middleware wrapped around every route of the group
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    /// Text prepended to the names of routes registered in the group
    #[must_use]
    pub fn name_prefix(mut self, name_prefix: impl Into<String>) -> Self {
        self.name_prefix = name_prefix.into();
        self
    }
}

/// One active group level
#[derive(Clone)]
struct GroupFrame {
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
    name_prefix: String,
}

/// Pops the frame it pushed when dropped, including during unwinding
struct GroupScope<'a> {
    router: &'a mut Router,
    depth: usize,
}

impl<'a> GroupScope<'a> {
    fn enter(router: &'a mut Router, frame: GroupFrame) -> Self {
        router.frames.push(frame);
        let depth = router.frames.len();
        Self { router, depth }
    }
}

impl Deref for GroupScope<'_> {
    type Target = Router;

    fn deref(&self) -> &Router {
        self.router
    }
}

impl DerefMut for GroupScope<'_> {
    fn deref_mut(&mut self) -> &mut Router {
        self.router
    }
}

impl Drop for GroupScope<'_> {
    fn drop(&mut self) {
        self.router.frames.truncate(self.depth - 1);
    }
}

/// Builder for the routing table
///
/// Registration happens on one thread during bootstrap; [`Router::build`] then
/// freezes everything into a [`Dispatcher`].
///
/// ```rust
/// use routekit::router::{GroupOptions, Router};
/// use routekit::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult};
///
/// fn list(_req: &mut HandlerRequest) -> HandlerResult {
///     Ok(HandlerResponse::json(200, serde_json::json!([])))
/// }
///
/// let mut router = Router::new();
/// router
///     .group_with(GroupOptions::new("/admin").name_prefix("admin."), |r| {
///         r.group("/posts", |r| {
///             r.get("", list)?.name("posts.index")?;
///             Ok(())
///         })?;
///         Ok(())
///     })
///     .unwrap();
///
/// let dispatcher = router.build();
/// assert!(dispatcher.dispatch("GET", "/admin/posts").is_some());
/// assert_eq!(dispatcher.url_for("admin.posts.index", &[]).unwrap(), "/admin/posts");
/// ```
pub struct Router {
    config: RouterConfig,
    table: RouteTable,
    names: NameRegistry,
    frames: Vec<GroupFrame>,
    global_middleware: Vec<Arc<dyn Middleware>>,
    aliases: HashMap<String, Arc<dyn Middleware>>,
    controllers: ControllerRegistry,
    not_found: NotFoundHandlers,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with `config`
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            table: RouteTable::new(),
            names: NameRegistry::new(),
            frames: Vec::new(),
            global_middleware: Vec::new(),
            aliases: HashMap::new(),
            controllers: ControllerRegistry::new(),
            not_found: NotFoundHandlers::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `middleware` under `name` for use as [`MiddlewareRef::Named`]
    pub fn alias_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: Arc<dyn Middleware>,
    ) -> &mut Self {
        self.aliases.insert(name.into(), middleware);
        self
    }

    /// Add router-wide middleware, applied outermost to routes registered afterwards
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownMiddleware`] for an unregistered alias.
    pub fn middleware(
        &mut self,
        middleware: impl Into<MiddlewareRef>,
    ) -> Result<&mut Self, ConfigurationError> {
        let resolved = self.resolve_middleware(&middleware.into())?;
        self.global_middleware.push(resolved);
        Ok(self)
    }

    /// Register a controller type for `Type@method` handler references
    pub fn controller<C, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.controllers.register(name, factory);
        self
    }

    /// Register a route for `methods`
    ///
    /// The effective path is the concatenation of every active group prefix and
    /// `path`; the effective middleware is the router-wide list, then each group's
    /// from outer to inner.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] for an empty or invalid method list or a malformed
    /// template.
    pub fn map<I, M>(
        &mut self,
        methods: I,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        let mut parsed: Vec<Method> = Vec::new();
        for token in methods {
            let token = token.as_ref();
            let method = parse_method(token).ok_or_else(|| ConfigurationError::InvalidMethod {
                method: token.to_string(),
            })?;
            if !parsed.contains(&method) {
                parsed.push(method);
            }
        }

        let full_path = normalize_template(&join(&self.effective_prefix(), path));
        if parsed.is_empty() {
            return Err(ConfigurationError::EmptyMethods { path: full_path });
        }

        let pattern = CompiledPattern::compile(&full_path, self.config.case_insensitive)?;
        let middleware = self.effective_middleware();

        debug!(
            methods = ?parsed,
            path = %full_path,
            param_names = ?pattern.param_names(),
            middleware_count = middleware.len(),
            "Route registered"
        );

        let index = self.table.push(Route {
            methods: parsed,
            pattern,
            handler: handler.into(),
            middleware,
            name: None,
        });
        Ok(RouteRef {
            router: self,
            index,
        })
    }

    pub fn get(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map([Method::GET], path, handler)
    }

    pub fn post(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map([Method::POST], path, handler)
    }

    pub fn put(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map([Method::PUT], path, handler)
    }

    pub fn patch(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map([Method::PATCH], path, handler)
    }

    pub fn delete(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map([Method::DELETE], path, handler)
    }

    pub fn options(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map([Method::OPTIONS], path, handler)
    }

    /// Register for GET, POST, PUT, PATCH and DELETE
    pub fn any(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteRef<'_>, ConfigurationError> {
        self.map(ANY_METHODS, path, handler)
    }

    /// Run `callback` with `prefix` added to every route it registers
    ///
    /// # Errors
    ///
    /// Whatever `callback` returns. The group is closed either way.
    pub fn group<F>(&mut self, prefix: &str, callback: F) -> Result<&mut Self, ConfigurationError>
    where
        F: FnOnce(&mut Router) -> Result<(), ConfigurationError>,
    {
        self.group_with(GroupOptions::new(prefix), callback)
    }

    /// Run `callback` inside a group described by `options`
    ///
    /// The group's frame is pushed before `callback` runs and popped when it
    /// returns, fails or panics, so nothing leaks into sibling groups.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownMiddleware`] for unresolved aliases, otherwise
    /// whatever `callback` returns.
    pub fn group_with<F>(
        &mut self,
        options: GroupOptions,
        callback: F,
    ) -> Result<&mut Self, ConfigurationError>
    where
        F: FnOnce(&mut Router) -> Result<(), ConfigurationError>,
    {
        let middleware = options
            .middleware
            .iter()
            .map(|m| self.resolve_middleware(m))
            .collect::<Result<Vec<_>, _>>()?;
        let frame = GroupFrame {
            prefix: options.prefix,
            middleware,
            name_prefix: options.name_prefix,
        };

        {
            let mut scope = GroupScope::enter(self, frame);
            debug!(depth = scope.depth, prefix = %scope.effective_prefix(), "Group opened");
            callback(&mut *scope)?;
        }
        Ok(self)
    }

    /// Register the conventional routes of a resource
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if any generated route fails to register, for
    /// example because its name is already taken.
    pub fn resource(
        &mut self,
        base: &str,
        source: ResourceSource,
        options: ResourceOptions,
    ) -> Result<&mut Self, ConfigurationError> {
        self.register_resource(base, &source, &options, &ResourceAction::ALL)
    }

    /// [`Router::resource`] without the `create` and `edit` form routes
    ///
    /// # Errors
    ///
    /// See [`Router::resource`].
    pub fn api_resource(
        &mut self,
        base: &str,
        source: ResourceSource,
        options: ResourceOptions,
    ) -> Result<&mut Self, ConfigurationError> {
        self.register_resource(base, &source, &options, &ResourceAction::API)
    }

    /// Registers every route of the resource or none of them
    fn register_resource(
        &mut self,
        base: &str,
        source: &ResourceSource,
        options: &ResourceOptions,
        default_actions: &[ResourceAction],
    ) -> Result<&mut Self, ConfigurationError> {
        let middleware = options
            .middleware
            .iter()
            .map(|m| self.resolve_middleware(m))
            .collect::<Result<Vec<_>, _>>()?;

        let mut planned = Vec::new();
        for action in options.actions(default_actions) {
            let Some(handler) = source.handler_for(action) else {
                continue;
            };
            let path = format!(
                "{}{}",
                base.trim_end_matches('/'),
                action.path(options.parameter_name())
            );
            planned.push((action, path, handler, options.route_name(base, action)?));
        }

        let start = self.table.len();
        for (action, path, handler, name) in planned {
            let registered = self
                .map([action.method()], &path, handler)
                .map(|route| route.with_middleware(&middleware))
                .and_then(|route| route.name(&name))
                .map(|_| ());
            if let Err(err) = registered {
                self.truncate_routes(start);
                return Err(err);
            }
        }
        debug!(base = %base, routes = self.table.len() - start, "Resource registered");
        Ok(self)
    }

    /// Handler for requests no route and no scoped not-found handler matches
    pub fn not_found(&mut self, handler: impl Into<HandlerRef>) -> &mut Self {
        self.not_found.set_fallback(handler.into());
        self
    }

    /// Not-found handler for paths under a prefix or matching a template
    ///
    /// Scoped handlers are tried in registration order before the fallback.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] for a malformed template scope.
    pub fn not_found_for(
        &mut self,
        scope: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<&mut Self, ConfigurationError> {
        self.not_found
            .add_scoped(scope, handler.into(), self.config.case_insensitive)?;
        Ok(self)
    }

    /// Match against the routes registered so far
    #[must_use]
    pub fn dispatch(&self, method: &str, path: &str) -> Option<RouteMatch> {
        let method = parse_method(method)?;
        find_route(&self.table, &self.config, &method, path)
    }

    /// Generate the URL of a named route, substituting `args` by position
    ///
    /// # Errors
    ///
    /// [`UrlError::RouteNotFound`] for unknown names.
    pub fn url_for(&self, name: &str, args: &[&dyn Display]) -> Result<String, UrlError> {
        self.names.url_for(name, args)
    }

    /// Routes registered so far, in priority order
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.table.iter()
    }

    /// Freeze the registered routes into a dispatcher
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let routes_summary: Vec<&str> = self.table.iter().take(10).map(|r| r.path()).collect();
        info!(
            routes_count = self.table.len(),
            named_routes = self.names.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
        Dispatcher {
            table: self.table,
            names: self.names,
            not_found: self.not_found,
            controllers: self.controllers,
            global_middleware: self.global_middleware,
            config: self.config,
        }
    }

    fn resolve_middleware(
        &self,
        middleware: &MiddlewareRef,
    ) -> Result<Arc<dyn Middleware>, ConfigurationError> {
        match middleware {
            MiddlewareRef::Inline(m) => Ok(Arc::clone(m)),
            MiddlewareRef::Named(name) => self.aliases.get(name).cloned().ok_or_else(|| {
                ConfigurationError::UnknownMiddleware { name: name.clone() }
            }),
        }
    }

    /// Drop routes registered at or after `len`, together with their names
    fn truncate_routes(&mut self, len: usize) {
        while self.table.len() > len {
            let Some(route) = self.table.pop() else {
                break;
            };
            if let Some(name) = route.name() {
                self.names.remove(name);
            }
            debug!(path = %route.path(), "Route withdrawn");
        }
    }

    fn effective_prefix(&self) -> String {
        self.frames
            .iter()
            .fold(String::new(), |acc, frame| join(&acc, &frame.prefix))
    }

    fn effective_middleware(&self) -> Vec<Arc<dyn Middleware>> {
        self.global_middleware
            .iter()
            .chain(self.frames.iter().flat_map(|frame| frame.middleware.iter()))
            .cloned()
            .collect()
    }

    fn effective_name_prefix(&self) -> String {
        self.frames
            .iter()
            .map(|frame| frame.name_prefix.as_str())
            .collect()
    }
}

/// A just-registered route, for naming it or adding route-local middleware
///
/// A failing call withdraws the route (and its name) from the table, so a
/// route is never served with only part of its registration applied.
pub struct RouteRef<'a> {
    router: &'a mut Router,
    index: usize,
}

impl<'a> RouteRef<'a> {
    /// Name the route; active group name prefixes are prepended
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateRouteName`] if the effective name is taken,
    /// [`ConfigurationError::RouteAlreadyNamed`] if the route already has a name.
    pub fn name(self, name: &str) -> Result<Self, ConfigurationError> {
        let full_name = format!("{}{name}", self.router.effective_name_prefix());
        let Some(route) = self.router.table.get_mut(self.index) else {
            return Ok(self);
        };
        let named = match &route.name {
            Some(existing) => Err(ConfigurationError::RouteAlreadyNamed {
                existing: existing.clone(),
                name: full_name.clone(),
            }),
            None => self.router.names.insert(&full_name, &route.pattern),
        };
        match named {
            Ok(()) => {
                route.name = Some(full_name);
                Ok(self)
            }
            Err(err) => Err(self.withdraw(err)),
        }
    }

    /// Append route-local middleware, innermost so far
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownMiddleware`] for an unregistered alias.
    pub fn middleware(self, middleware: impl Into<MiddlewareRef>) -> Result<Self, ConfigurationError> {
        match self.router.resolve_middleware(&middleware.into()) {
            Ok(resolved) => Ok(self.with_middleware(&[resolved])),
            Err(err) => Err(self.withdraw(err)),
        }
    }

    fn with_middleware(self, middleware: &[Arc<dyn Middleware>]) -> Self {
        if let Some(route) = self.router.table.get_mut(self.index) {
            route.middleware.extend(middleware.iter().cloned());
        }
        self
    }

    fn withdraw(self, err: ConfigurationError) -> ConfigurationError {
        self.router.truncate_routes(self.index);
        err
    }

    /// The route as registered so far
    #[must_use]
    pub fn route(&self) -> Option<&Arc<Route>> {
        self.router.table.get(self.index)
    }
}
