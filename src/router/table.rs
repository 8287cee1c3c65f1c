//! Route table - hot path for request matching.
//!
//! Routes are kept in registration order, which is also their match priority.
//! Lookup first consults an index of placeholder-free templates (plain string
//! equality), then scans every route whose method set accepts the request.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::pattern::CompiledPattern;
use crate::dispatcher::HandlerRef;
use crate::middleware::Middleware;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 placeholders (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the compiled route and are
/// shared by every match; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A registered route
///
/// Built once during registration and read-only afterwards. Middleware is stored
/// fully resolved: global, then every enclosing group outer to inner, then the
/// route's own.
#[derive(Clone)]
pub struct Route {
    pub(crate) methods: Vec<Method>,
    pub(crate) pattern: CompiledPattern,
    pub(crate) handler: HandlerRef,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) name: Option<String>,
}

impl Route {
    /// Methods this route answers to
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether `method` is one of this route's methods
    #[inline]
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// The full template, group prefixes included
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.raw()
    }

    /// The compiled matcher
    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// The handler reference invoked for this route
    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Resolved middleware, outermost first
    #[must_use]
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Effective route name, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("path", &self.pattern.raw())
            .field("handler", &self.handler)
            .field("middleware_count", &self.middleware.len())
            .field("name", &self.name)
            .finish()
    }
}

/// Result of successfully matching a request to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<Route>,
    /// Path parameters in capture order (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics if the same name was captured twice.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Append-only, insertion-ordered route collection
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    /// Placeholder-free templates → indices into `routes`, in registration order
    literals: HashMap<String, SmallVec<[usize; 2]>>,
}

impl RouteTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route and return its position
    pub fn push(&mut self, route: Route) -> usize {
        let index = self.routes.len();
        if let Some(literal) = route.pattern.literal() {
            self.literals
                .entry(literal.to_string())
                .or_default()
                .push(index);
        }
        self.routes.push(Arc::new(route));
        index
    }

    /// Remove the most recently registered route
    pub(crate) fn pop(&mut self) -> Option<Arc<Route>> {
        let route = self.routes.pop()?;
        if let Some(literal) = route.pattern.literal() {
            if let Some(indices) = self.literals.get_mut(literal) {
                indices.pop();
                if indices.is_empty() {
                    self.literals.remove(literal);
                }
            }
        }
        Some(route)
    }

    /// Mutable access to a route that is still being registered
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Route> {
        self.routes.get_mut(index).map(Arc::make_mut)
    }

    /// Route at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Route>> {
        self.routes.get(index)
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    /// Find the route for an already-normalized path
    ///
    /// An exact literal hit whose methods accept `method` wins outright. Otherwise
    /// the first route in registration order that accepts `method` and whose
    /// matcher covers the whole path is returned.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        if let Some(indices) = self.literals.get(path) {
            let hit = indices
                .iter()
                .filter_map(|&i| self.routes.get(i))
                .find(|route| route.allows(method));
            if let Some(route) = hit {
                return Some(RouteMatch {
                    route: Arc::clone(route),
                    path_params: ParamVec::new(),
                });
            }
        }

        self.routes
            .iter()
            .filter(|route| route.allows(method))
            .find_map(|route| {
                route.pattern.captures(path).map(|path_params| RouteMatch {
                    route: Arc::clone(route),
                    path_params,
                })
            })
    }

    /// Union of the methods of every route whose matcher covers `path`
    ///
    /// Order follows registration order; duplicates are removed.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if !route.pattern.is_match(path) {
                continue;
            }
            for method in &route.methods {
                if !methods.contains(method) {
                    methods.push(method.clone());
                }
            }
        }
        methods
    }
}
