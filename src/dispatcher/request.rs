use http::{Extensions, Method};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>` because they repeat across requests
/// (content-type, authorization, ...).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Result of invoking a handler or a middleware chain
///
/// Errors belong to the embedding application; the dispatcher hands them back
/// untouched.
pub type HandlerResult = anyhow::Result<HandlerResponse>;

/// Request data passed through the middleware chain to a handler
///
/// Built by the host from its own request type. `extensions` carries ambient
/// values such as a cancellation token; the router never reads or writes them.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path, normalized once the request has been dispatched
    pub path: String,
    /// Template of the matched route, `None` until matched or when nothing matched
    pub route_pattern: Option<String>,
    /// Name of the matched route
    pub route_name: Option<String>,
    /// Path parameters extracted from the URL (stack-allocated for ≤8 params)
    pub path_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Host-provided ambient values
    pub extensions: Extensions,
}

impl HandlerRequest {
    /// Create a request for `method` and the raw request `path`
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            route_pattern: None,
            route_name: None,
            path_params: ParamVec::new(),
            headers: HeaderVec::new(),
            extensions: Extensions::new(),
        }
    }

    /// Add a header
    ///
    /// A valid `x-request-id` header also becomes the request's id.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("x-request-id") {
            if let Ok(id) = value.parse::<RequestId>() {
                self.request_id = id;
            }
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    /// Attach an ambient value for handlers and middleware
    #[must_use]
    pub fn with_extension<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value);
        self
    }

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

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap for compatibility
    /// Note: This allocates - use get_path_param() in hot paths
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Response produced by a handler
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// The response used when no route and no not-found handler applies
    #[must_use]
    pub fn not_found() -> Self {
        Self::error(404, "Not Found")
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}
