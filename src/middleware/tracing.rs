use std::time::Instant;

use tracing::{field, info_span};

use super::{Middleware, Next};
use crate::dispatcher::{HandlerRequest, HandlerResult};

/// Opens a `request` span around the rest of the chain
///
/// The span carries the request id, method, path and matched route; status and
/// latency are recorded once the continuation returns.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, req: &mut HandlerRequest, next: Next<'_>) -> HandlerResult {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            route = req.route_pattern.as_deref().unwrap_or("<none>"),
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let _guard = span.enter();
        let start = Instant::now();

        let result = next.run(req);

        span.record("latency_ms", start.elapsed().as_millis() as u64);
        match &result {
            Ok(res) => {
                span.record("status", res.status);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Request chain returned an error");
            }
        }
        result
    }
}
