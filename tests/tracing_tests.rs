use http::Method;
use routekit::dispatcher::HandlerRequest;
use routekit::middleware::{Middleware, TracingMiddleware};
use routekit::router::Router;
use std::sync::Arc;

mod common;
use common::echo;

use tracing_util::TestTracing;

#[test]
fn test_tracing_middleware_emits_request_span() {
    let tracing = TestTracing::init();

    let mut router = Router::new();
    router
        .middleware(Arc::new(TracingMiddleware) as Arc<dyn Middleware>)
        .unwrap();
    router.get("/posts/{id:num}", echo).unwrap();
    let dispatcher = router.build();

    let res = dispatcher
        .run(HandlerRequest::new(Method::GET, "/posts/7"))
        .unwrap();
    assert_eq!(res.status, 200);

    assert!(tracing.contains("Routing table loaded"));
    assert!(tracing.contains("Request dispatched to route"));
    assert!(tracing.contains("/posts/{id:num}"));
}

#[test]
fn test_dispatch_logs_match_outcome() {
    let tracing = TestTracing::init();

    let mut router = Router::new();
    router.get("/about", echo).unwrap();
    assert!(router.dispatch("GET", "/about").is_some());
    assert!(router.dispatch("GET", "/contact").is_none());

    assert!(tracing.contains("Route registered"));
    assert!(tracing.contains("Route match attempt"));
    assert!(tracing.contains("No route matched"));
}

#[test]
fn test_request_id_is_logged() {
    let tracing = TestTracing::init();

    let dispatcher = Router::new().build();
    let req = HandlerRequest::new(Method::GET, "/missing");
    let id = req.request_id.to_string();
    let res = dispatcher.run(req).unwrap();
    assert_eq!(res.status, 404);

    assert!(tracing.contains("No route matched - invoking not-found handler"));
    assert!(tracing.contains(&id));
}
