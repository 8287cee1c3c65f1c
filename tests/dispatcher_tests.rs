use http::Method;
use routekit::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult, SharedDispatcher};
use routekit::error::ConfigurationError;
use routekit::middleware::{from_fn, MetricsMiddleware, Middleware, Next};
use routekit::router::Router;
use std::sync::Arc;
use std::thread;

mod common;
use common::{echo, entries, labelled, new_log, recorder};

fn fails(_req: &mut HandlerRequest) -> HandlerResult {
    Err(anyhow::anyhow!("database unavailable"))
}

#[test]
fn test_run_invokes_matched_handler_once() {
    let log = new_log();
    let mut router = Router::new();
    router
        .get("/posts/{id:num}", echo)
        .unwrap()
        .middleware(recorder(&log, "route"))
        .unwrap();
    let dispatcher = router.build();

    let res = dispatcher
        .run(HandlerRequest::new(Method::GET, "/posts/42"))
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body["params"]["id"], "42");
    assert_eq!(res.body["route"], "/posts/{id:num}");
    assert_eq!(entries(&log), vec!["route:before", "route:after"]);
}

#[test]
fn test_handler_errors_are_returned_untouched() {
    let mut router = Router::new();
    router.get("/broken", fails).unwrap();
    let err = router
        .build()
        .run(HandlerRequest::new(Method::GET, "/broken"))
        .unwrap_err();
    assert_eq!(err.to_string(), "database unavailable");
}

#[test]
fn test_not_found_runs_inside_global_middleware_only() {
    let log = new_log();
    let mut router = Router::new();
    router.middleware(recorder(&log, "global")).unwrap();
    router
        .group_with(
            routekit::router::GroupOptions::new("/admin").middleware(recorder(&log, "admin")),
            |r| {
                r.get("/", echo)?;
                Ok(())
            },
        )
        .unwrap();
    router.not_found(labelled("missing"));
    let dispatcher = router.build();

    let res = dispatcher
        .run(HandlerRequest::new(Method::GET, "/admin/unknown"))
        .unwrap();
    assert_eq!(res.body["handler"], "missing");
    assert_eq!(entries(&log), vec!["global:before", "global:after"]);
}

#[test]
fn test_method_not_allowed_detection() {
    let mut router = Router::new();
    router.get("/posts/{id}", echo).unwrap();
    router.put("/posts/{id}", echo).unwrap();
    router.get("/posts/{id}/comments", echo).unwrap();
    let dispatcher = router.build();

    assert!(dispatcher.dispatch("DELETE", "/posts/1").is_none());
    assert_eq!(
        dispatcher.allowed_methods("/posts/1/"),
        vec![Method::GET, Method::PUT]
    );
    assert!(dispatcher.allowed_methods("/nothing").is_empty());
}

#[test]
fn test_middleware_aliases() {
    let log = new_log();
    let mut router = Router::new();
    router.alias_middleware("audit", recorder(&log, "audit"));
    router.get("/a", echo).unwrap().middleware("audit").unwrap();

    let err = router.get("/b", echo).unwrap().middleware("missing").err();
    assert_eq!(
        err.map(|e| e.to_string()),
        Some(
            ConfigurationError::UnknownMiddleware {
                name: "missing".to_string()
            }
            .to_string()
        )
    );

    router
        .build()
        .run(HandlerRequest::new(Method::GET, "/a"))
        .unwrap();
    assert_eq!(entries(&log), vec!["audit:before", "audit:after"]);
}

#[test]
fn test_unresolved_route_middleware_withdraws_the_route() {
    let mut router = Router::new();
    router.get("/", echo).unwrap();
    let err = router
        .get("/admin", echo)
        .unwrap()
        .name("admin")
        .unwrap()
        .middleware("auth")
        .err();
    assert_eq!(
        err,
        Some(ConfigurationError::UnknownMiddleware {
            name: "auth".to_string()
        })
    );
    assert!(router.dispatch("GET", "/admin").is_none());
    assert!(router.url_for("admin", &[]).is_err());

    let dispatcher = router.build();
    assert_eq!(dispatcher.routes().count(), 1);
    let res = dispatcher
        .run(HandlerRequest::new(Method::GET, "/admin"))
        .unwrap();
    assert_eq!(res.status, 404);
}

#[test]
fn test_introspection() {
    let mut router = Router::new();
    router.get("/", echo).unwrap().name("home").unwrap();
    router.post("/posts", echo).unwrap();
    let dispatcher = router.build();

    assert_eq!(dispatcher.route_patterns(), vec!["/", "/posts"]);
    let names: Vec<Option<&str>> = dispatcher.routes().map(|r| r.name()).collect();
    assert_eq!(names, vec![Some("home"), None]);
    dispatcher.dump_routes();
}

#[test]
fn test_shared_dispatcher_replace() {
    let mut first = Router::new();
    first.get("/", labelled("v1")).unwrap();
    let shared = SharedDispatcher::new(first.build());

    let snapshot = shared.load();
    let mut second = Router::new();
    second.get("/", labelled("v2")).unwrap();
    second.get("/new", labelled("v2")).unwrap();
    let previous = shared.replace(second.build());

    assert_eq!(previous.routes().count(), 1);
    assert_eq!(snapshot.route_patterns(), vec!["/"]);
    let res = shared.run(HandlerRequest::new(Method::GET, "/new")).unwrap();
    assert_eq!(res.body["handler"], "v2");
}

#[test]
fn test_concurrent_dispatch() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let mut router = Router::new();
    router
        .middleware(Arc::clone(&metrics) as Arc<dyn Middleware>)
        .unwrap();
    router.get("/posts/{id:num}", echo).unwrap();
    let dispatcher = Arc::new(router.build());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                for i in 0..25 {
                    let path = format!("/posts/{}", t * 100 + i);
                    let res = dispatcher
                        .run(HandlerRequest::new(Method::GET, path))
                        .unwrap();
                    assert_eq!(res.body["params"]["id"], (t * 100 + i).to_string());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(metrics.request_count(), 100);
    assert_eq!(metrics.failure_status_count(), 0);
}

#[test]
fn test_short_circuit_prevents_handler() {
    let mut router = Router::new();
    let guard = from_fn(|req: &mut HandlerRequest, next: Next<'_>| {
        if req.get_header("authorization").is_none() {
            return Ok(HandlerResponse::error(401, "Unauthorized"));
        }
        next.run(req)
    });
    router.get("/private", fails).unwrap().middleware(guard).unwrap();
    let dispatcher = router.build();

    let res = dispatcher
        .run(HandlerRequest::new(Method::GET, "/private"))
        .unwrap();
    assert_eq!(res.status, 401);
    assert!(dispatcher
        .run(HandlerRequest::new(Method::GET, "/private").with_header("Authorization", "Bearer x"))
        .is_err());
}
