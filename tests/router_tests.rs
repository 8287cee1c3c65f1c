use http::Method;
use routekit::config::RouterConfig;
use routekit::dispatcher::HandlerRequest;
use routekit::error::ConfigurationError;
use routekit::router::Router;

mod common;
use common::{echo, labelled};

fn handler_of(router: Router, method: Method, path: &str) -> String {
    let res = router
        .build()
        .run(HandlerRequest::new(method, path))
        .unwrap();
    res.body["handler"].as_str().unwrap_or_default().to_string()
}

#[test]
fn test_route_matching() {
    let mut router = Router::new();
    router.get("/", echo).unwrap();
    router.get("/posts", echo).unwrap();
    router.get("/posts/{id:num}", echo).unwrap();
    router.post("/posts", echo).unwrap();

    let cases = [
        (Method::GET, "/", Some("/")),
        (Method::GET, "/posts", Some("/posts")),
        (Method::POST, "/posts", Some("/posts")),
        (Method::GET, "/posts/42", Some("/posts/{id:num}")),
        (Method::GET, "/posts/abc", None),
        (Method::DELETE, "/posts/42", None),
        (Method::GET, "/missing", None),
    ];

    for (method, path, expected) in cases {
        let matched = router.dispatch(method.as_str(), path);
        assert_eq!(
            matched.as_ref().map(|m| m.route.path()),
            expected,
            "{method} {path}"
        );
    }
}

#[test]
fn test_first_registered_route_wins() {
    let mut router = Router::new();
    router.get("/posts/{slug}", labelled("slug")).unwrap();
    router.get("/posts/{id:num}", labelled("id")).unwrap();
    assert_eq!(handler_of(router, Method::GET, "/posts/5"), "slug");

    let mut router = Router::new();
    router.get("/posts/{id:num}", labelled("id")).unwrap();
    router.get("/posts/{slug}", labelled("slug")).unwrap();
    assert_eq!(handler_of(router, Method::GET, "/posts/5"), "id");
    let mut router = Router::new();
    router.get("/posts/{id:num}", labelled("id")).unwrap();
    router.get("/posts/{slug}", labelled("slug")).unwrap();
    assert_eq!(handler_of(router, Method::GET, "/posts/hello"), "slug");
}

#[test]
fn test_method_mismatch_falls_through_to_later_route() {
    let mut router = Router::new();
    router.get("/things/{id}", labelled("get")).unwrap();
    router.delete("/things/{id}", labelled("delete")).unwrap();
    assert_eq!(handler_of(router, Method::DELETE, "/things/1"), "delete");
}

#[test]
fn test_map_and_any() {
    let mut router = Router::new();
    router.map(["get", "Post"], "/form", echo).unwrap();
    router.any("/anything", echo).unwrap();

    assert!(router.dispatch("POST", "/form").is_some());
    assert!(router.dispatch("PUT", "/form").is_none());
    for method in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
        assert!(router.dispatch(method, "/anything").is_some(), "{method}");
    }
    assert!(router.dispatch("OPTIONS", "/anything").is_none());
}

#[test]
fn test_registration_errors() {
    let mut router = Router::new();
    let empty: [&str; 0] = [];
    assert!(matches!(
        router.map(empty, "/x", echo).err(),
        Some(ConfigurationError::EmptyMethods { .. })
    ));
    assert!(matches!(
        router.map(["GE T"], "/x", echo).err(),
        Some(ConfigurationError::InvalidMethod { .. })
    ));
    assert!(matches!(
        router.get("/x/{id:uuid}", echo).err(),
        Some(ConfigurationError::UnknownPlaceholderType { .. })
    ));
    assert_eq!(router.routes().count(), 0);
}

#[test]
fn test_optional_placeholder() {
    let mut router = Router::new();
    router.get("/foo/{bar}?", echo).unwrap();

    let matched = router.dispatch("GET", "/foo").unwrap();
    assert!(matched.get_path_param("bar").is_none());
    let matched = router.dispatch("GET", "/foo/x").unwrap();
    assert_eq!(matched.get_path_param("bar"), Some("x"));
}

#[test]
fn test_all_placeholder_spans_segments() {
    let mut router = Router::new();
    router.get("/files/{path:all}", echo).unwrap();
    let matched = router.dispatch("GET", "/files/a/b/c.txt").unwrap();
    assert_eq!(matched.get_path_param("path"), Some("a/b/c.txt"));
}

#[test]
fn test_num_placeholder_rejects_decoded_non_ascii_digits() {
    let mut router = Router::new();
    router.get("/posts/{id:num}", echo).unwrap();

    assert!(router.dispatch("GET", "/posts/%D9%A4%D9%A2").is_none());
    assert!(router.dispatch("GET", "/posts/\u{0664}\u{0662}").is_none());
    let matched = router.dispatch("GET", "/posts/%34%32").unwrap();
    assert_eq!(matched.get_path_param("id"), Some("42"));
}

#[test]
fn test_request_path_normalization() {
    let mut router = Router::new();
    router.get("/posts/{title}", echo).unwrap();
    router.get("/about", echo).unwrap();

    assert!(router.dispatch("GET", "/about/").is_some());
    assert!(router.dispatch("GET", "/about?x=1").is_some());
    let matched = router.dispatch("GET", "/posts/hello%20world").unwrap();
    assert_eq!(matched.get_path_param("title"), Some("hello world"));
    assert!(router.dispatch("GET", "/ABOUT").is_some());
}

#[test]
fn test_case_sensitive_configuration() {
    let config = RouterConfig {
        case_insensitive: false,
        ..RouterConfig::default()
    };
    let mut router = Router::with_config(config);
    router.get("/about", echo).unwrap();
    router.get("/Posts/{id}", echo).unwrap();

    assert!(router.dispatch("GET", "/about").is_some());
    assert!(router.dispatch("GET", "/ABOUT").is_none());
    assert!(router.dispatch("GET", "/posts/1").is_none());
}

#[test]
fn test_dispatch_is_pure() {
    let mut router = Router::new();
    router.get("/posts/{id:num}", echo).unwrap();
    let dispatcher = router.build();

    let first = dispatcher.dispatch("GET", "/posts/1").unwrap();
    let second = dispatcher.dispatch("GET", "/posts/1").unwrap();
    assert_eq!(first.route.path(), second.route.path());
    assert_eq!(first.path_params, second.path_params);
    assert_eq!(dispatcher.routes().count(), 1);
}

#[test]
fn test_literal_route_registered_later_still_wins_exact_match() {
    let mut router = Router::new();
    router.get("/{page}", labelled("page")).unwrap();
    router.get("/about", labelled("about")).unwrap();
    assert_eq!(handler_of(router, Method::GET, "/about"), "about");
}
