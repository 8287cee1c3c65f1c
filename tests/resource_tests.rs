use http::Method;
use routekit::dispatcher::{Controller, HandlerRequest, HandlerResponse, HandlerResult};
use routekit::error::{ConfigurationError, HandlerResolutionError};
use routekit::router::{GroupOptions, ResourceAction, ResourceOptions, ResourceSource, Router};
use std::sync::Arc;

mod common;
use common::{deny, labelled};

#[derive(Default)]
struct PhotoController;

impl Controller for PhotoController {
    fn call(&self, action: &str, req: &mut HandlerRequest) -> Option<HandlerResult> {
        Some(Ok(HandlerResponse::json(
            200,
            serde_json::json!({
                "action": action,
                "id": req.get_path_param("id"),
                "photo": req.get_path_param("photo"),
            }),
        )))
    }
}

fn table(router: &Router) -> Vec<(String, String, String)> {
    router
        .routes()
        .map(|route| {
            (
                route.methods()[0].to_string(),
                route.path().to_string(),
                route.name().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

fn row(method: &str, path: &str, name: &str) -> (String, String, String) {
    (method.to_string(), path.to_string(), name.to_string())
}

#[test]
fn test_full_resource_table() {
    let mut router = Router::new();
    router
        .resource("/photos", ResourceSource::controller("PhotoController"), ResourceOptions::new())
        .unwrap();

    assert_eq!(
        table(&router),
        vec![
            row("GET", "/photos", "photos.index"),
            row("GET", "/photos/create", "photos.create"),
            row("POST", "/photos", "photos.store"),
            row("GET", "/photos/{id}", "photos.show"),
            row("GET", "/photos/{id}/edit", "photos.edit"),
            row("PUT", "/photos/{id}", "photos.update"),
            row("DELETE", "/photos/{id}", "photos.destroy"),
        ]
    );
}

#[test]
fn test_create_is_not_captured_by_show() {
    let mut router = Router::new();
    router.controller("PhotoController", || PhotoController);
    router
        .resource("/photos", ResourceSource::controller("PhotoController"), ResourceOptions::new())
        .unwrap();
    let dispatcher = router.build();

    let res = dispatcher
        .run(HandlerRequest::new(Method::GET, "/photos/create"))
        .unwrap();
    assert_eq!(res.body["action"], "create");

    let res = dispatcher
        .run(HandlerRequest::new(Method::PUT, "/photos/12"))
        .unwrap();
    assert_eq!(res.body["action"], "update");
    assert_eq!(res.body["id"], "12");
}

#[test]
fn test_api_resource_skips_form_routes() {
    let mut router = Router::new();
    router
        .api_resource("/photos", ResourceSource::controller("PhotoController"), ResourceOptions::new())
        .unwrap();

    let names: Vec<String> = table(&router).into_iter().map(|(_, _, name)| name).collect();
    assert_eq!(
        names,
        vec![
            "photos.index",
            "photos.store",
            "photos.show",
            "photos.update",
            "photos.destroy"
        ]
    );
}

#[test]
fn test_only_keeps_table_order() {
    let mut router = Router::new();
    router
        .resource(
            "/photos",
            ResourceSource::controller("PhotoController"),
            ResourceOptions::new().only([ResourceAction::Destroy, ResourceAction::Index]),
        )
        .unwrap();

    assert_eq!(
        table(&router),
        vec![
            row("GET", "/photos", "photos.index"),
            row("DELETE", "/photos/{id}", "photos.destroy"),
        ]
    );
}

#[test]
fn test_except_parameter_and_names() {
    let mut router = Router::new();
    router
        .resource(
            "/users/{user}/photos",
            ResourceSource::controller("PhotoController"),
            ResourceOptions::new()
                .except([ResourceAction::Create, ResourceAction::Edit, ResourceAction::Destroy])
                .parameter("photo")
                .name("user_photos")
                .action_name(ResourceAction::Show, "photo"),
        )
        .unwrap();

    assert_eq!(
        table(&router),
        vec![
            row("GET", "/users/{user}/photos", "user_photos.index"),
            row("POST", "/users/{user}/photos", "user_photos.store"),
            row("GET", "/users/{user}/photos/{photo}", "photo"),
            row("PUT", "/users/{user}/photos/{photo}", "user_photos.update"),
        ]
    );
    assert_eq!(router.url_for("photo", &[&1, &2]).unwrap(), "/users/1/photos/2");
}

#[test]
fn test_explicit_actions_skip_missing_keys() {
    let mut router = Router::new();
    router
        .resource(
            "/tags",
            ResourceSource::actions([
                (ResourceAction::Index, labelled("tags.index")),
                (ResourceAction::Show, labelled("tags.show")),
            ]),
            ResourceOptions::new(),
        )
        .unwrap();

    let paths: Vec<String> = router.routes().map(|r| r.path().to_string()).collect();
    assert_eq!(paths, vec!["/tags", "/tags/{id}"]);

    let dispatcher = router.build();
    let res = dispatcher.run(HandlerRequest::new(Method::GET, "/tags/7")).unwrap();
    assert_eq!(res.body["handler"], "tags.show");
}

#[test]
fn test_instance_source() {
    let mut router = Router::new();
    router
        .api_resource(
            "/photos",
            ResourceSource::instance(Arc::new(PhotoController)),
            ResourceOptions::new(),
        )
        .unwrap();
    let res = router
        .build()
        .run(HandlerRequest::new(Method::DELETE, "/photos/3"))
        .unwrap();
    assert_eq!(res.body["action"], "destroy");
    assert_eq!(res.body["id"], "3");
}

#[test]
fn test_unregistered_controller_fails_at_call_time() {
    let mut router = Router::new();
    router
        .resource("/photos", ResourceSource::controller("Missing"), ResourceOptions::new())
        .unwrap();
    let err = router
        .build()
        .run(HandlerRequest::new(Method::GET, "/photos"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HandlerResolutionError>(),
        Some(HandlerResolutionError::UnknownController { .. })
    ));
}

#[test]
fn test_resource_inside_group_with_middleware() {
    let mut router = Router::new();
    router.alias_middleware("deny", deny());
    router
        .group_with(GroupOptions::new("/admin").name_prefix("admin."), |r| {
            r.api_resource(
                "/photos",
                ResourceSource::controller("PhotoController"),
                ResourceOptions::new().only([ResourceAction::Index]).middleware("deny"),
            )?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        table(&router),
        vec![row("GET", "/admin/photos", "admin.photos.index")]
    );
    let res = router
        .build()
        .run(HandlerRequest::new(Method::GET, "/admin/photos"))
        .unwrap();
    assert_eq!(res.status, 401);
}

#[test]
fn test_duplicate_resource_names() {
    let mut router = Router::new();
    router
        .api_resource("/photos", ResourceSource::controller("PhotoController"), ResourceOptions::new())
        .unwrap();
    let err = router
        .api_resource("/photos", ResourceSource::controller("PhotoController"), ResourceOptions::new())
        .err();
    assert_eq!(
        err,
        Some(ConfigurationError::DuplicateRouteName {
            name: "photos.index".to_string()
        })
    );
}

#[test]
fn test_failed_resource_registers_nothing() {
    let mut router = Router::new();
    router.get("/legacy", labelled("legacy")).unwrap().name("photos.show").unwrap();

    let err = router
        .api_resource("/photos", ResourceSource::controller("PhotoController"), ResourceOptions::new())
        .err();
    assert_eq!(
        err,
        Some(ConfigurationError::DuplicateRouteName {
            name: "photos.show".to_string()
        })
    );
    assert_eq!(table(&router), vec![row("GET", "/legacy", "photos.show")]);
    assert!(router.dispatch("GET", "/photos").is_none());
    assert!(router.url_for("photos.index", &[]).is_err());
}

#[test]
fn test_resource_with_unknown_middleware_registers_nothing() {
    let mut router = Router::new();
    let err = router
        .api_resource(
            "/photos",
            ResourceSource::controller("PhotoController"),
            ResourceOptions::new().middleware("auth"),
        )
        .err();
    assert_eq!(
        err,
        Some(ConfigurationError::UnknownMiddleware {
            name: "auth".to_string()
        })
    );
    assert_eq!(router.routes().count(), 0);
}

#[test]
fn test_root_resource_needs_a_name() {
    let mut router = Router::new();
    let err = router
        .api_resource("/", ResourceSource::controller("PageController"), ResourceOptions::new())
        .err();
    assert_eq!(
        err,
        Some(ConfigurationError::UnnamedResource {
            base: "/".to_string()
        })
    );
    assert_eq!(router.routes().count(), 0);

    router
        .api_resource(
            "/",
            ResourceSource::controller("PageController"),
            ResourceOptions::new().name("pages").only([ResourceAction::Index, ResourceAction::Show]),
        )
        .unwrap();
    assert_eq!(
        table(&router),
        vec![row("GET", "/", "pages.index"), row("GET", "/{id}", "pages.show")]
    );
}
