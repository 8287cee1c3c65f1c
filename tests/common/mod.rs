#![allow(dead_code)]

use routekit::dispatcher::{HandlerRef, HandlerRequest, HandlerResponse, HandlerResult};
use routekit::middleware::{from_fn, Middleware, Next};
use std::sync::{Arc, Mutex};

/// Echoes the matched route and its parameters
pub fn echo(req: &mut HandlerRequest) -> HandlerResult {
    Ok(HandlerResponse::json(
        200,
        serde_json::json!({
            "route": req.route_pattern,
            "name": req.route_name,
            "params": req.path_params_map(),
        }),
    ))
}

/// A handler answering with `label` in the body
pub fn labelled(label: &'static str) -> HandlerRef {
    HandlerRef::func(move |_req: &mut HandlerRequest| -> HandlerResult {
        Ok(HandlerResponse::json(200, serde_json::json!({ "handler": label })))
    })
}

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::default()
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Middleware appending `label:before` / `label:after` around the rest of the chain
pub fn recorder(log: &Log, label: &'static str) -> Arc<dyn Middleware> {
    let log = Arc::clone(log);
    from_fn(move |req: &mut HandlerRequest, next: Next<'_>| {
        log.lock().unwrap().push(format!("{label}:before"));
        let res = next.run(req);
        log.lock().unwrap().push(format!("{label}:after"));
        res
    })
}

/// Middleware answering 401 without calling the rest of the chain
pub fn deny() -> Arc<dyn Middleware> {
    from_fn(|_req: &mut HandlerRequest, _next: Next<'_>| {
        Ok(HandlerResponse::error(401, "Unauthorized"))
    })
}
