use std::sync::Arc;

use crate::dispatcher::{HandlerRequest, HandlerResult};

/// A function wrapping the rest of the chain
///
/// `handle` receives the request and the continuation. It may run code before
/// and after calling [`Next::run`], replace the result, or return without calling
/// it at all; in that case neither the handler nor any middleware further in
/// are executed.
pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut HandlerRequest, next: Next<'_>) -> HandlerResult;
}

impl<F> Middleware for F
where
    F: Fn(&mut HandlerRequest, Next<'_>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, req: &mut HandlerRequest, next: Next<'_>) -> HandlerResult {
        self(req, next)
    }
}

/// Wrap a closure as a shareable middleware
///
/// ```rust
/// use routekit::middleware::{from_fn, Next};
/// use routekit::dispatcher::HandlerRequest;
///
/// let stamp = from_fn(|req: &mut HandlerRequest, next: Next<'_>| {
///     let mut res = next.run(req)?;
///     res.set_header("x-served-by", "routekit".to_string());
///     Ok(res)
/// });
/// # let _ = stamp;
/// ```
pub fn from_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(&mut HandlerRequest, Next<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The remainder of a middleware chain
///
/// Consumed by [`Next::run`], so a continuation runs at most once.
pub struct Next<'a> {
    inner: Box<dyn FnOnce(&mut HandlerRequest) -> HandlerResult + 'a>,
}

impl<'a> Next<'a> {
    /// Wrap the innermost stage of a chain
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut HandlerRequest) -> HandlerResult + 'a,
    {
        Self { inner: Box::new(f) }
    }

    /// Invoke the rest of the chain
    pub fn run(self, req: &mut HandlerRequest) -> HandlerResult {
        (self.inner)(req)
    }
}

/// Fold `middleware` around `endpoint`, first entry outermost
///
/// Built from the last middleware to the first: the innermost stage is
/// `endpoint`, and each middleware receives the stage built so far as its
/// continuation.
pub fn compose<'a>(middleware: &'a [Arc<dyn Middleware>], endpoint: Next<'a>) -> Next<'a> {
    middleware.iter().rev().fold(endpoint, |next, mw| {
        Next::new(move |req: &mut HandlerRequest| mw.handle(req, next))
    })
}
