//! Request handlers and the middleware pipeline.
//!
//! ```text
//!  request ──▶ M1 ──▶ M2 ──▶ ... ──▶ handler
//!              │       │
//!              │       └─ returns own Response: handler never runs
//!              └─ mutates request, then next.run(request)
//! ```

use std::sync::Arc;

use crate::error::HandlerError;
use crate::http::{Request, Response};

/// Terminal request processor of a route.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: Request) -> Result<Response, HandlerError>;
}

impl<F> RequestHandler for F
where
    F: Fn(Request) -> Result<Response, HandlerError> + Send + Sync,
{
    fn handle(&self, request: Request) -> Result<Response, HandlerError> {
        self(request)
    }
}

/// One link of the pipeline.
///
/// Call `next.run(request)` to delegate; return a response without calling
/// it to short-circuit. `Next` is consumed by `run`, so a link delegates at
/// most once.
pub trait Middleware: Send + Sync {
    fn process(&self, request: Request, next: Next<'_>) -> Result<Response, HandlerError>;
}

/// The rest of the pipeline after the current link.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn RequestHandler,
}

impl<'a> Next<'a> {
    pub fn run(self, request: Request) -> Result<Response, HandlerError> {
        match self.chain.split_first() {
            Some((head, rest)) => head.process(
                request,
                Next {
                    chain: rest,
                    terminal: self.terminal,
                },
            ),
            None => self.terminal.handle(request),
        }
    }
}

/// Ordered middleware in front of a request handler.
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
    terminal: Arc<dyn RequestHandler>,
}

impl Pipeline {
    pub fn new(middleware: Vec<Arc<dyn Middleware>>, terminal: Arc<dyn RequestHandler>) -> Self {
        Self {
            middleware,
            terminal,
        }
    }

    pub fn run(&self, request: Request) -> Result<Response, HandlerError> {
        Next {
            chain: &self.middleware,
            terminal: self.terminal.as_ref(),
        }
        .run(request)
    }
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> Result<Response, HandlerError> + Send + Sync,
{
    fn process(&self, request: Request, next: Next<'_>) -> Result<Response, HandlerError> {
        (self.0)(request, next)
    }
}

/// Middleware from a closure.
///
/// ```ignore
/// let auth = routing::from_fn(|request, next| match request.header("authorization") {
///     Some(_) => next.run(request),
///     None => Ok(Response::error(401, "unauthorized")),
/// });
/// ```
pub fn from_fn<F>(f: F) -> impl Middleware
where
    F: for<'a> Fn(Request, Next<'a>) -> Result<Response, HandlerError> + Send + Sync + 'static,
{
    FnMiddleware(f)
}

/// Rejects requests missing a header with 401.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    header: String,
}

impl RequireHeader {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_ascii_lowercase(),
        }
    }
}

impl Middleware for RequireHeader {
    fn process(&self, request: Request, next: Next<'_>) -> Result<Response, HandlerError> {
        if request.header(&self.header).is_none() {
            return Ok(Response::error(401, &format!("missing `{}` header", self.header)));
        }
        next.run(request)
    }
}
