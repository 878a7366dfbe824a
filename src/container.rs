//! Container — identifier → instance resolution for handlers, middleware,
//! route handlers and listeners.
//!
//! Buses and the router never look anything up globally; they are handed a
//! [`Resolver`] at construction. [`Container`] is the in-process resolver.
//!
//! ## Example
//!
//! ```ignore
//! let container = Container::new()
//!     .handler::<Ping, _>("app.ping_handler", || PingHandler)
//!     .handler_fn("app.echo_handler", |dto: Echo| Ok(Message::text(dto.text)))
//!     .middleware("auth", RequireHeader::new("authorization"))
//!     .listener("session.redirect", SessionRedirect::new("sid", "/login"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::dto::Dto;
use crate::error::{HandlerError, ResolveError};
use crate::event::Listener;
use crate::handler::{self, DynHandler, Handler};
use crate::http::{Request, Response};
use crate::message::Message;
use crate::routing::{Middleware, RequestHandler};

/// Resolve an identifier to a shared instance.
pub trait Resolver<T: ?Sized>: Send + Sync {
    fn resolve(&self, id: &str) -> Result<Arc<T>, ResolveError>;
}

type Factory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

fn shared<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Factory<T> {
    Box::new(move || instance.clone())
}

/// In-process resolver backed by factory closures.
///
/// Handler factories run on each `resolve`; buses cache the result, so in
/// practice a handler is built once per bus. Middleware, route handlers and
/// listeners are registered as shared instances.
#[derive(Default)]
pub struct Container {
    handlers: HashMap<String, Factory<dyn DynHandler>>,
    middleware: HashMap<String, Factory<dyn Middleware>>,
    endpoints: HashMap<String, Factory<dyn RequestHandler>>,
    listeners: HashMap<String, Factory<dyn Listener>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler factory for DTO type `D`.
    pub fn handler<D, H>(mut self, id: &str, factory: impl Fn() -> H + Send + Sync + 'static) -> Self
    where
        D: Dto,
        H: Handler<D> + 'static,
    {
        self.handlers.insert(
            id.to_string(),
            Box::new(move || handler::bind::<D, H>(factory())),
        );
        self
    }

    /// Register a closure handler.
    pub fn handler_fn<D, F>(mut self, id: &str, f: F) -> Self
    where
        D: Dto,
        F: Fn(D) -> Result<Message, HandlerError> + Send + Sync + 'static,
    {
        let erased = handler::from_fn(f);
        self.handlers.insert(id.to_string(), shared(erased));
        self
    }

    pub fn middleware(mut self, id: &str, middleware: impl Middleware + 'static) -> Self {
        let instance: Arc<dyn Middleware> = Arc::new(middleware);
        self.middleware.insert(id.to_string(), shared(instance));
        self
    }

    /// Register a route handler.
    pub fn endpoint(mut self, id: &str, endpoint: impl RequestHandler + 'static) -> Self {
        let instance: Arc<dyn RequestHandler> = Arc::new(endpoint);
        self.endpoints.insert(id.to_string(), shared(instance));
        self
    }

    /// Register a closure route handler.
    pub fn endpoint_fn<F>(self, id: &str, f: F) -> Self
    where
        F: Fn(Request) -> Result<Response, HandlerError> + Send + Sync + 'static,
    {
        self.endpoint(id, f)
    }

    pub fn listener(mut self, id: &str, listener: impl Listener + 'static) -> Self {
        let instance: Arc<dyn Listener> = Arc::new(listener);
        self.listeners.insert(id.to_string(), shared(instance));
        self
    }

    pub fn has_endpoint(&self, id: &str) -> bool {
        self.endpoints.contains_key(id)
    }
}

fn lookup<T: ?Sized>(
    table: &HashMap<String, Factory<T>>,
    kind: &'static str,
    id: &str,
) -> Result<Arc<T>, ResolveError> {
    table
        .get(id)
        .map(|factory| factory())
        .ok_or_else(|| ResolveError::Unregistered {
            kind,
            id: id.to_string(),
        })
}

impl Resolver<dyn DynHandler> for Container {
    fn resolve(&self, id: &str) -> Result<Arc<dyn DynHandler>, ResolveError> {
        lookup(&self.handlers, "handler", id)
    }
}

impl Resolver<dyn Middleware> for Container {
    fn resolve(&self, id: &str) -> Result<Arc<dyn Middleware>, ResolveError> {
        lookup(&self.middleware, "middleware", id)
    }
}

impl Resolver<dyn RequestHandler> for Container {
    fn resolve(&self, id: &str) -> Result<Arc<dyn RequestHandler>, ResolveError> {
        lookup(&self.endpoints, "route handler", id)
    }
}

impl Resolver<dyn Listener> for Container {
    fn resolve(&self, id: &str) -> Result<Arc<dyn Listener>, ResolveError> {
        lookup(&self.listeners, "listener", id)
    }
}
