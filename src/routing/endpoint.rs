//! Bus endpoints — route handlers that execute a command or query.
//!
//! A route whose handler id names a DTO type or alias bound on one of the
//! buses is served by a [`BusEndpoint`]: the request's merged payload (query
//! string, JSON body, path params) is turned into the DTO through the
//! [`DtoFactory`] and executed.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::middleware::RequestHandler;
use crate::bus::{Bus, BusKind, CommandBus, QueryBus};
use crate::container::Resolver;
use crate::error::{DispatchError, HandlerError, ResolveError};
use crate::factory::{DtoFactory, Resolved};
use crate::http::{Request, Response};

/// Executes one bus identifier per request.
pub struct BusEndpoint<K: BusKind> {
    bus: Arc<Bus<K>>,
    identifier: String,
}

impl<K: BusKind> BusEndpoint<K> {
    pub fn new(bus: Arc<Bus<K>>, identifier: impl Into<String>) -> Self {
        Self {
            bus,
            identifier: identifier.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl<K: BusKind> RequestHandler for BusEndpoint<K> {
    fn handle(&self, request: Request) -> Result<Response, HandlerError> {
        let payload = request.payload()?;

        let dto = match DtoFactory::from_payload(&*self.bus, &self.identifier, payload) {
            Ok(Resolved::Found(dto)) => dto,
            Ok(Resolved::NotFound(not_found)) => {
                return Ok(Response::json(404, &Value::Object(not_found.to_payload())));
            }
            Err(DispatchError::Validation(err)) => {
                return Ok(Response::error(400, &err.to_string()));
            }
            Err(other) => return Err(HandlerError::Other(Box::new(other))),
        };

        match self.bus.execute_boxed(dto) {
            Ok(message) => Ok(Response::from(message)),
            Err(DispatchError::HandlerExecution { source, .. }) => Err(source),
            Err(other) => Err(HandlerError::Other(Box::new(other))),
        }
    }
}

/// Route handler resolver that serves bus identifiers first.
///
/// Lookup order: command bus, query bus, then `fallback`.
pub struct BusEndpoints {
    commands: Arc<CommandBus>,
    queries: Arc<QueryBus>,
    fallback: Arc<dyn Resolver<dyn RequestHandler>>,
}

impl BusEndpoints {
    pub fn new<R>(commands: Arc<CommandBus>, queries: Arc<QueryBus>, fallback: Arc<R>) -> Self
    where
        R: Resolver<dyn RequestHandler> + 'static,
    {
        Self {
            commands,
            queries,
            fallback,
        }
    }
}

impl Resolver<dyn RequestHandler> for BusEndpoints {
    fn resolve(&self, id: &str) -> Result<Arc<dyn RequestHandler>, ResolveError> {
        if self.commands.has_handler(id) {
            debug!(id, "route served by command bus");
            return Ok(Arc::new(BusEndpoint::new(self.commands.clone(), id)));
        }
        if self.queries.has_handler(id) {
            debug!(id, "route served by query bus");
            return Ok(Arc::new(BusEndpoint::new(self.queries.clone(), id)));
        }
        self.fallback.resolve(id)
    }
}
