//! Router — match a request, run its middleware pipeline, fall back to the
//! route-not-found event.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::middleware::{Middleware, Pipeline, RequestHandler};
use super::route::{RouteDefinition, RouteTable};
use crate::container::Resolver;
use crate::error::{DispatchError, DispatchResult};
use crate::event::{Event, EventBus, ROUTE_NOT_FOUND};
use crate::http::{Request, Response};

/// Name the router uses as `fired_by` on the events it raises.
pub const ROUTER_SOURCE: &str = "router";

/// HTTP-style router over an immutable route table.
///
/// Route handlers and middleware are referenced by id and resolved on each
/// matching request, so the table itself holds no instances.
///
/// ## Example
///
/// ```ignore
/// let router = Router::new(
///     &[RouteDefinition::new("GET", "/users/{id}", "users.show").with_middleware("auth")],
///     container.clone(),
///     container.clone(),
///     Arc::new(events),
/// )?;
///
/// let response = router.handle(Request::new("GET", "/users/42"));
/// ```
pub struct Router {
    table: RouteTable,
    middleware: Arc<dyn Resolver<dyn Middleware>>,
    endpoints: Arc<dyn Resolver<dyn RequestHandler>>,
    events: Arc<EventBus>,
}

impl Router {
    pub fn new<M, E>(
        routes: &[RouteDefinition],
        middleware: Arc<M>,
        endpoints: Arc<E>,
        events: Arc<EventBus>,
    ) -> DispatchResult<Self>
    where
        M: Resolver<dyn Middleware> + 'static,
        E: Resolver<dyn RequestHandler> + 'static,
    {
        let table = RouteTable::new(routes)?;
        debug!(routes = table.len(), "route table built");
        Ok(Self {
            table,
            middleware,
            endpoints,
            events,
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Route `request` to exactly one outcome.
    ///
    /// Errors from the route handler or its middleware come back as
    /// [`DispatchError::HandlerExecution`]. Use [`handle`](Self::handle) at a
    /// boundary that must always produce a response.
    pub fn dispatch(&self, mut request: Request) -> DispatchResult<Response> {
        let Some(found) = self.table.find(request.method(), request.path()) else {
            return self.route_not_found(&request);
        };
        let route = found.route;
        debug!(
            method = request.method(),
            path = request.path(),
            route = route.pattern().as_str(),
            handler = route.handler(),
            "route matched"
        );

        let middleware = route
            .middleware()
            .iter()
            .map(|id| self.middleware.resolve(id))
            .collect::<Result<Vec<_>, _>>()?;
        let endpoint = self.endpoints.resolve(route.handler())?;

        request.set_params(found.params);
        Pipeline::new(middleware, endpoint)
            .run(request)
            .map_err(|source| DispatchError::HandlerExecution {
                handler: route.handler().to_string(),
                source,
            })
    }

    /// [`dispatch`](Self::dispatch), rendering any error as a response.
    pub fn handle(&self, request: Request) -> Response {
        let method = request.method().to_string();
        let path = request.path().to_string();

        match self.dispatch(request) {
            Ok(response) => response,
            Err(err) => {
                let status = err.status_code();
                if status >= 500 {
                    error!(%method, %path, status, error = %err, "request failed");
                } else {
                    warn!(%method, %path, status, error = %err, "request rejected");
                }
                Response::error(status, &err.to_string())
            }
        }
    }

    fn route_not_found(&self, request: &Request) -> DispatchResult<Response> {
        debug!(method = request.method(), path = request.path(), "no route matched");

        let headers: Map<String, Value> = request
            .headers()
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        let event = Event::new(ROUTE_NOT_FOUND, ROUTER_SOURCE)
            .with("method", request.method())
            .with("path", request.path())
            .with("headers", Value::Object(headers));

        let mut event = self.events.dispatch(event)?;
        Ok(event.take_response().unwrap_or_else(Response::not_found))
    }
}
