//! Routing: route table, middleware pipeline, router and stock route
//! handlers, middleware and listeners.

mod endpoint;
mod listeners;
mod logging;
mod middleware;
mod route;
mod router;

pub use endpoint::{BusEndpoint, BusEndpoints};
pub use listeners::SessionRedirect;
pub use logging::RequestLogging;
pub use middleware::{from_fn, Middleware, Next, Pipeline, RequestHandler, RequireHeader};
pub use route::{PathPattern, Route, RouteDefinition, RouteMatch, RouteTable, ANY_METHOD};
pub use router::{Router, ROUTER_SOURCE};
