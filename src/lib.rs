//! modulith — dispatch core for modular-monolith applications.
//!
//! Typed command and query buses bind each DTO type to exactly one handler.
//! An event bus fans events out to ordered listeners. A router maps
//! HTTP-style requests through a middleware pipeline to route handlers and
//! raises `core.routeNotFound` when nothing matches.
//!
//! ```ignore
//! use modulith::{Container, Dto, Message, QueryBus};
//!
//! let container = Arc::new(Container::new().handler_fn("ping", |_: Ping| Ok(Message::text("pong"))));
//! let mut bus = QueryBus::new(container);
//! bus.register::<Ping>("ping", &["ping"])?;
//!
//! let message = bus.execute(Ping {})?;
//! ```

pub mod app;
pub mod bus;
pub mod config;
pub mod container;
pub mod criteria;
pub mod dto;
pub mod error;
pub mod event;
pub mod factory;
pub mod handler;
pub mod http;
pub mod message;
pub mod routing;
pub mod telemetry;
pub mod template;

pub use app::Application;
pub use bus::{Bus, CommandBus, HandlerDefinition, QueryBus, RegistrationPolicy};
pub use config::{AppConfig, ConfigError, LogConfig};
pub use container::{Container, Resolver};
pub use criteria::{AnyCriteria, Criteria};
pub use dto::{Dto, DtoCatalog, DtoDescriptor, DynDto, Payload};
pub use error::{DispatchError, DispatchResult, HandlerError, ResolveError, ValidationError};
pub use event::{Event, EventBus, Listener, ROUTE_NOT_FOUND};
pub use factory::{DtoFactory, NotFound, Resolved};
pub use handler::{DynHandler, Handler};
pub use http::{Request, Response};
pub use message::{Message, MessageBody};
pub use routing::{Middleware, Next, RequestHandler, RouteDefinition, Router};
pub use template::{TemplateEngine, TemplateError};
