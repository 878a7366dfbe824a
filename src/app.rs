//! Application kernel — wires buses, events and the router from config.
//!
//! ## Example
//!
//! ```ignore
//! let container = Arc::new(
//!     Container::new()
//!         .handler_fn("users.show_handler", |dto: ShowUser| Ok(Message::text(dto.id)))
//!         .listener("session.redirect", SessionRedirect::new("sid", "/dashboard")),
//! );
//! let catalog = modulith::dto_catalog![ShowUser];
//! let config = AppConfig::from_path("app.json")?;
//!
//! let app = Application::from_config(&config, container, &catalog)?;
//!
//! // CLI-style
//! let message = app.run("show-user", payload)?;
//! // HTTP-style
//! let response = app.handle(Request::new("GET", "/users/42"));
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::bus::{Bus, BusKind, CommandBus, QueryBus};
use crate::config::{AppConfig, HandlerRegistration};
use crate::container::{Container, Resolver};
use crate::dto::{DtoCatalog, Payload};
use crate::error::{DispatchError, DispatchResult};
use crate::event::{EventBus, Listener};
use crate::factory::{DtoFactory, NotFound, Resolved};
use crate::http::{Request, Response};
use crate::message::Message;
use crate::routing::{BusEndpoints, Router};

/// The assembled dispatch core of one application.
pub struct Application {
    commands: Arc<CommandBus>,
    queries: Arc<QueryBus>,
    events: Arc<EventBus>,
    router: Router,
}

impl Application {
    /// Build everything `config` describes.
    ///
    /// DTO type names are looked up in `catalog`; handler, middleware,
    /// listener and route handler ids in `container`. Route handler ids that
    /// name a bus identifier are served by that bus.
    pub fn from_config(
        config: &AppConfig,
        container: Arc<Container>,
        catalog: &DtoCatalog,
    ) -> DispatchResult<Self> {
        let mut commands = CommandBus::new(container.clone());
        register_all(&mut commands, &config.commands, catalog)?;
        let mut queries = QueryBus::new(container.clone());
        register_all(&mut queries, &config.queries, catalog)?;

        let mut events = EventBus::new();
        for registration in &config.listeners {
            let listener =
                Resolver::<dyn Listener>::resolve(&*container, &registration.listener)?;
            events.subscribe(&registration.event, &registration.listener, listener);
        }

        let commands = Arc::new(commands);
        let queries = Arc::new(queries);
        let events = Arc::new(events);

        let endpoints = Arc::new(BusEndpoints::new(
            commands.clone(),
            queries.clone(),
            container.clone(),
        ));
        let router = Router::new(&config.routes, container, endpoints, events.clone())?;

        info!(
            commands = commands.len(),
            queries = queries.len(),
            routes = router.table().len(),
            "application ready"
        );

        Ok(Self {
            commands,
            queries,
            events,
            router,
        })
    }

    /// Build and execute `identifier` with `payload`, on the command bus
    /// first, then the query bus.
    ///
    /// An identifier neither bus knows yields the not-found payload as a JSON
    /// message rather than an error.
    pub fn run(&self, identifier: &str, payload: Payload) -> DispatchResult<Message> {
        if self.commands.has_handler(identifier) {
            return execute(&self.commands, identifier, payload);
        }
        if self.queries.has_handler(identifier) {
            return execute(&self.queries, identifier, payload);
        }

        debug!(identifier, "no bus knows identifier");
        Ok(Message::json(Value::Object(
            NotFound::new(identifier).to_payload(),
        )))
    }

    /// Route an HTTP-style request. Always produces a response.
    pub fn handle(&self, request: Request) -> Response {
        self.router.handle(request)
    }

    pub fn commands(&self) -> &Arc<CommandBus> {
        &self.commands
    }

    pub fn queries(&self) -> &Arc<QueryBus> {
        &self.queries
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

fn register_all<K: BusKind>(
    bus: &mut Bus<K>,
    registrations: &[HandlerRegistration],
    catalog: &DtoCatalog,
) -> DispatchResult<()> {
    for registration in registrations {
        let descriptor = catalog.get(&registration.dto).ok_or_else(|| {
            DispatchError::Config(format!(
                "unknown DTO type `{}` in {} registrations",
                registration.dto,
                K::NAME
            ))
        })?;
        let aliases: Vec<&str> = registration.aliases.iter().map(String::as_str).collect();
        bus.register_descriptor(descriptor, &registration.handler, &aliases)?;
    }
    Ok(())
}

fn execute<K: BusKind>(bus: &Bus<K>, identifier: &str, payload: Payload) -> DispatchResult<Message> {
    match DtoFactory::from_payload(bus, identifier, payload)? {
        Resolved::Found(dto) => bus.execute_boxed(dto),
        Resolved::NotFound(not_found) => Ok(Message::json(Value::Object(not_found.to_payload()))),
    }
}
