//! Test domain: a small users module with commands, queries and a store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use modulith::criteria::{Criteria, FieldCriteria, QueryRequest};
use modulith::dto::require_fields;
use modulith::{
    AnyCriteria, AppConfig, Application, Container, Dto, Handler, HandlerError, Message, Payload,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// DTOs
// ============================================================================

/// Command: create a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Dto for CreateUser {
    const TYPE_NAME: &'static str = "users.create";

    fn validate(data: &Payload) -> Result<(), ValidationError> {
        require_fields(data, &["id", "name"])?;
        match data["name"].as_str() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::invalid("name", "must be a non-empty string")),
        }
    }
}

/// Query: one user by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetUser {
    pub id: String,
}

impl Dto for GetUser {
    const TYPE_NAME: &'static str = "users.get";

    fn validate(data: &Payload) -> Result<(), ValidationError> {
        require_fields(data, &["id"])
    }
}

/// Query: every user, optionally filtered by role.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsers {
    #[serde(default)]
    pub role: Option<String>,
}

impl Dto for ListUsers {
    const TYPE_NAME: &'static str = "users.list";
}

/// Query: liveness probe.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ping {}

impl Dto for Ping {
    const TYPE_NAME: &'static str = "app.ping";
}

// ============================================================================
// Store and handlers
// ============================================================================

#[derive(Default)]
pub struct UserStore {
    users: Mutex<BTreeMap<String, serde_json::Map<String, Value>>>,
}

impl UserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

pub struct CreateUserHandler(pub Arc<UserStore>);

impl Handler<CreateUser> for CreateUserHandler {
    fn handle(&self, dto: CreateUser) -> Result<Message, HandlerError> {
        let mut users = self.0.users.lock().unwrap();
        if users.contains_key(&dto.id) {
            return Err(HandlerError::Rejected(format!("user {} exists", dto.id)));
        }
        let record = dto.to_payload();
        users.insert(dto.id.clone(), record);
        Ok(Message::json(json!({ "created": dto.id })))
    }
}

pub struct GetUserHandler(pub Arc<UserStore>);

impl Handler<GetUser> for GetUserHandler {
    fn handle(&self, dto: GetUser) -> Result<Message, HandlerError> {
        let users = self.0.users.lock().unwrap();
        users
            .get(&dto.id)
            .map(|user| Message::json(Value::Object(user.clone())))
            .ok_or(HandlerError::NotFound(dto.id))
    }
}

pub struct ListUsersHandler(pub Arc<UserStore>);

impl Handler<ListUsers> for ListUsersHandler {
    fn handle(&self, dto: ListUsers) -> Result<Message, HandlerError> {
        let query = match dto.role {
            Some(role) => FieldCriteria::new("role", role).apply(QueryRequest::new()),
            None => AnyCriteria.apply(QueryRequest::new()),
        };
        let users = self.0.users.lock().unwrap();
        let ids: Vec<&String> = users
            .iter()
            .filter(|(_, user)| query.matches(user))
            .map(|(id, _)| id)
            .collect();
        Ok(Message::json(json!(ids)))
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub const CONFIG: &str = r#"{
    "log": { "level": "debug" },
    "routes": [
        { "method": "GET", "path": "/ping", "handler": "ping" },
        { "method": "POST", "path": "/users", "handler": "create-user", "middleware": ["log"] },
        { "method": "GET", "path": "/users", "handler": "list-users" },
        { "method": "GET", "path": "/users/{id}", "handler": "get-user", "middleware": ["auth"] },
        { "method": "GET", "path": "/about", "handler": "about" }
    ],
    "commands": [
        { "dto": "users.create", "handler": "users.create_handler", "aliases": ["create-user"] }
    ],
    "queries": [
        { "dto": "users.get", "handler": "users.get_handler", "aliases": ["get-user"] },
        { "dto": "users.list", "handler": "users.list_handler", "aliases": ["list-users"] },
        { "dto": "app.ping", "handler": "app.ping_handler", "aliases": ["ping"] }
    ],
    "listeners": [
        { "event": "core.routeNotFound", "listener": "session.redirect" }
    ]
}"#;

pub fn container(store: Arc<UserStore>) -> Container {
    let (create, get, list) = (store.clone(), store.clone(), store);
    Container::new()
        .handler::<CreateUser, _>("users.create_handler", move || CreateUserHandler(create.clone()))
        .handler::<GetUser, _>("users.get_handler", move || GetUserHandler(get.clone()))
        .handler::<ListUsers, _>("users.list_handler", move || ListUsersHandler(list.clone()))
        .handler_fn("app.ping_handler", |_: Ping| Ok(Message::text("pong")))
        .endpoint_fn("about", |_| Ok(modulith::Response::html(200, "<h1>about</h1>")))
        .middleware("log", modulith::routing::RequestLogging)
        .middleware("auth", modulith::routing::RequireHeader::new("authorization"))
        .listener(
            "session.redirect",
            modulith::routing::SessionRedirect::new("sid", "/dashboard"),
        )
}

/// A fully wired application plus its backing store.
pub fn application() -> (Application, Arc<UserStore>) {
    let store = Arc::new(UserStore::default());
    let config = AppConfig::from_json(CONFIG).unwrap();
    let catalog = modulith::dto_catalog![CreateUser, GetUser, ListUsers, Ping];
    let app = Application::from_config(&config, Arc::new(container(store.clone())), &catalog)
        .unwrap();
    (app, store)
}

pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}
