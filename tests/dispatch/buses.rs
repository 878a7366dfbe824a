//! Command and query buses driven through the factory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use modulith::{
    CommandBus, Container, DispatchError, DtoFactory, HandlerError, Message, QueryBus,
    RegistrationPolicy, Resolved, ValidationError,
};
use serde_json::{json, Value};

use crate::support::{self, CreateUser, GetUser, Ping, UserStore};

fn buses(store: Arc<UserStore>) -> (CommandBus, QueryBus) {
    let container = Arc::new(support::container(store));

    let mut commands = CommandBus::new(container.clone());
    commands
        .register::<CreateUser>("users.create_handler", &["create-user"])
        .unwrap();

    let mut queries = QueryBus::new(container);
    queries.register::<GetUser>("users.get_handler", &["get-user"]).unwrap();
    queries.register::<Ping>("app.ping_handler", &["ping"]).unwrap();

    (commands, queries)
}

#[test]
fn command_then_query_through_aliases() {
    let store = Arc::new(UserStore::default());
    let (commands, queries) = buses(store.clone());

    let create = DtoFactory::from_payload(
        &commands,
        "create-user",
        support::payload(json!({ "id": "u1", "name": "Ada", "role": "admin" })),
    )
    .unwrap()
    .into_dto()
    .unwrap();
    let created = commands.execute_boxed(create).unwrap();
    assert_eq!(created.render(), r#"{"created":"u1"}"#);
    assert_eq!(store.len(), 1);

    let user = queries.execute(GetUser { id: "u1".into() }).unwrap();
    let user: Value = serde_json::from_str(&user.render()).unwrap();
    assert_eq!(user["name"], "Ada");
}

#[test]
fn ping_alias_maps_to_type() {
    let (_, queries) = buses(Arc::new(UserStore::default()));
    assert_eq!(queries.dto_type_for_alias("ping").unwrap(), "app.ping");
    assert!(matches!(
        queries.dto_type_for_alias("unknown"),
        Err(DispatchError::UnknownAlias(_))
    ));
    assert!(queries.has_handler("app.ping"));
    assert!(queries.has_handler("ping"));
}

#[test]
fn commands_and_queries_are_separate_registries() {
    let (commands, queries) = buses(Arc::new(UserStore::default()));
    assert!(commands.has_handler("create-user"));
    assert!(!queries.has_handler("create-user"));
    assert!(!commands.has_handler("ping"));

    let resolved = DtoFactory::from_payload(&queries, "create-user", support::payload(json!({})))
        .unwrap();
    assert!(matches!(resolved, Resolved::NotFound(_)));
}

#[test]
fn validation_rejects_before_any_handler_runs() {
    let store = Arc::new(UserStore::default());
    let (commands, _) = buses(store.clone());

    let err = DtoFactory::from_payload(
        &commands,
        "users.create",
        support::payload(json!({ "id": "u1", "name": "  " })),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Validation(ValidationError::InvalidField { ref field, .. }) if field == "name"
    ));
    assert_eq!(store.len(), 0);
}

#[test]
fn handler_failure_keeps_cause() {
    let (commands, _) = buses(Arc::new(UserStore::default()));
    let create = || CreateUser {
        id: "dup".into(),
        name: "Dup".into(),
        role: None,
    };

    commands.execute(create()).unwrap();
    let err = commands.execute(create()).unwrap_err();
    match err {
        DispatchError::HandlerExecution { handler, source } => {
            assert_eq!(handler, "users.create_handler");
            assert!(matches!(source, HandlerError::Rejected(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn payload_round_trip_rebuilds_equivalent_dto() {
    let (commands, _) = buses(Arc::new(UserStore::default()));
    let data = support::payload(json!({ "id": "u9", "name": "Grace", "role": null }));

    let first = DtoFactory::from_payload(&commands, "users.create", data.clone()).unwrap();
    let rebuilt = DtoFactory::from_payload(&commands, "users.create", first.to_payload()).unwrap();
    assert_eq!(rebuilt.to_payload(), data);
}

// ============================================================================
// Duplicate registration contract
// ============================================================================

fn counting_container(calls: Arc<AtomicUsize>, tag: &'static str) -> Container {
    Container::new().handler_fn(tag, move |_: Ping| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Message::text(tag))
    })
}

#[test]
fn reject_policy_keeps_first_binding() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut bus = QueryBus::new(Arc::new(counting_container(calls.clone(), "first")));
    bus.register::<Ping>("first", &["ping"]).unwrap();

    assert!(matches!(
        bus.register::<Ping>("second", &["p2"]),
        Err(DispatchError::DuplicateRegistration(_))
    ));
    assert!(!bus.has_handler("p2"));
    assert_eq!(bus.execute(Ping {}).unwrap().render(), "first");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn overwrite_policy_uses_last_binding() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = counting_container(calls.clone(), "first")
        .handler_fn("second", |_: Ping| Ok(Message::text("second")));
    let mut bus =
        QueryBus::new(Arc::new(container)).with_policy(RegistrationPolicy::Overwrite);

    bus.register::<Ping>("first", &["ping"]).unwrap();
    bus.register::<Ping>("second", &["p2"]).unwrap();

    assert_eq!(bus.len(), 1);
    assert!(!bus.has_handler("ping"));
    assert_eq!(bus.execute(Ping {}).unwrap().render(), "second");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
