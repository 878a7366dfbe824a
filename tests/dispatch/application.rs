//! Application kernel wired from the JSON config in `support`.

use modulith::{Payload, Request};
use serde_json::{json, Value};

use crate::support::{self, application};

fn body(response: &modulith::Response) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn run_is_uniform_across_buses() {
    let (app, store) = application();

    let created = app
        .run("create-user", support::payload(json!({ "id": "u1", "name": "Ada" })))
        .unwrap();
    assert_eq!(created.render(), r#"{"created":"u1"}"#);
    assert_eq!(store.len(), 1);

    let listed = app.run("list-users", Payload::new()).unwrap();
    assert_eq!(listed.render(), r#"["u1"]"#);

    let missing = app.run("nonexistent", Payload::new()).unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(&missing.render()).unwrap(),
        json!({ "error": "Command not found", "handler": false })
    );
}

#[test]
fn http_style_flow() {
    let (app, _) = application();

    let created = app.handle(
        Request::new("POST", "/users").with_json(&json!({ "id": "u1", "name": "Ada", "role": "admin" })),
    );
    assert_eq!(created.status(), 200);
    app.handle(Request::new("POST", "/users").with_json(&json!({ "id": "u2", "name": "Bob" })));

    let admins = app.handle(Request::new("GET", "/users?role=admin"));
    assert_eq!(body(&admins), json!(["u1"]));
    let everyone = app.handle(Request::new("GET", "/users"));
    assert_eq!(body(&everyone), json!(["u1", "u2"]));

    let denied = app.handle(Request::new("GET", "/users/u1"));
    assert_eq!(denied.status(), 401);
    let user = app.handle(Request::new("GET", "/users/u1").with_header("authorization", "t"));
    assert_eq!(body(&user)["name"], "Ada");
}

#[test]
fn encoded_query_and_path_reach_dtos_decoded() {
    let (app, _) = application();

    app.handle(
        Request::new("POST", "/users")
            .with_json(&json!({ "id": "ada lovelace", "name": "Ada", "role": "lead dev" })),
    );

    let leads = app.handle(Request::new("GET", "/users?role=lead+dev"));
    assert_eq!(body(&leads), json!(["ada lovelace"]));
    let leads = app.handle(Request::new("GET", "/users?role=lead%20dev"));
    assert_eq!(body(&leads), json!(["ada lovelace"]));

    let user = app.handle(
        Request::new("GET", "/users/ada%20lovelace").with_header("authorization", "t"),
    );
    assert_eq!(user.status(), 200);
    assert_eq!(body(&user)["id"], "ada lovelace");
}

#[test]
fn boundary_renders_errors() {
    let (app, _) = application();

    let invalid = app.handle(Request::new("POST", "/users").with_json(&json!({ "id": "u1" })));
    assert_eq!(invalid.status(), 400);

    let missing = app.handle(Request::new("GET", "/users/ghost").with_header("authorization", "t"));
    assert_eq!(missing.status(), 404);

    let malformed = app.handle(Request::new("POST", "/users").with_body("[1, 2]"));
    assert_eq!(malformed.status(), 400);

    app.handle(Request::new("POST", "/users").with_json(&json!({ "id": "u1", "name": "Ada" })));
    let duplicate =
        app.handle(Request::new("POST", "/users").with_json(&json!({ "id": "u1", "name": "Ada" })));
    assert_eq!(duplicate.status(), 422);
    assert!(body(&duplicate)["error"].as_str().unwrap().contains("create-user"));
}

#[test]
fn plain_endpoints_and_not_found() {
    let (app, _) = application();

    let about = app.handle(Request::new("GET", "/about"));
    assert_eq!(about.header("content-type"), Some("text/html; charset=utf-8"));

    let ping = app.handle(Request::new("GET", "/ping"));
    assert_eq!(ping.body_str(), Some("pong"));

    let lost = app.handle(Request::new("GET", "/nowhere"));
    assert_eq!(lost.status(), 404);
    let redirected = app.handle(Request::new("GET", "/nowhere").with_header("cookie", "sid=1"));
    assert_eq!(redirected.status(), 302);
}

#[test]
fn definitions_reflect_config() {
    let (app, _) = application();

    let queries: Vec<String> = app
        .queries()
        .handlers_definition(false)
        .into_iter()
        .map(|d| d.dto)
        .collect();
    assert_eq!(queries, vec!["users.get", "users.list", "app.ping"]);

    let commands = app.commands().handlers_definition(true);
    assert_eq!(commands[0].aliases, Some(vec!["create-user".to_string()]));

    assert_eq!(app.events().listeners_definition()[0].listeners, vec!["session.redirect"]);
}
