//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use modulith::http;
use serde_json::{json, Value};

use crate::support::application;

/// Bind to port 0 and return the actual address.
async fn start_server() -> String {
    let (app, _) = application();
    let router = http::router(Arc::new(app));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let base = start_server().await;

    let resp = client().get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["commands"], json!(["users.create"]));
    assert_eq!(body["queries"], json!(["users.get", "users.list", "app.ping"]));
}

#[tokio::test]
async fn create_then_fetch() {
    let base = start_server().await;
    let client = client();

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({ "id": "u1", "name": "Ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "created": "u1" }));

    let resp = client
        .get(format!("{base}/users/u1"))
        .header("Authorization", "Bearer t")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Ada");
}

#[tokio::test]
async fn plain_text_and_errors() {
    let base = start_server().await;
    let client = client();

    let resp = client.get(format!("{base}/ping")).send().await.unwrap();
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(resp.text().await.unwrap(), "pong");

    let resp = client.get(format!("{base}/users/u1")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn unknown_route_is_404_or_session_redirect() {
    let base = start_server().await;
    let client = client();

    let resp = client.get(format!("{base}/nowhere")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Not Found" }));

    let resp = client
        .get(format!("{base}/nowhere"))
        .header("Cookie", "sid=abc")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"].to_str().unwrap(), "/dashboard");
}
