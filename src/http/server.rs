//! axum transport — forwards every request to the application router.
//!
//! Requires the `http` feature.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true, "commands": [...], "queries": [...] }`.
//! - anything else: converted to a [`Request`] and passed to
//!   [`Application::handle`]; the resulting [`Response`] is sent back as is.
//!
//! ## Example
//!
//! ```ignore
//! let app = Arc::new(Application::from_config(&config, container, &catalog)?);
//!
//! // Compose with other axum routes
//! let router = modulith::http::router(app.clone());
//!
//! // Or serve directly
//! modulith::http::serve(app, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use serde_json::json;
use tracing::error;

use super::{Request, Response};
use crate::app::Application;

/// Largest request body the transport buffers.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build an axum `Router` serving `app`.
pub fn router(app: Arc<Application>) -> axum::Router {
    axum::Router::new()
        .route("/health", get(health_handler))
        .fallback(dispatch_handler)
        .with_state(app)
}

/// Serve `app` over HTTP at `addr` (e.g. `"0.0.0.0:3000"`).
pub async fn serve(app: Arc<Application>, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(app)).await
}

/// `GET /health`: registered commands and queries.
async fn health_handler(State(app): State<Arc<Application>>) -> impl IntoResponse {
    let names = |definitions: Vec<crate::bus::HandlerDefinition>| {
        definitions.into_iter().map(|d| d.dto).collect::<Vec<_>>()
    };
    Json(json!({
        "ok": true,
        "commands": names(app.commands().handlers_definition(false)),
        "queries": names(app.queries().handlers_definition(false)),
    }))
}

/// Fallback: everything goes through the application router.
async fn dispatch_handler(
    State(app): State<Arc<Application>>,
    request: axum::extract::Request,
) -> axum::response::Response {
    let request = match from_axum(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    // Handlers are synchronous.
    match tokio::task::spawn_blocking(move || app.handle(request)).await {
        Ok(response) => into_axum(response),
        Err(err) => {
            error!(error = %err, "dispatch task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn from_axum(request: axum::extract::Request) -> Result<Request, axum::response::Response> {
    let (parts, body) = request.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

    let mut converted = Request::new(parts.method.as_str(), &target);
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            converted.set_header(name.as_str(), value);
        }
    }

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE.into_response())?;
    Ok(converted.with_body(bytes.to_vec()))
}

fn into_axum(response: Response) -> axum::response::Response {
    let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = axum::response::Response::new(Body::from(response.body().to_vec()));
    *out.status_mut() = status;

    for (name, value) in response.headers() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => error!(header = %name, "dropping invalid response header"),
        }
    }
    out
}
