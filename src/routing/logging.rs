//! Request logging middleware.

use std::time::Instant;

use tracing::{info, warn};

use super::middleware::{Middleware, Next};
use crate::error::HandlerError;
use crate::http::{Request, Response};

/// Logs one line per request with method, path, status and elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogging;

impl Middleware for RequestLogging {
    fn process(&self, request: Request, next: Next<'_>) -> Result<Response, HandlerError> {
        let method = request.method().to_string();
        let path = request.path().to_string();
        let started = Instant::now();

        let result = next.run(request);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                info!(%method, %path, status = response.status(), elapsed_ms, "request");
            }
            Err(err) => {
                warn!(%method, %path, status = err.status_code(), elapsed_ms, error = %err, "request failed");
            }
        }
        result
    }
}
