//! Stock listeners for router events.

use serde_json::Value;
use tracing::debug;

use crate::error::HandlerError;
use crate::event::{Event, Listener};
use crate::http::{find_cookie, Response};

/// Sends visitors with a session cookie somewhere useful instead of a 404.
///
/// Meant for [`ROUTE_NOT_FOUND`](crate::event::ROUTE_NOT_FOUND): when the
/// request headers carried in the event include the session cookie, the
/// listener sets a `302` to `location` and stops propagation. Without the
/// cookie the event passes through untouched.
#[derive(Debug, Clone)]
pub struct SessionRedirect {
    cookie: String,
    location: String,
}

impl SessionRedirect {
    pub fn new(cookie: &str, location: &str) -> Self {
        Self {
            cookie: cookie.to_string(),
            location: location.to_string(),
        }
    }
}

impl Listener for SessionRedirect {
    fn on_event(&self, event: &mut Event) -> Result<(), HandlerError> {
        let has_session = event
            .get("headers")
            .and_then(|headers| headers.get("cookie"))
            .and_then(Value::as_str)
            .and_then(|header| find_cookie(header, &self.cookie))
            .is_some_and(|value| !value.is_empty());

        if has_session {
            debug!(event = event.name(), location = %self.location, "redirecting session");
            event.set_response(Response::redirect(&self.location));
            event.stop_propagation();
        }
        Ok(())
    }
}
