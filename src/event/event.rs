//! Event — a named, mutable payload passed through listeners.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dto::Payload;
use crate::http::Response;

/// Raised by the router when no route matches a request.
pub const ROUTE_NOT_FOUND: &str = "core.routeNotFound";

/// A named occurrence with a mutable data bag.
///
/// `occurred_at` is fixed at construction. Listeners may read and write the
/// data bag, attach a [`Response`], and stop propagation; once stopped, the
/// event bus delivers the event to no further listener.
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    fired_by: String,
    occurred_at: DateTime<Utc>,
    data: Payload,
    propagation_stopped: bool,
    response: Option<Response>,
}

impl Event {
    pub fn new(name: impl Into<String>, fired_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fired_by: fired_by.into(),
            occurred_at: Utc::now(),
            data: Payload::new(),
            propagation_stopped: false,
            response: None,
        }
    }

    /// Set a data entry. Builder pattern.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Dot-namespaced name, e.g. `core.routeNotFound`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of whatever raised the event.
    pub fn fired_by(&self) -> &str {
        &self.fired_by
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Deserialize a data entry into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub fn data(&self) -> &Payload {
        &self.data
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Offer a response to whoever raised the event.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }
}
