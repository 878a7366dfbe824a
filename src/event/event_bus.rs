//! EventBus — fan an event out to every listener registered for its name.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::event::Event;
use super::listener::Listener;
use crate::error::{DispatchError, DispatchResult, HandlerError};

struct Subscription {
    id: String,
    listener: Arc<dyn Listener>,
}

/// Listener ids registered for one event name, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerDefinition {
    pub event: String,
    pub listeners: Vec<String>,
}

/// Event bus with ordered, short-circuiting, fail-fast delivery.
///
/// Listeners run sequentially in registration order. Before each listener
/// the propagation flag is checked; once a listener stops propagation, no
/// later listener sees the event. A listener error aborts the rest of the
/// chain and is returned to the caller.
///
/// ## Example
///
/// ```ignore
/// let mut events = EventBus::new();
/// events.on("users.created", |event: &mut Event| {
///     event.set("welcomed", true);
///     Ok(())
/// });
///
/// let event = events.dispatch(Event::new("users.created", "users"))?;
/// assert_eq!(event.get("welcomed"), Some(&json!(true)));
/// ```
#[derive(Default)]
pub struct EventBus {
    subscriptions: HashMap<String, Vec<Subscription>>,
    order: Vec<String>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under an explicit id.
    pub fn subscribe(&mut self, event: &str, id: &str, listener: Arc<dyn Listener>) {
        debug!(event, listener = id, "listener registered");
        if !self.subscriptions.contains_key(event) {
            self.order.push(event.to_string());
        }
        self.subscriptions
            .entry(event.to_string())
            .or_default()
            .push(Subscription {
                id: id.to_string(),
                listener,
            });
    }

    /// Register a closure listener. Its id is `event#n`, where `n` starts at
    /// the listener's position and skips ids already taken for `event`.
    pub fn on<F>(&mut self, event: &str, f: F)
    where
        F: Fn(&mut Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let taken = self.subscriptions.get(event).map(Vec::as_slice).unwrap_or_default();
        let id = (taken.len()..)
            .map(|n| format!("{event}#{n}"))
            .find(|id| taken.iter().all(|entry| entry.id != *id))
            .unwrap_or_else(|| format!("{event}#{}", taken.len()));
        self.subscribe(event, &id, Arc::new(f));
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.subscriptions
            .get(event)
            .is_some_and(|entries| !entries.is_empty())
    }

    /// Deliver `event` to its listeners and hand it back afterwards.
    ///
    /// The event is owned by this call; listeners only borrow it.
    pub fn dispatch(&self, mut event: Event) -> DispatchResult<Event> {
        let Some(entries) = self.subscriptions.get(event.name()) else {
            debug!(event = event.name(), "no listeners");
            return Ok(event);
        };

        for (position, entry) in entries.iter().enumerate() {
            if event.is_propagation_stopped() {
                debug!(
                    event = event.name(),
                    skipped = entries.len() - position,
                    "propagation stopped"
                );
                break;
            }

            debug!(event = event.name(), listener = %entry.id, "delivering event");
            if let Err(source) = entry.listener.on_event(&mut event) {
                warn!(event = event.name(), listener = %entry.id, error = %source, "listener failed");
                return Err(DispatchError::ListenerFailed {
                    event: event.name().to_string(),
                    position,
                    source,
                });
            }
        }

        Ok(event)
    }

    /// Registered listeners per event name, in registration order.
    pub fn listeners_definition(&self) -> Vec<ListenerDefinition> {
        self.order
            .iter()
            .map(|event| ListenerDefinition {
                event: event.clone(),
                listeners: self.subscriptions[event]
                    .iter()
                    .map(|entry| entry.id.clone())
                    .collect(),
            })
            .collect()
    }
}
