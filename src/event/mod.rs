//! Events and listeners.
//!
//! Unlike the command and query buses, which route a DTO to exactly one
//! handler, the [`EventBus`] delivers an [`Event`] to every [`Listener`]
//! registered for the event's name.
//!
//! ## Flow
//!
//! ```text
//!  dispatch(Event) ──▶ L1 ──▶ L2 ──▶ ... ──▶ Ln ──▶ Ok(Event)
//!                      │      │
//!                      │      └─ stop_propagation(): L3..Ln skipped
//!                      └─ Err: abort, ListenerFailed returned
//! ```

mod event;
mod event_bus;
mod listener;

pub use event::{Event, ROUTE_NOT_FOUND};
pub use event_bus::{EventBus, ListenerDefinition};
pub use listener::Listener;
