//! Command and query buses.
//!
//! A bus binds each DTO type to exactly one handler identifier. Dispatching a
//! DTO resolves that identifier through the bus's [`Resolver`](crate::Resolver)
//! (once, then cached) and runs the handler.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Bus<K> (Command | Query)                │
//! │  register::<D>(handler_id, aliases)                       │
//! │  execute(dto) / execute_boxed(Box<dyn DynDto>)            │
//! └──────────────────────────────────────────────────────────┘
//!            │ TYPE_NAME → binding            │ alias → TYPE_NAME
//!            ▼                                ▼
//! ┌────────────────────────┐      ┌────────────────────────┐
//! │ Binding                │      │ aliases                │
//! │  handler_id            │      │  "ping" → "app.ping"   │
//! │  cached DynHandler     │      └────────────────────────┘
//! └────────────────────────┘
//!            │ first dispatch
//!            ▼
//!   Resolver<dyn DynHandler>::resolve(handler_id)
//! ```

mod bus;
mod kind;

pub use bus::{Bus, HandlerDefinition, RegistrationPolicy};
pub use kind::{BusKind, Command, Query};

/// Bus for state-changing messages.
pub type CommandBus = Bus<Command>;

/// Bus for read-only messages.
pub type QueryBus = Bus<Query>;
