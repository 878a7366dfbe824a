//! Handler contract — the processor bound to exactly one DTO type.
//!
//! Handlers are written against a concrete DTO type with [`Handler`]. Buses
//! store them type-erased as [`DynHandler`], which downcasts the boxed DTO
//! back to the type the handler was bound to.
//!
//! ## Example
//!
//! ```ignore
//! struct PingHandler;
//!
//! impl Handler<Ping> for PingHandler {
//!     fn handle(&self, _dto: Ping) -> Result<Message, HandlerError> {
//!         Ok(Message::text("pong"))
//!     }
//! }
//!
//! let erased = modulith::handler::bind::<Ping, _>(PingHandler);
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use crate::dto::{Dto, DynDto};
use crate::error::HandlerError;
use crate::message::Message;

/// Processes one DTO type and always produces a [`Message`] or an error.
pub trait Handler<D: Dto>: Send + Sync {
    fn handle(&self, dto: D) -> Result<Message, HandlerError>;
}

impl<D, F> Handler<D> for F
where
    D: Dto,
    F: Fn(D) -> Result<Message, HandlerError> + Send + Sync,
{
    fn handle(&self, dto: D) -> Result<Message, HandlerError> {
        self(dto)
    }
}

/// Object-safe handler over a boxed DTO.
pub trait DynHandler: Send + Sync {
    /// `TYPE_NAME` of the DTO this handler accepts.
    fn dto_type(&self) -> &'static str;

    fn handle_dyn(&self, dto: Box<dyn DynDto>) -> Result<Message, HandlerError>;
}

struct Bound<D, H> {
    handler: H,
    _dto: PhantomData<fn(D)>,
}

impl<D, H> DynHandler for Bound<D, H>
where
    D: Dto,
    H: Handler<D>,
{
    fn dto_type(&self) -> &'static str {
        D::TYPE_NAME
    }

    fn handle_dyn(&self, dto: Box<dyn DynDto>) -> Result<Message, HandlerError> {
        let actual = dto.dto_type();
        let dto = dto.into_any().downcast::<D>().map_err(|_| {
            HandlerError::DecodeFailed(format!("expected {}, got {}", D::TYPE_NAME, actual))
        })?;
        self.handler.handle(*dto)
    }
}

/// Erase a typed handler.
pub fn bind<D, H>(handler: H) -> Arc<dyn DynHandler>
where
    D: Dto,
    H: Handler<D> + 'static,
{
    Arc::new(Bound {
        handler,
        _dto: PhantomData::<fn(D)>,
    })
}

/// Erase a closure handler. Takes the `Fn` bound directly so closure
/// arguments don't need annotations.
pub fn from_fn<D, F>(f: F) -> Arc<dyn DynHandler>
where
    D: Dto,
    F: Fn(D) -> Result<Message, HandlerError> + Send + Sync + 'static,
{
    bind::<D, F>(f)
}
