//! Listener trait for event fan-out.

use super::event::Event;
use crate::error::HandlerError;

/// Reacts to an event. May mutate it, set a response, or stop propagation.
///
/// Returning an error aborts the remaining listeners for this dispatch.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &mut Event) -> Result<(), HandlerError>;
}

impl<F> Listener for F
where
    F: Fn(&mut Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn on_event(&self, event: &mut Event) -> Result<(), HandlerError> {
        self(event)
    }
}
