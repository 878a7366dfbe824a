//! DtoFactory — turn an identifier plus raw data into a DTO for a bus.
//!
//! An identifier the bus doesn't know is not an error here: the factory
//! hands back [`Resolved::NotFound`], a null object with a fixed payload, so
//! callers can render it like any other result.

use serde_json::{json, Value};
use tracing::debug;

use crate::bus::{Bus, BusKind};
use crate::dto::{DynDto, Payload};
use crate::error::DispatchResult;

/// Placeholder for an identifier with no binding on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    identifier: String,
}

impl NotFound {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// The identifier that failed to resolve.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Always `{"error": "Command not found", "handler": false}`.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("error".to_string(), json!("Command not found"));
        payload.insert("handler".to_string(), Value::Bool(false));
        payload
    }
}

/// Factory output.
#[derive(Debug)]
pub enum Resolved {
    Found(Box<dyn DynDto>),
    NotFound(NotFound),
}

impl Resolved {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolved::Found(_))
    }

    /// The DTO, or `None` for the null object.
    pub fn into_dto(self) -> Option<Box<dyn DynDto>> {
        match self {
            Resolved::Found(dto) => Some(dto),
            Resolved::NotFound(_) => None,
        }
    }

    pub fn to_payload(&self) -> Payload {
        match self {
            Resolved::Found(dto) => dto.payload(),
            Resolved::NotFound(not_found) => not_found.to_payload(),
        }
    }
}

/// Builds DTOs for whatever a bus has bound.
pub struct DtoFactory;

impl DtoFactory {
    /// Resolve `identifier` (type name first, then alias) on `bus` and build
    /// the DTO from `data`.
    ///
    /// Returns `Err(DispatchError::Validation)` when the DTO type rejects
    /// `data`; an unknown identifier yields `Ok(Resolved::NotFound)`.
    pub fn from_payload<K: BusKind>(
        bus: &Bus<K>,
        identifier: &str,
        data: Payload,
    ) -> DispatchResult<Resolved> {
        let Some(descriptor) = bus.descriptor(identifier) else {
            debug!(bus = K::NAME, identifier, "identifier not bound");
            return Ok(Resolved::NotFound(NotFound::new(identifier)));
        };

        let dto = descriptor.build(data)?;
        Ok(Resolved::Found(dto))
    }
}
