//! DTO contract — the data every bus message must satisfy.
//!
//! A DTO is an immutable value built from a JSON object payload. Building
//! goes through [`Dto::from_payload`], which runs [`Dto::validate`] before
//! deserializing, so an invalid payload never becomes a DTO.
//!
//! ## Example
//!
//! ```ignore
//! use modulith::{Dto, Payload, ValidationError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct RenameUser {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Dto for RenameUser {
//!     const TYPE_NAME: &'static str = "users.rename";
//!
//!     fn validate(data: &Payload) -> Result<(), ValidationError> {
//!         modulith::dto::require_fields(data, &["id", "name"])
//!     }
//! }
//! ```
//!
//! Field-less DTOs should be declared as `struct Ping {}` rather than
//! `struct Ping;` so they deserialize from an empty JSON object.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Backing key/value map of a DTO.
pub type Payload = Map<String, Value>;

/// A typed data-transfer object.
pub trait Dto: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Polymorphic discriminator. Buses key bindings on this name.
    const TYPE_NAME: &'static str;

    /// Check a raw payload before construction.
    fn validate(_data: &Payload) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Validate then construct.
    fn from_payload(data: Payload) -> Result<Self, ValidationError> {
        Self::validate(&data)?;
        serde_json::from_value(Value::Object(data)).map_err(|e| ValidationError::Malformed {
            dto: Self::TYPE_NAME.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize back to a payload. `from_payload(to_payload())` yields an
    /// equivalent DTO.
    ///
    /// A DTO that cannot be represented as JSON (a map with non-string keys,
    /// a failing `Serialize` impl) yields an empty payload and a warning.
    fn to_payload(&self) -> Payload {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Payload::new(),
            Err(err) => {
                tracing::warn!(dto = Self::TYPE_NAME, error = %err, "DTO does not serialize to a payload");
                Payload::new()
            }
            Ok(other) => {
                let mut map = Payload::new();
                map.insert("value".to_string(), other);
                map
            }
        }
    }
}

/// Object-safe view of a [`Dto`], used where the concrete type is only
/// known at runtime (factory output, erased handlers).
pub trait DynDto: Send + Sync {
    /// The DTO's `TYPE_NAME`.
    fn dto_type(&self) -> &'static str;

    /// The DTO's payload.
    fn payload(&self) -> Payload;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: Dto> DynDto for T {
    fn dto_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn payload(&self) -> Payload {
        self.to_payload()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl fmt::Debug for dyn DynDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynDto")
            .field("type", &self.dto_type())
            .field("payload", &self.payload())
            .finish()
    }
}

impl dyn DynDto {
    /// Borrow the concrete DTO if it is a `T`.
    pub fn downcast_ref<T: Dto>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

type BuildFn = fn(Payload) -> Result<Box<dyn DynDto>, ValidationError>;

fn build<D: Dto>(data: Payload) -> Result<Box<dyn DynDto>, ValidationError> {
    D::from_payload(data).map(|dto| Box::new(dto) as Box<dyn DynDto>)
}

/// A DTO type captured as a value: its name plus a validating constructor.
#[derive(Clone, Copy)]
pub struct DtoDescriptor {
    type_name: &'static str,
    build: BuildFn,
}

impl DtoDescriptor {
    pub fn of<D: Dto>() -> Self {
        Self {
            type_name: D::TYPE_NAME,
            build: build::<D>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Run the type's `from_payload`.
    pub fn build(&self, data: Payload) -> Result<Box<dyn DynDto>, ValidationError> {
        (self.build)(data)
    }
}

impl fmt::Debug for DtoDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DtoDescriptor").field(&self.type_name).finish()
    }
}

/// Type-name → descriptor lookup used when registrations come from config.
#[derive(Debug, Clone, Default)]
pub struct DtoCatalog {
    descriptors: HashMap<&'static str, DtoDescriptor>,
}

impl DtoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a DTO type. Builder pattern.
    pub fn with<D: Dto>(mut self) -> Self {
        self.add::<D>();
        self
    }

    pub fn add<D: Dto>(&mut self) {
        self.descriptors.insert(D::TYPE_NAME, DtoDescriptor::of::<D>());
    }

    pub fn get(&self, type_name: &str) -> Option<DtoDescriptor> {
        self.descriptors.get(type_name).copied()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.descriptors.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Fail with `MissingField` for the first absent field.
pub fn require_fields(data: &Payload, fields: &[&str]) -> Result<(), ValidationError> {
    match fields.iter().find(|f| !data.contains_key(**f)) {
        Some(missing) => Err(ValidationError::MissingField(missing.to_string())),
        None => Ok(()),
    }
}

/// Build a DTO catalog from a list of DTO types.
///
/// ```ignore
/// let catalog = modulith::dto_catalog![Ping, ListUsers];
/// ```
#[macro_export]
macro_rules! dto_catalog {
    ($( $dto:ty ),* $(,)?) => {
        $crate::DtoCatalog::new()
        $(
            .with::<$dto>()
        )*
    };
}
