//! Error types for buses, handlers and the router.

use std::error::Error as StdError;

use thiserror::Error;

/// Error raised by handler business logic.
///
/// Handlers return this; the bus wraps it in
/// [`DispatchError::HandlerExecution`] so the original cause stays reachable
/// through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload decode / deserialization failed.
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    /// Business logic rejected the message (invariant violation).
    #[error("rejected: {0}")]
    Rejected(String),
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Missing or invalid authentication / authorization.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Other error.
    #[error("handler error: {0}")]
    Other(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

impl HandlerError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::DecodeFailed(_) => 400,
            HandlerError::Rejected(_) => 422,
            HandlerError::NotFound(_) => 404,
            HandlerError::Unauthorized(_) => 401,
            HandlerError::Other(_) => 500,
        }
    }
}

/// A DTO payload failed `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A field is present but has the wrong shape or value.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
    /// The payload could not be turned into the DTO type.
    #[error("malformed payload for {dto}: {reason}")]
    Malformed { dto: String, reason: String },
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// The container could not produce an instance for an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no {kind} registered under `{id}`")]
    Unregistered { kind: &'static str, id: String },
    #[error("{kind} `{id}` cannot serve {expected}")]
    Mismatch {
        kind: &'static str,
        id: String,
        expected: String,
    },
}

/// Error type for bus registration, dispatch and routing.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// DTO construction rejected by `validate`.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// No handler is bound to this DTO type.
    #[error("no handler bound to `{0}`")]
    HandlerNotFound(String),
    /// The alias is not registered on this bus.
    #[error("unknown alias `{0}`")]
    UnknownAlias(String),
    /// The bound handler (or route handler) failed.
    #[error("handler `{handler}` failed: {source}")]
    HandlerExecution {
        handler: String,
        #[source]
        source: HandlerError,
    },
    /// The DTO type is already bound and the bus rejects re-registration.
    #[error("`{0}` is already registered")]
    DuplicateRegistration(String),
    /// The alias is already bound to a different DTO type.
    #[error("alias `{alias}` is already bound to `{existing}`")]
    DuplicateAlias { alias: String, existing: String },
    /// A handler, middleware or listener identifier could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// A listener failed; remaining listeners were skipped.
    #[error("listener #{position} for `{event}` failed: {source}")]
    ListenerFailed {
        event: String,
        position: usize,
        #[source]
        source: HandlerError,
    },
    /// Bootstrap configuration is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DispatchError {
    /// Map this error to an HTTP-style status code for boundary rendering.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::Validation(_) => 400,
            DispatchError::HandlerNotFound(_) | DispatchError::UnknownAlias(_) => 404,
            DispatchError::HandlerExecution { source, .. } => source.status_code(),
            _ => 500,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
