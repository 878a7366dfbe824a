//! Bus — DTO type → handler binding, alias resolution and dispatch.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::kind::BusKind;
use crate::container::Resolver;
use crate::dto::{Dto, DtoDescriptor, DynDto};
use crate::error::{DispatchError, DispatchResult, ResolveError};
use crate::handler::DynHandler;
use crate::message::Message;

/// What `register` does when the DTO type is already bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationPolicy {
    /// Fail with `DuplicateRegistration`.
    #[default]
    Reject,
    /// Replace the existing binding in place and drop its aliases.
    Overwrite,
}

/// One registered DTO type, as reported by [`Bus::handlers_definition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDefinition {
    pub dto: String,
    pub handler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
}

struct Binding {
    dto: DtoDescriptor,
    handler_id: String,
    aliases: Vec<String>,
    handler: OnceLock<Arc<dyn DynHandler>>,
}

/// A message bus of kind `K` (see [`CommandBus`](super::CommandBus) and
/// [`QueryBus`](super::QueryBus)).
///
/// Registration takes `&mut self` and happens during bootstrap. Afterwards
/// the bus is read-only and can be shared behind an `Arc`; the only
/// interior mutability is the per-binding handler cache, filled on first
/// dispatch.
///
/// ## Example
///
/// ```ignore
/// let container = Arc::new(Container::new().handler::<Ping, _>("app.ping_handler", || PingHandler));
///
/// let mut bus = QueryBus::new(container);
/// bus.register::<Ping>("app.ping_handler", &["ping"])?;
///
/// assert!(bus.has_handler("ping"));
/// let message = bus.execute(Ping {})?;
/// ```
pub struct Bus<K> {
    resolver: Arc<dyn Resolver<dyn DynHandler>>,
    policy: RegistrationPolicy,
    bindings: Vec<Binding>,
    by_type: HashMap<&'static str, usize>,
    aliases: HashMap<String, &'static str>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: BusKind> Bus<K> {
    /// Create an empty bus that resolves handler ids through `resolver`.
    pub fn new<R>(resolver: Arc<R>) -> Self
    where
        R: Resolver<dyn DynHandler> + 'static,
    {
        Self {
            resolver,
            policy: RegistrationPolicy::default(),
            bindings: Vec::new(),
            by_type: HashMap::new(),
            aliases: HashMap::new(),
            _kind: PhantomData,
        }
    }

    /// Set the duplicate-registration policy. Builder pattern.
    pub fn with_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Bind DTO type `D` to the handler registered under `handler_id`,
    /// optionally addressable through `aliases`.
    pub fn register<D: Dto>(&mut self, handler_id: &str, aliases: &[&str]) -> DispatchResult<()> {
        self.register_descriptor(DtoDescriptor::of::<D>(), handler_id, aliases)
    }

    /// Same as [`register`](Self::register) for a DTO type known only at
    /// runtime (e.g. from a [`DtoCatalog`](crate::DtoCatalog)).
    pub fn register_descriptor(
        &mut self,
        dto: DtoDescriptor,
        handler_id: &str,
        aliases: &[&str],
    ) -> DispatchResult<()> {
        let type_name = dto.type_name();
        let existing = self.by_type.get(type_name).copied();

        if existing.is_some() && self.policy == RegistrationPolicy::Reject {
            warn!(bus = K::NAME, dto = type_name, "duplicate registration rejected");
            return Err(DispatchError::DuplicateRegistration(type_name.to_string()));
        }

        let mut unique: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            if let Some(bound) = self.aliases.get(*alias) {
                if *bound != type_name {
                    return Err(DispatchError::DuplicateAlias {
                        alias: alias.to_string(),
                        existing: bound.to_string(),
                    });
                }
            }
            if !unique.iter().any(|a| a == alias) {
                unique.push(alias.to_string());
            }
        }

        let binding = Binding {
            dto,
            handler_id: handler_id.to_string(),
            aliases: unique,
            handler: OnceLock::new(),
        };

        match existing {
            Some(index) => {
                for alias in &self.bindings[index].aliases {
                    self.aliases.remove(alias);
                }
                info!(bus = K::NAME, dto = type_name, handler = handler_id, "binding overwritten");
                self.bindings[index] = binding;
            }
            None => {
                self.by_type.insert(type_name, self.bindings.len());
                self.bindings.push(binding);
                debug!(bus = K::NAME, dto = type_name, handler = handler_id, "handler registered");
            }
        }

        let index = self.by_type[type_name];
        for alias in &self.bindings[index].aliases {
            self.aliases.insert(alias.clone(), type_name);
        }
        Ok(())
    }

    /// Whether `identifier` (a DTO type name or an alias) is bound.
    pub fn has_handler(&self, identifier: &str) -> bool {
        self.descriptor(identifier).is_some()
    }

    /// DTO type bound to `alias`.
    pub fn dto_type_for_alias(&self, alias: &str) -> DispatchResult<&'static str> {
        self.aliases
            .get(alias)
            .copied()
            .ok_or_else(|| DispatchError::UnknownAlias(alias.to_string()))
    }

    /// Descriptor for a type name or alias. The type name wins when an
    /// identifier is both.
    pub fn descriptor(&self, identifier: &str) -> Option<DtoDescriptor> {
        let type_name = if self.by_type.contains_key(identifier) {
            identifier
        } else {
            self.aliases.get(identifier).copied()?
        };
        self.by_type
            .get(type_name)
            .map(|index| self.bindings[*index].dto)
    }

    /// Run the handler bound to `dto`'s type.
    pub fn execute<D: Dto>(&self, dto: D) -> DispatchResult<Message> {
        self.execute_boxed(Box::new(dto))
    }

    /// Run the handler bound to a type-erased DTO.
    pub fn execute_boxed(&self, dto: Box<dyn DynDto>) -> DispatchResult<Message> {
        let type_name = dto.dto_type();
        let binding = self
            .by_type
            .get(type_name)
            .map(|index| &self.bindings[*index])
            .ok_or_else(|| DispatchError::HandlerNotFound(type_name.to_string()))?;

        let handler = self.handler_for(binding)?;
        debug!(bus = K::NAME, dto = type_name, handler = %binding.handler_id, "executing");

        handler.handle_dyn(dto).map_err(|source| {
            warn!(
                bus = K::NAME,
                dto = type_name,
                handler = %binding.handler_id,
                error = %source,
                "handler failed"
            );
            DispatchError::HandlerExecution {
                handler: binding.handler_id.clone(),
                source,
            }
        })
    }

    /// Every binding in registration order.
    pub fn handlers_definition(&self, with_aliases: bool) -> Vec<HandlerDefinition> {
        self.bindings
            .iter()
            .map(|binding| HandlerDefinition {
                dto: binding.dto.type_name().to_string(),
                handler: binding.handler_id.clone(),
                aliases: with_aliases.then(|| binding.aliases.clone()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn handler_for(&self, binding: &Binding) -> DispatchResult<Arc<dyn DynHandler>> {
        if let Some(handler) = binding.handler.get() {
            return Ok(handler.clone());
        }

        let handler = self.resolver.resolve(&binding.handler_id)?;
        if handler.dto_type() != binding.dto.type_name() {
            return Err(ResolveError::Mismatch {
                kind: "handler",
                id: binding.handler_id.clone(),
                expected: binding.dto.type_name().to_string(),
            }
            .into());
        }

        debug!(bus = K::NAME, handler = %binding.handler_id, "handler resolved");
        Ok(binding.handler.get_or_init(|| handler).clone())
    }
}
