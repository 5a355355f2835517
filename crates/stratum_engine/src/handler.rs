use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use stratum_reflect::{Facet, WireValue};

use crate::context::Context;
use crate::error::EngineError;

// -----------------------------------------------------------------------------
// Handler traits

/// A custom converter that replaces default traversal for one type during
/// serialization.
///
/// The handler receives the raw value (downcast it to the registered type)
/// and the active context, and returns the wire representation directly.
/// Visibility filtering still decides whether a field is visited at all;
/// once it is, a registered handler fully owns its representation.
pub trait SerializeHandler: Send + Sync {
    fn serialize(&self, value: &dyn Facet, ctx: &Context) -> Result<WireValue, EngineError>;
}

/// A custom converter that replaces default traversal for one type during
/// deserialization.
///
/// Must return a boxed value of the registered type; writing it into the
/// enclosing object fails otherwise.
pub trait DeserializeHandler: Send + Sync {
    fn deserialize(&self, value: &WireValue, ctx: &Context) -> Result<Box<dyn Facet>, EngineError>;
}

// -----------------------------------------------------------------------------
// HandlerRegistry

/// The mapping from (type, direction) to custom converters.
///
/// At most one handler per key; registering again for the same key
/// overwrites, so the order of the configured handler list decides which
/// registration wins. Populated once at engine-build time and immutable
/// afterward.
#[derive(Default)]
pub struct HandlerRegistry {
    serialize: HashMap<TypeId, Arc<dyn SerializeHandler>>,
    deserialize: HashMap<TypeId, Arc<dyn DeserializeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a serialization handler for values of type `T`.
    pub fn register_serialize<T: Facet>(&mut self, handler: Arc<dyn SerializeHandler>) {
        self.serialize.insert(TypeId::of::<T>(), handler);
    }

    /// Registers a deserialization handler for values of type `T`.
    pub fn register_deserialize<T: Facet>(&mut self, handler: Arc<dyn DeserializeHandler>) {
        self.deserialize.insert(TypeId::of::<T>(), handler);
    }

    pub(crate) fn lookup_serialize(&self, type_id: TypeId) -> Option<&dyn SerializeHandler> {
        self.serialize.get(&type_id).map(Arc::as_ref)
    }

    pub(crate) fn lookup_deserialize(&self, type_id: TypeId) -> Option<&dyn DeserializeHandler> {
        self.deserialize.get(&type_id).map(Arc::as_ref)
    }
}

// -----------------------------------------------------------------------------
// HandlerPack

/// A bundle of handler registrations, the unit the host's configuration
/// list is made of.
///
/// The builder applies packs in list order; a later pack registering the
/// same (type, direction) overwrites an earlier one.
pub trait HandlerPack {
    fn configure(&self, registry: &mut HandlerRegistry);
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use stratum_reflect::{Facet, WireValue};

    use super::{HandlerRegistry, SerializeHandler};
    use crate::context::Context;
    use crate::error::EngineError;

    struct Fixed(&'static str);

    impl SerializeHandler for Fixed {
        fn serialize(&self, _: &dyn Facet, _: &Context) -> Result<WireValue, EngineError> {
            Ok(json!(self.0))
        }
    }

    #[test]
    fn later_registration_overwrites() {
        let mut registry = HandlerRegistry::new();
        registry.register_serialize::<String>(Arc::new(Fixed("first")));
        registry.register_serialize::<String>(Arc::new(Fixed("second")));

        let handler = registry
            .lookup_serialize(std::any::TypeId::of::<String>())
            .unwrap();
        let out = handler
            .serialize(&String::new(), &Context::new())
            .unwrap();
        assert_eq!(out, json!("second"));

        assert!(
            registry
                .lookup_serialize(std::any::TypeId::of::<u32>())
                .is_none()
        );
    }
}
