use stratum_reflect::{ClassDecl, Facet, WireDriver, WireError, WireValue, wire_kind};

use crate::context::Context;
use crate::engine::EngineBase;
use crate::error::EngineError;
use crate::meta::ClassMetadata;

// -----------------------------------------------------------------------------
// DeserializeDriver

/// Walks a wire tree and populates a value graph.
///
/// Population is merge-shaped: only keys present in the input are written,
/// everything else keeps whatever the constructed (or target) instance
/// already holds. Field values dispatch handler-first by declared type, then
/// fall back to the type's own wire conversion, which re-enters this driver
/// for nested entities. Container elements never dispatch, matching the
/// serialize driver's sites.
pub(crate) struct DeserializeDriver<'a> {
    base: &'a EngineBase,
    ctx: &'a Context,
}

impl<'a> DeserializeDriver<'a> {
    pub(crate) fn new(base: &'a EngineBase, ctx: &'a Context) -> Self {
        Self { base, ctx }
    }

    /// Writes every visible, present field of `input` into `object`.
    pub(crate) fn populate(
        &self,
        meta: &ClassMetadata,
        object: &mut dyn Facet,
        input: &WireValue,
    ) -> Result<(), EngineError> {
        let map = input.as_object().ok_or(WireError::Mismatch {
            expected: "object",
            found: wire_kind(input),
        })?;

        for prop in &meta.properties {
            if !self.ctx.allows(prop.groups) {
                continue;
            }
            let Some(raw) = map.get(&prop.serialized_name) else {
                continue;
            };

            let value = match self.base.handlers.lookup_deserialize(prop.type_id) {
                Some(handler) => handler.deserialize(raw, self.ctx)?,
                None => (prop.parse)(raw, self)?,
            };

            (prop.write)(object.as_any_mut(), value).map_err(|_| EngineError::FieldWrite {
                class: meta.type_name,
                field: prop.name,
            })?;
        }

        Ok(())
    }
}

impl WireDriver for DeserializeDriver<'_> {
    /// Builds a nested entity. Merge targets only apply at the operation
    /// root, so nested entities always start from the default constructor.
    fn entity_from_wire(
        &self,
        decl: &'static ClassDecl,
        value: &WireValue,
    ) -> Result<Box<dyn Facet>, WireError> {
        let meta = self
            .base
            .store
            .metadata(decl)
            .map_err(|err| WireError::driver(EngineError::from(err)))?;
        let default_fn = meta.default_fn.ok_or_else(|| {
            WireError::driver(EngineError::MissingConstructor {
                class: meta.type_name,
            })
        })?;

        let mut object = default_fn();
        match self.populate(&meta, object.as_mut(), value) {
            Ok(()) => Ok(object),
            Err(EngineError::Wire(wire)) => Err(wire),
            Err(other) => Err(WireError::driver(other)),
        }
    }
}
