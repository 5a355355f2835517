use serde_json::{Map, Number};
use stratum_reflect::{Entity, Facet, FacetRef, ScalarRef, WireValue};

use crate::context::Context;
use crate::engine::EngineBase;
use crate::error::EngineError;

// -----------------------------------------------------------------------------
// SerializeDriver

/// Walks a value graph and produces the wire tree.
///
/// Handler dispatch sites mirror the deserialize driver exactly: the entry
/// value (by its runtime type) and each entity field (by its declared type).
/// Container elements and option inners never dispatch, so a handler pair
/// fires on the same values in both directions. Group filtering and the
/// null policy apply at each entity's fields, so nested entities obey the
/// same context as the root.
pub(crate) struct SerializeDriver<'a> {
    base: &'a EngineBase,
    ctx: &'a Context,
}

impl<'a> SerializeDriver<'a> {
    pub(crate) fn new(base: &'a EngineBase, ctx: &'a Context) -> Self {
        Self { base, ctx }
    }

    /// Entry point: consults the handler registry for the entry value's own
    /// type before traversal.
    pub(crate) fn value_to_wire(&self, value: &dyn Facet) -> Result<WireValue, EngineError> {
        if let Some(handler) = self.base.handlers.lookup_serialize(value.value_type_id()) {
            return handler.serialize(value, self.ctx);
        }
        self.traverse(value)
    }

    fn traverse(&self, value: &dyn Facet) -> Result<WireValue, EngineError> {
        match value.facet_ref() {
            FacetRef::Scalar(scalar) => scalar_to_wire(scalar),
            FacetRef::Opt(inner) => match inner {
                Some(inner) => self.traverse(inner),
                None => Ok(WireValue::Null),
            },
            FacetRef::List(list) => {
                let mut items = Vec::with_capacity(list.len());
                for index in 0..list.len() {
                    // Length and index come from the same borrow; a hole
                    // here is a FacetList implementation bug.
                    if let Some(item) = list.get(index) {
                        items.push(self.traverse(item)?);
                    }
                }
                Ok(WireValue::Array(items))
            }
            FacetRef::Entity(entity) => self.entity_to_wire(entity),
        }
    }

    fn entity_to_wire(&self, entity: &dyn Entity) -> Result<WireValue, EngineError> {
        let meta = self.base.store.metadata(entity.decl())?;
        let mut object = Map::new();

        for prop in &meta.properties {
            if !self.ctx.allows(prop.groups) {
                continue;
            }
            let field = (prop.read)(entity.as_any()).ok_or(EngineError::FieldRead {
                class: meta.type_name,
                field: prop.name,
            })?;
            let wire = match self.base.handlers.lookup_serialize(prop.type_id) {
                Some(handler) => handler.serialize(field, self.ctx)?,
                None => self.traverse(field)?,
            };
            if wire.is_null() && !self.ctx.emits_null() {
                continue;
            }
            object.insert(prop.serialized_name.clone(), wire);
        }

        Ok(WireValue::Object(object))
    }
}

fn scalar_to_wire(scalar: ScalarRef<'_>) -> Result<WireValue, EngineError> {
    match scalar {
        ScalarRef::Bool(b) => Ok(WireValue::Bool(b)),
        ScalarRef::I64(n) => Ok(WireValue::Number(n.into())),
        ScalarRef::U64(n) => Ok(WireValue::Number(n.into())),
        ScalarRef::F64(n) => Number::from_f64(n)
            .map(WireValue::Number)
            .ok_or_else(|| EngineError::custom(format!("non-finite float `{n}` in output"))),
        ScalarRef::Str(s) => Ok(WireValue::String(s.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use stratum_reflect::{Facet, ScalarRef, WireValue};

    use super::scalar_to_wire;

    #[test]
    fn scalars_map_onto_json_primitives() {
        assert_eq!(scalar_to_wire(ScalarRef::Bool(true)).unwrap(), WireValue::Bool(true));
        assert_eq!(scalar_to_wire(ScalarRef::I64(-3)).unwrap(), WireValue::from(-3));
        assert_eq!(scalar_to_wire(ScalarRef::Str("x")).unwrap(), WireValue::from("x"));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(scalar_to_wire(ScalarRef::F64(f64::NAN)).is_err());
        assert!(scalar_to_wire(ScalarRef::F64(f64::INFINITY)).is_err());
    }

    #[test]
    fn scalar_classification_feeds_the_driver() {
        let value: &dyn Facet = &42_u32;
        match value.facet_ref() {
            stratum_reflect::FacetRef::Scalar(scalar) => {
                assert_eq!(scalar_to_wire(scalar).unwrap(), WireValue::from(42));
            }
            _ => panic!("expected scalar classification"),
        }
    }
}
