use stratum_reflect::{ClassDecl, Facet};

use crate::context::Context;
use crate::error::EngineError;

// -----------------------------------------------------------------------------
// Object construction

/// Produces the instance a deserialize call will populate.
///
/// When the context carries a merge target of the declared type, that target
/// is consumed and returned so existing field values survive wherever the
/// input document is silent. Otherwise the class's default constructor runs.
/// A class that registers no default and receives no target cannot be
/// deserialized into.
pub(crate) fn construct(
    decl: &'static ClassDecl,
    ctx: &mut Context,
) -> Result<Box<dyn Facet>, EngineError> {
    if let Some(target) = ctx.take_target() {
        if target.value_type_id() != (decl.type_id)() {
            return Err(EngineError::TargetTypeMismatch {
                class: decl.type_name,
            });
        }
        return Ok(target);
    }
    match decl.default_fn {
        Some(default_fn) => Ok(default_fn()),
        None => Err(EngineError::MissingConstructor {
            class: decl.type_name,
        }),
    }
}

#[cfg(test)]
mod tests {
    use stratum_reflect::Describe;
    use stratum_reflect::derive::Facet;

    use super::construct;
    use crate::context::Context;
    use crate::error::EngineError;

    #[derive(Facet, Default, Debug, PartialEq)]
    #[facet(default)]
    struct Ticket {
        code: String,
    }

    #[derive(Facet, Debug)]
    struct Bare {
        code: String,
    }

    #[test]
    fn default_constructor_runs_without_a_target() {
        let mut ctx = Context::new();
        let object = construct(Ticket::class_decl(), &mut ctx).unwrap();
        assert_eq!(object.downcast_ref::<Ticket>(), Some(&Ticket::default()));
    }

    #[test]
    fn target_of_the_declared_type_is_consumed() {
        let mut ctx = Context::new().target(Box::new(Ticket {
            code: "open".to_owned(),
        }));
        let object = construct(Ticket::class_decl(), &mut ctx).unwrap();
        assert_eq!(object.downcast_ref::<Ticket>().unwrap().code, "open");
        assert!(ctx.take_target().is_none());
    }

    #[test]
    fn target_of_another_type_is_rejected() {
        let mut ctx = Context::new().target(Box::new(Bare {
            code: "stray".to_owned(),
        }));
        let err = construct(Ticket::class_decl(), &mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::TargetTypeMismatch { .. }));
    }

    #[test]
    fn missing_default_is_reported() {
        let mut ctx = Context::new();
        let err = construct(Bare::class_decl(), &mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::MissingConstructor { .. }));
    }
}
