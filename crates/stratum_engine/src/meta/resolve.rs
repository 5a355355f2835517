use std::collections::HashSet;

use stratum_reflect::{ClassDecl, FieldDecl};

use crate::error::{AccessDirection, AccessorError, MetadataError};
use crate::meta::metadata::{ClassMetadata, PropertyMetadata};
use crate::naming::NamingStrategy;

// -----------------------------------------------------------------------------
// Declaration resolution

/// Resolves a raw class declaration into traversal-ready metadata.
///
/// Per field: accessor methods take precedence over direct access, the
/// serialized name is the explicit override or the strategy's translation of
/// the field name, and the resulting names must be unique within the class.
/// Any failure rejects the whole class.
pub(crate) fn resolve(
    decl: &'static ClassDecl,
    naming: &dyn NamingStrategy,
) -> Result<ClassMetadata, MetadataError> {
    resolve_named(decl, |field| match field.serialized_name {
        Some(explicit) => explicit.to_owned(),
        None => naming.translate(field.name),
    })
}

/// Resolution with the serialized name of each field supplied by the caller,
/// used when a validated cache entry already carries the names.
pub(crate) fn resolve_named(
    decl: &'static ClassDecl,
    mut name_of: impl FnMut(&'static FieldDecl) -> String,
) -> Result<ClassMetadata, MetadataError> {
    let mut properties = Vec::with_capacity(decl.fields.len());
    let mut seen = HashSet::with_capacity(decl.fields.len());

    for field in decl.fields {
        let read = field
            .accessors
            .getter
            .or(field.accessors.direct_get)
            .ok_or(AccessorError {
                class: decl.type_name,
                field: field.name,
                direction: AccessDirection::Read,
            })?;
        let write = field
            .accessors
            .setter
            .or(field.accessors.direct_set)
            .ok_or(AccessorError {
                class: decl.type_name,
                field: field.name,
                direction: AccessDirection::Write,
            })?;

        let serialized_name = name_of(field);
        if !seen.insert(serialized_name.clone()) {
            return Err(MetadataError::DuplicateSerializedName {
                class: decl.type_name,
                name: serialized_name,
            });
        }

        properties.push(PropertyMetadata {
            name: field.name,
            serialized_name,
            groups: field.groups,
            type_name: field.type_name,
            type_id: (field.type_id)(),
            read,
            write,
            parse: field.parse,
        });
    }

    Ok(ClassMetadata {
        ident: decl.ident,
        type_name: decl.type_name,
        type_id: (decl.type_id)(),
        properties,
        default_fn: decl.default_fn,
    })
}

#[cfg(test)]
mod tests {
    use stratum_reflect::Describe;
    use stratum_reflect::derive::Facet;

    use super::resolve;
    use crate::error::MetadataError;
    use crate::naming::{CamelCaseNaming, IdenticalNaming};

    #[derive(Facet, Default)]
    #[facet(default)]
    struct Venue {
        display_name: String,
        #[facet(name = "zip")]
        postal_code: String,
    }

    #[derive(Facet, Default)]
    struct Clash {
        #[facet(name = "displayName")]
        label: String,
        display_name: String,
    }

    #[test]
    fn strategy_and_overrides_shape_serialized_names() {
        let meta = resolve(Venue::class_decl(), &CamelCaseNaming).unwrap();
        let names: Vec<_> = meta
            .properties
            .iter()
            .map(|p| p.serialized_name.as_str())
            .collect();
        assert_eq!(names, ["displayName", "zip"]);
    }

    #[test]
    fn duplicate_serialized_names_are_rejected() {
        let err = resolve(Clash::class_decl(), &CamelCaseNaming).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::DuplicateSerializedName { name, .. } if name == "displayName"
        ));
    }

    #[test]
    fn identical_naming_keeps_distinct_fields_apart() {
        // The same class is fine under a strategy that does not collide.
        let meta = resolve(Clash::class_decl(), &IdenticalNaming).unwrap();
        assert_eq!(meta.properties[1].serialized_name, "display_name");
    }

    #[test]
    fn missing_access_path_fails_resolution() {
        use stratum_reflect::{AccessorDecl, ClassDecl, FieldDecl, WireError};

        // Hand-written declarations may leave accessor slots empty; derived
        // ones always carry the direct slots.
        fn no_parse(
            _: &stratum_reflect::WireValue,
            _: &dyn stratum_reflect::WireDriver,
        ) -> Result<Box<dyn stratum_reflect::Facet>, WireError> {
            Err(WireError::Unsupported {
                type_name: "Opaque",
            })
        }

        static FIELDS: [FieldDecl; 1] = [FieldDecl {
            name: "opaque",
            serialized_name: None,
            groups: &[],
            type_name: "u8",
            type_id: std::any::TypeId::of::<u8>,
            accessors: AccessorDecl {
                getter: None,
                setter: None,
                direct_get: None,
                direct_set: None,
            },
            parse: no_parse,
        }];
        static DECL: ClassDecl = ClassDecl {
            ident: "tests.Opaque",
            type_name: "Opaque",
            type_id: std::any::TypeId::of::<u8>,
            fields: &FIELDS,
            default_fn: None,
        };

        let err = resolve(&DECL, &IdenticalNaming).unwrap_err();
        assert!(matches!(err, MetadataError::Accessor(_)));
    }

    #[test]
    fn lookup_by_serialized_name() {
        let meta = resolve(Venue::class_decl(), &IdenticalNaming).unwrap();
        assert!(meta.property_by_serialized_name("zip").is_some());
        assert!(meta.property_by_serialized_name("postal_code").is_none());
    }
}
