use core::any::{Any, TypeId};

use crate::facet::Facet;
use crate::wire::{WireDriver, WireError, WireValue};

// -----------------------------------------------------------------------------
// Function pointer aliases

/// Reads a field from an object, widened to `&dyn Any`.
///
/// Returns `None` only when the object is not of the declaring type, which
/// indicates a wiring bug rather than a data error.
pub type ReadFn = fn(&dyn Any) -> Option<&dyn Facet>;

/// Writes a boxed value into a field of an object.
///
/// On a type mismatch (either the object or the value) the value is handed
/// back untouched.
pub type WriteFn = fn(&mut dyn Any, Box<dyn Facet>) -> Result<(), Box<dyn Facet>>;

/// Builds a fresh instance of the declaring type.
pub type DefaultFn = fn() -> Box<dyn Facet>;

/// Converts a wire value into a boxed instance of the field's type,
/// recursing through the engine's [`WireDriver`] for nested entities.
pub type ParseFn = fn(&WireValue, &dyn WireDriver) -> Result<Box<dyn Facet>, WireError>;

/// Returns the [`TypeId`] of the declaring type.
///
/// Stored as a function pointer so declarations stay `const`-constructible;
/// the idiom is `TypeId::of::<T>` coerced at the declaration site.
pub type TypeIdFn = fn() -> TypeId;

// -----------------------------------------------------------------------------
// AccessorDecl

/// The candidate access paths declared for a field.
///
/// The engine resolves these by precedence at metadata-resolution time:
/// declared accessor methods first, then direct field access. A field with
/// no viable read or write path fails resolution for the whole class.
///
/// `#[derive(Facet)]` always emits the direct slots; `getter`/`setter` slots
/// are filled when the field carries `#[facet(getter = "...")]`,
/// `#[facet(setter = "...")]`, or `#[facet(accessors)]` (conventional
/// `field()` / `set_field(v)` method names).
#[derive(Clone, Copy)]
pub struct AccessorDecl {
    pub getter: Option<ReadFn>,
    pub setter: Option<WriteFn>,
    pub direct_get: Option<ReadFn>,
    pub direct_set: Option<WriteFn>,
}

impl AccessorDecl {
    /// Declares direct field access only.
    #[inline]
    pub const fn direct(get: ReadFn, set: WriteFn) -> Self {
        Self {
            getter: None,
            setter: None,
            direct_get: Some(get),
            direct_set: Some(set),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldDecl

/// The static declaration of a single entity field.
///
/// Declarations carry what the source states; the engine's metadata
/// resolution turns them into `PropertyMetadata` by applying the naming
/// strategy, resolving accessors, and enforcing serialized-name uniqueness.
pub struct FieldDecl {
    /// The in-memory field name.
    pub name: &'static str,
    /// Explicit serialized-name override; bypasses the naming strategy.
    pub serialized_name: Option<&'static str>,
    /// Visibility-group labels. Empty means "always visible".
    pub groups: &'static [&'static str],
    /// The declared field type's name, for diagnostics.
    pub type_name: &'static str,
    /// The declared field type's id.
    pub type_id: TypeIdFn,
    /// Candidate access paths.
    pub accessors: AccessorDecl,
    /// Wire-to-value conversion for this field's type.
    pub parse: ParseFn,
}

// -----------------------------------------------------------------------------
// ClassDecl

/// The static declaration of an entity type: an ordered field table plus
/// identity and construction information.
///
/// Field order is declaration order and determines serialized output order.
/// Generated by `#[derive(Facet)]`; hand-written declarations are equally
/// valid for types that cannot use the derive.
pub struct ClassDecl {
    /// Stable class identifier; keys the persistent metadata cache.
    pub ident: &'static str,
    /// The bare type name, for diagnostics.
    pub type_name: &'static str,
    /// The entity type's id.
    pub type_id: TypeIdFn,
    /// Declaration-ordered field table.
    pub fields: &'static [FieldDecl],
    /// Default constructor, present when the type opted in with
    /// `#[facet(default)]`.
    pub default_fn: Option<DefaultFn>,
}

// -----------------------------------------------------------------------------
// Entity / Describe

/// An object-safe handle from an entity value to its declaration.
pub trait Entity: Facet {
    /// Returns the static declaration of this entity's type.
    fn decl(&self) -> &'static ClassDecl;
}

/// Static access to an entity type's declaration.
///
/// # Examples
///
/// ```
/// use stratum_reflect::{Describe, derive::Facet};
///
/// #[derive(Facet)]
/// struct Tag {
///     label: String,
/// }
///
/// let decl = Tag::class_decl();
/// assert_eq!(decl.type_name, "Tag");
/// assert_eq!(decl.fields[0].name, "label");
/// ```
pub trait Describe: Facet {
    /// Returns the static declaration of this type.
    fn class_decl() -> &'static ClassDecl
    where
        Self: Sized;
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use crate::derive::Facet;
    use crate::{Describe, Facet, FacetRef};

    #[derive(Facet, Default)]
    #[facet(default, ident = "tests.Release")]
    struct Release {
        #[facet(name = "catalogNumber")]
        catalog_number: String,
        #[facet(groups("list", "detail"))]
        title: String,
        #[facet(groups("detail"))]
        pressing_notes: Option<String>,
        #[facet(skip)]
        dirty: bool,
    }

    #[test]
    fn decl_reflects_attributes() {
        let decl = Release::class_decl();

        assert_eq!(decl.ident, "tests.Release");
        assert_eq!(decl.type_name, "Release");
        assert_eq!((decl.type_id)(), TypeId::of::<Release>());

        // `skip` removes the field from the table entirely.
        let names: Vec<_> = decl.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["catalog_number", "title", "pressing_notes"]);

        assert_eq!(decl.fields[0].serialized_name, Some("catalogNumber"));
        assert_eq!(decl.fields[1].groups, ["list", "detail"]);
        assert!(decl.fields[0].groups.is_empty());
        assert!(decl.default_fn.is_some());
    }

    #[test]
    fn direct_accessors_read_and_write() {
        let mut release = Release {
            title: String::from("Blue Train"),
            ..Release::default()
        };

        let field = &Release::class_decl().fields[1];
        let read = field.accessors.direct_get.unwrap();
        let write = field.accessors.direct_set.unwrap();

        let value = read(&release).unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Blue Train");

        write(&mut release, Box::new(String::from("Giant Steps"))).unwrap();
        assert_eq!(release.title, "Giant Steps");

        // Wrong value type comes back untouched.
        assert!(write(&mut release, Box::new(3_i32)).is_err());
    }

    #[test]
    fn derived_facet_is_an_entity() {
        let release = Release::default();
        match release.facet_ref() {
            FacetRef::Entity(entity) => {
                assert_eq!(entity.decl().ident, "tests.Release");
            }
            _ => panic!("expected entity classification"),
        }
    }
}
