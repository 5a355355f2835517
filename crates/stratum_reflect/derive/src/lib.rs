//! Derive support for `stratum_reflect`.
//!
//! See [`Facet`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static FACET_ATTRIBUTE_NAME: &str = "facet";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;

// -----------------------------------------------------------------------------
// Macros

/// Declares a struct as an engine entity.
///
/// `#[derive(Facet)]` generates the static `ClassDecl` descriptor table for
/// the struct, one `FieldDecl` per named field in declaration order, and
/// implements `Facet`, `Entity`, `Describe`, and `FromWire`.
///
/// Only non-generic structs with named fields are supported.
///
/// # Struct attributes
///
/// - `#[facet(ident = "...")]`: overrides the stable class identifier used
///   as the metadata-cache key. Default: `module_path::TypeName`.
/// - `#[facet(default)]`: records the type's `Default` impl as its
///   construction mechanism; required for an entity to be deserialized
///   without a pre-existing target object.
///
/// # Field attributes
///
/// - `#[facet(name = "...")]`: explicit serialized name; bypasses the
///   engine's naming strategy.
/// - `#[facet(groups("a", "b"))]`: visibility-group labels. A field with
///   no groups is always visible.
/// - `#[facet(getter = "method")]` / `#[facet(setter = "method")]`:
///   explicit accessor method names. Getters take `&self` and return a
///   reference to the field type; setters take the field type by value.
/// - `#[facet(accessors)]`: conventional accessor names derived from the
///   field: `field()` and `set_field(value)`.
/// - `#[facet(skip)]`: the field never participates in (de)serialization.
///
/// # Examples
///
/// ```rust, ignore
/// #[derive(Facet, Default)]
/// #[facet(default)]
/// struct Article {
///     id: u64,
///     #[facet(name = "headline", groups("list", "detail"))]
///     title: String,
///     #[facet(groups("detail"), accessors)]
///     body: Option<String>,
/// }
/// ```
#[proc_macro_derive(Facet, attributes(facet))]
pub fn derive_facet(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_data::FacetStruct::parse(&input) {
        Ok(data) => impls::expand(&data).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
