//! Parsing of the input struct and its `#[facet(...)]` attributes.

use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token, Type};

use crate::FACET_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// FacetStruct

/// The parsed derive input.
pub(crate) struct FacetStruct<'a> {
    pub ident: &'a Ident,
    /// Explicit class-identifier override from `#[facet(ident = "...")]`.
    pub class_ident: Option<String>,
    /// Whether `#[facet(default)]` was given.
    pub with_default: bool,
    /// Participating fields, declaration order, `skip`ped fields removed.
    pub fields: Vec<FacetField<'a>>,
}

/// One participating field and its declared options.
pub(crate) struct FacetField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub serialized_name: Option<String>,
    pub groups: Vec<String>,
    pub getter: Option<String>,
    pub setter: Option<String>,
    /// Whether `#[facet(accessors)]` requested conventional method names.
    pub conventional: bool,
}

impl<'a> FacetStruct<'a> {
    pub fn parse(input: &'a DeriveInput) -> syn::Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(syn::Error::new_spanned(
                input,
                "`#[derive(Facet)]` only supports structs",
            ));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(syn::Error::new_spanned(
                input,
                "`#[derive(Facet)]` requires named fields",
            ));
        };
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "`#[derive(Facet)]` does not support generic types",
            ));
        }

        let mut class_ident = None;
        let mut with_default = false;

        for attr in facet_attrs(&input.attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ident") {
                    let lit: LitStr = meta.value()?.parse()?;
                    class_ident = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("default") {
                    with_default = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown struct-level `facet` attribute"))
                }
            })?;
        }

        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            if let Some(parsed) = FacetField::parse(field)? {
                fields.push(parsed);
            }
        }

        Ok(Self {
            ident: &input.ident,
            class_ident,
            with_default,
            fields,
        })
    }
}

impl<'a> FacetField<'a> {
    /// Parses one field; returns `None` for `#[facet(skip)]`.
    fn parse(field: &'a syn::Field) -> syn::Result<Option<Self>> {
        let ident = field
            .ident
            .as_ref()
            .expect("named fields checked by caller");

        let mut serialized_name = None;
        let mut groups = Vec::new();
        let mut getter = None;
        let mut setter = None;
        let mut conventional = false;
        let mut skip = false;

        for attr in facet_attrs(&field.attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    serialized_name = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("groups") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let labels: Punctuated<LitStr, Token![,]> =
                        content.parse_terminated(<LitStr as syn::parse::Parse>::parse, Token![,])?;
                    groups.extend(labels.iter().map(LitStr::value));
                    Ok(())
                } else if meta.path.is_ident("getter") {
                    let lit: LitStr = meta.value()?.parse()?;
                    getter = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("setter") {
                    let lit: LitStr = meta.value()?.parse()?;
                    setter = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("accessors") {
                    conventional = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown field-level `facet` attribute"))
                }
            })?;
        }

        if skip {
            return Ok(None);
        }

        Ok(Some(Self {
            ident,
            ty: &field.ty,
            serialized_name,
            groups,
            getter,
            setter,
            conventional,
        }))
    }

    /// The accessor method name to read through, if any was declared.
    pub fn getter_method(&self) -> Option<Ident> {
        match (&self.getter, self.conventional) {
            (Some(name), _) => Some(Ident::new(name, self.ident.span())),
            (None, true) => Some(self.ident.clone()),
            (None, false) => None,
        }
    }

    /// The accessor method name to write through, if any was declared.
    pub fn setter_method(&self) -> Option<Ident> {
        match (&self.setter, self.conventional) {
            (Some(name), _) => Some(Ident::new(name, self.ident.span())),
            (None, true) => Some(Ident::new(
                &format!("set_{}", self.ident),
                self.ident.span(),
            )),
            (None, false) => None,
        }
    }
}

fn facet_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(FACET_ATTRIBUTE_NAME))
}
