//! Code generation for `#[derive(Facet)]`.

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};

use crate::derive_data::{FacetField, FacetStruct};

/// Expands the full output: accessor/parse functions, the static descriptor
/// table, and the trait impls, all inside an anonymous `const` block.
pub(crate) fn expand(data: &FacetStruct<'_>) -> TokenStream {
    let name = data.ident;
    let name_str = name.to_string();

    let mut helper_fns = TokenStream::new();
    let mut field_decls = Vec::with_capacity(data.fields.len());

    for field in &data.fields {
        let (fns, decl) = expand_field(data, field);
        helper_fns.extend(fns);
        field_decls.push(decl);
    }

    let field_count = field_decls.len();

    let ident_expr = match &data.class_ident {
        Some(explicit) => quote!(#explicit),
        None => quote!(::core::concat!(::core::module_path!(), "::", #name_str)),
    };

    let default_slot = if data.with_default {
        helper_fns.extend(quote! {
            fn __facet_default() -> ::std::boxed::Box<dyn ::stratum_reflect::Facet> {
                ::std::boxed::Box::new(<#name as ::core::default::Default>::default())
            }
        });
        quote!(::core::option::Option::Some(__facet_default))
    } else {
        quote!(::core::option::Option::None)
    };

    quote! {
        const _: () = {
            #helper_fns

            static __FACET_FIELDS: [::stratum_reflect::FieldDecl; #field_count] = [
                #(#field_decls),*
            ];

            static __FACET_DECL: ::stratum_reflect::ClassDecl = ::stratum_reflect::ClassDecl {
                ident: #ident_expr,
                type_name: #name_str,
                type_id: ::core::any::TypeId::of::<#name>,
                fields: &__FACET_FIELDS,
                default_fn: #default_slot,
            };

            impl ::stratum_reflect::Facet for #name {
                #[inline]
                fn facet_ref(&self) -> ::stratum_reflect::FacetRef<'_> {
                    ::stratum_reflect::FacetRef::Entity(self)
                }

                #[inline]
                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                #[inline]
                fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                    self
                }

                #[inline]
                fn into_any(
                    self: ::std::boxed::Box<Self>,
                ) -> ::std::boxed::Box<dyn ::core::any::Any> {
                    self
                }
            }

            impl ::stratum_reflect::Entity for #name {
                #[inline]
                fn decl(&self) -> &'static ::stratum_reflect::ClassDecl {
                    &__FACET_DECL
                }
            }

            impl ::stratum_reflect::Describe for #name {
                #[inline]
                fn class_decl() -> &'static ::stratum_reflect::ClassDecl {
                    &__FACET_DECL
                }
            }

            impl ::stratum_reflect::FromWire for #name {
                fn from_wire(
                    value: &::stratum_reflect::WireValue,
                    driver: &dyn ::stratum_reflect::WireDriver,
                ) -> ::core::result::Result<Self, ::stratum_reflect::WireError> {
                    driver
                        .entity_from_wire(&__FACET_DECL, value)?
                        .take::<Self>()
                        .map_err(|_| ::stratum_reflect::WireError::Mismatch {
                            expected: #name_str,
                            found: "driver output of a different type",
                        })
                }
            }
        };
    }
}

/// Expands one field: its helper functions plus its `FieldDecl` literal.
fn expand_field(data: &FacetStruct<'_>, field: &FacetField<'_>) -> (TokenStream, TokenStream) {
    let name = data.ident;
    let field_ident = field.ident;
    let field_str = field_ident.to_string();
    let ty = field.ty;
    let type_str = ty.to_token_stream().to_string().replace(' ', "");

    let direct_read = format_ident!("__facet_direct_read_{}", field_ident);
    let direct_write = format_ident!("__facet_direct_write_{}", field_ident);
    let parse_fn = format_ident!("__facet_parse_{}", field_ident);

    let mut fns = quote! {
        fn #direct_read(
            obj: &dyn ::core::any::Any,
        ) -> ::core::option::Option<&dyn ::stratum_reflect::Facet> {
            let obj = obj.downcast_ref::<#name>()?;
            ::core::option::Option::Some(&obj.#field_ident as &dyn ::stratum_reflect::Facet)
        }

        fn #direct_write(
            obj: &mut dyn ::core::any::Any,
            value: ::std::boxed::Box<dyn ::stratum_reflect::Facet>,
        ) -> ::core::result::Result<(), ::std::boxed::Box<dyn ::stratum_reflect::Facet>> {
            let ::core::option::Option::Some(obj) = obj.downcast_mut::<#name>() else {
                return ::core::result::Result::Err(value);
            };
            obj.#field_ident = value.take::<#ty>()?;
            ::core::result::Result::Ok(())
        }

        fn #parse_fn(
            value: &::stratum_reflect::WireValue,
            driver: &dyn ::stratum_reflect::WireDriver,
        ) -> ::core::result::Result<
            ::std::boxed::Box<dyn ::stratum_reflect::Facet>,
            ::stratum_reflect::WireError,
        > {
            ::core::result::Result::Ok(::std::boxed::Box::new(
                <#ty as ::stratum_reflect::FromWire>::from_wire(value, driver)?,
            ))
        }
    };

    let getter_slot = match field.getter_method() {
        Some(method) => {
            let getter_fn = format_ident!("__facet_getter_{}", field_ident);
            fns.extend(quote! {
                fn #getter_fn(
                    obj: &dyn ::core::any::Any,
                ) -> ::core::option::Option<&dyn ::stratum_reflect::Facet> {
                    let obj = obj.downcast_ref::<#name>()?;
                    ::core::option::Option::Some(obj.#method() as &dyn ::stratum_reflect::Facet)
                }
            });
            quote!(::core::option::Option::Some(#getter_fn))
        }
        None => quote!(::core::option::Option::None),
    };

    let setter_slot = match field.setter_method() {
        Some(method) => {
            let setter_fn = format_ident!("__facet_setter_{}", field_ident);
            fns.extend(quote! {
                fn #setter_fn(
                    obj: &mut dyn ::core::any::Any,
                    value: ::std::boxed::Box<dyn ::stratum_reflect::Facet>,
                ) -> ::core::result::Result<(), ::std::boxed::Box<dyn ::stratum_reflect::Facet>> {
                    let ::core::option::Option::Some(obj) = obj.downcast_mut::<#name>() else {
                        return ::core::result::Result::Err(value);
                    };
                    obj.#method(value.take::<#ty>()?);
                    ::core::result::Result::Ok(())
                }
            });
            quote!(::core::option::Option::Some(#setter_fn))
        }
        None => quote!(::core::option::Option::None),
    };

    let serialized_slot = match &field.serialized_name {
        Some(explicit) => quote!(::core::option::Option::Some(#explicit)),
        None => quote!(::core::option::Option::None),
    };

    let groups = &field.groups;

    let decl = quote! {
        ::stratum_reflect::FieldDecl {
            name: #field_str,
            serialized_name: #serialized_slot,
            groups: &[#(#groups),*],
            type_name: #type_str,
            type_id: ::core::any::TypeId::of::<#ty>,
            accessors: ::stratum_reflect::AccessorDecl {
                getter: #getter_slot,
                setter: #setter_slot,
                direct_get: ::core::option::Option::Some(#direct_read),
                direct_set: ::core::option::Option::Some(#direct_write),
            },
            parse: #parse_fn,
        }
    };

    (fns, decl)
}
