#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro always emits `::stratum_reflect::` paths. This alias lets
// the generated code resolve inside this crate's own tests as well.
extern crate self as stratum_reflect;

// -----------------------------------------------------------------------------
// Modules

mod entity;
mod facet;
mod impls;
mod list;
mod wire;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use entity::{AccessorDecl, ClassDecl, Describe, Entity, FieldDecl};
pub use entity::{DefaultFn, ParseFn, ReadFn, TypeIdFn, WriteFn};
pub use facet::{Facet, FacetRef, ScalarRef};
pub use list::FacetList;
pub use wire::{FromWire, WireDriver, WireError, WireValue, wire_kind};

pub use stratum_reflect_derive as derive;
