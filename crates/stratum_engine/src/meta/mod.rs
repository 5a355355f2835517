//! Resolved class metadata and its two-level cache.
//!
//! A [`ClassDecl`](stratum_reflect::ClassDecl) is the raw, derive-generated
//! description of a class. Resolution turns it into a [`ClassMetadata`]:
//! serialized names are computed through the engine's naming strategy,
//! accessor precedence is settled, and per-class uniqueness is enforced.
//! Resolution runs at most once per class per engine; the [`MetadataStore`]
//! memoizes results in memory and mirrors them to disk so later processes
//! can validate their declarations cheaply.

mod cache;
mod metadata;
mod resolve;
mod store;

pub use cache::{CacheScope, FileMetadataCache};
pub use metadata::{ClassMetadata, PropertyMetadata};
pub use store::MetadataStore;
