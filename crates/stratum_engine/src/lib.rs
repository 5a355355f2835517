#![doc = include_str!("../README.md")]

mod builder;
mod construct;
mod context;
mod de;
mod engine;
mod error;
mod handler;
mod listener;
mod meta;
mod naming;
mod operation;
mod ser;

pub use builder::EngineBuilder;
pub use context::Context;
pub use engine::Engine;
pub use error::{
    AccessDirection, AccessorError, EngineError, InitError, MetadataError, WireError,
};
pub use handler::{DeserializeHandler, HandlerPack, HandlerRegistry, SerializeHandler};
pub use listener::{EventSubscriber, ListenerRegistry};
pub use meta::{CacheScope, ClassMetadata, FileMetadataCache, MetadataStore, PropertyMetadata};
pub use naming::{CamelCaseNaming, IdenticalNaming, NamingStrategy};
pub use operation::{Operation, StaticOperation};
