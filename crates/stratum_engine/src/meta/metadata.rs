use std::any::TypeId;
use std::fmt;

use stratum_reflect::{DefaultFn, ParseFn, ReadFn, WriteFn};

// -----------------------------------------------------------------------------
// PropertyMetadata

/// One resolved property of a class: the declared field plus everything the
/// drivers need at traversal time.
pub struct PropertyMetadata {
    /// Field name in source code.
    pub name: &'static str,
    /// Key used in the wire document, after naming strategy and overrides.
    pub serialized_name: String,
    /// Visibility groups; empty means always visible.
    pub groups: &'static [&'static str],
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub read: ReadFn,
    pub write: WriteFn,
    pub parse: ParseFn,
}

impl fmt::Debug for PropertyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("name", &self.name)
            .field("serialized_name", &self.serialized_name)
            .field("groups", &self.groups)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ClassMetadata

/// The resolved description of one serializable class.
///
/// Properties keep declaration order, which is also wire-output order.
pub struct ClassMetadata {
    /// Stable identifier, used as the disk-cache key.
    pub ident: &'static str,
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub properties: Vec<PropertyMetadata>,
    pub default_fn: Option<DefaultFn>,
}

impl ClassMetadata {
    /// Looks a property up by its wire key.
    pub fn property_by_serialized_name(&self, key: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.serialized_name == key)
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("ident", &self.ident)
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
