use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub use stratum_reflect::WireError;

// -----------------------------------------------------------------------------
// AccessorError

/// Which access path of a field failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDirection {
    Read,
    Write,
}

impl fmt::Display for AccessDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// No viable read or write path exists for a field.
///
/// Raised at metadata-resolution time, never lazily during traversal, so a
/// broken declaration fails before any partial output is produced.
#[derive(Debug, Error)]
#[error("no viable {direction} path for field `{class}.{field}`")]
pub struct AccessorError {
    pub class: &'static str,
    pub field: &'static str,
    pub direction: AccessDirection,
}

// -----------------------------------------------------------------------------
// MetadataError

/// A failure while resolving or caching class metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Two fields of one class resolved to the same serialized name.
    #[error("duplicate serialized name `{name}` in class `{class}`")]
    DuplicateSerializedName { class: &'static str, name: String },

    #[error(transparent)]
    Accessor(#[from] AccessorError),

    #[error("failed to read metadata cache entry for `{class}`")]
    CacheRead {
        class: &'static str,
        source: std::io::Error,
    },

    #[error("failed to write metadata cache entry for `{class}`")]
    CacheWrite {
        class: &'static str,
        source: std::io::Error,
    },

    #[error("corrupt metadata cache entry for `{class}`")]
    CacheCorrupt {
        class: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to clear metadata cache directory `{path}`")]
    CacheClear {
        path: PathBuf,
        source: std::io::Error,
    },
}

// -----------------------------------------------------------------------------
// InitError

/// The engine could not be initialized. Fatal: surfaced to the caller, never
/// retried internally.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("cache directory `{path}` is not usable")]
    CacheDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `Engine::init_global` was called after the global engine was set.
    #[error("the global engine is already initialized")]
    AlreadyInitialized,
}

// -----------------------------------------------------------------------------
// EngineError

/// Umbrella error for a single serialize/deserialize call.
///
/// A call either fully succeeds or fails with one of these; there is no
/// partial-success mode.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("malformed JSON input")]
    Json(#[from] serde_json::Error),

    /// Deserialization had neither a target object nor a default
    /// constructor for the class.
    #[error("cannot construct `{class}`: no default constructor and no target object")]
    MissingConstructor { class: &'static str },

    /// The context's target object is not an instance of the operation's
    /// target class.
    #[error("target object is not an instance of `{class}`")]
    TargetTypeMismatch { class: &'static str },

    /// A resolved accessor rejected the object or value at traversal time.
    /// Indicates a handler producing a value of the wrong type, or metadata
    /// applied to a foreign object.
    #[error("cannot write field `{class}.{field}`: value type does not match the declaration")]
    FieldWrite {
        class: &'static str,
        field: &'static str,
    },

    /// Reading a field returned nothing; metadata was applied to an object
    /// of a different type.
    #[error("cannot read field `{class}.{field}` from the given object")]
    FieldRead {
        class: &'static str,
        field: &'static str,
    },

    /// Free-form failure raised by a handler or listener.
    #[error("{0}")]
    Custom(String),
}

impl EngineError {
    /// Builds a [`Custom`](Self::Custom) error from any displayable value;
    /// convenience for handler and listener implementations.
    pub fn custom(message: impl fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }
}
