use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use stratum_reflect::{ClassDecl, Describe, Facet, WireValue};

use crate::construct::construct;
use crate::context::Context;
use crate::de::DeserializeDriver;
use crate::error::{EngineError, InitError};
use crate::handler::HandlerRegistry;
use crate::listener::ListenerRegistry;
use crate::meta::{CacheScope, ClassMetadata, MetadataStore};
use crate::operation::Operation;
use crate::ser::SerializeDriver;

// -----------------------------------------------------------------------------
// EngineBase

/// The immutable core shared by every engine handle: resolved metadata,
/// handlers, and listeners. Frozen by the builder.
pub(crate) struct EngineBase {
    pub(crate) store: MetadataStore,
    pub(crate) handlers: HandlerRegistry,
    pub(crate) listeners: ListenerRegistry,
}

// -----------------------------------------------------------------------------
// Engine

/// A serialization engine handle: shared core plus one call context.
///
/// Handles are cheap to derive. [`with_context`](Self::with_context) keeps
/// the core (and its metadata memoization) and swaps only the context, so a
/// host service typically builds one engine and derives a handle per
/// request.
///
/// # Examples
///
/// ```no_run
/// use stratum_engine::{Context, EngineBuilder};
/// use stratum_reflect::derive::Facet;
///
/// #[derive(Facet, Default)]
/// #[facet(default)]
/// struct Artist {
///     name: String,
///     #[facet(groups("detail"))]
///     biography: String,
/// }
///
/// # fn run() -> Result<(), stratum_engine::EngineError> {
/// let engine = EngineBuilder::new("/tmp/stratum-cache").build()?;
/// let listing = engine.with_context(Context::new().group("list"));
/// let json = listing.serialize(&Artist::default())?;
/// # Ok(()) }
/// ```
pub struct Engine {
    base: Arc<EngineBase>,
    ctx: Context,
}

static GLOBAL: OnceLock<Engine> = OnceLock::new();
// Serializes first-call initialization so `init` runs at most once even
// when two callers race; the OnceLock alone would let both run it.
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

impl Engine {
    pub(crate) fn new(base: Arc<EngineBase>) -> Self {
        Self {
            base,
            ctx: Context::new(),
        }
    }

    /// Derives a handle over the same core with a different context.
    pub fn with_context(&self, ctx: Context) -> Self {
        Self {
            base: Arc::clone(&self.base),
            ctx,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Installs `engine` as the process-wide engine. Fails once one is set.
    pub fn init_global(engine: Engine) -> Result<(), InitError> {
        GLOBAL.set(engine).map_err(|_| InitError::AlreadyInitialized)
    }

    /// Returns the process-wide engine, building it on first call.
    ///
    /// Construction is memoized: `init` runs at most once per process, with
    /// racing first callers blocking until the winner finishes. A failed
    /// initialization is not memoized and surfaces to every caller.
    pub fn global(
        init: impl FnOnce() -> Result<Engine, EngineError>,
    ) -> Result<&'static Engine, EngineError> {
        if let Some(engine) = GLOBAL.get() {
            return Ok(engine);
        }
        let _guard = GLOBAL_INIT.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = GLOBAL.get() {
            return Ok(engine);
        }
        let engine = init()?;
        Ok(GLOBAL.get_or_init(|| engine))
    }

    // -------------------------------------------------------------------------
    // Serialization

    /// Serializes a value graph to a JSON string under this handle's
    /// context.
    pub fn serialize(&self, value: &dyn Facet) -> Result<String, EngineError> {
        let wire = self.serialize_to_value(value)?;
        Ok(serde_json::to_string(&wire)?)
    }

    /// Serializes a value graph to a wire tree, for callers that post-process
    /// the output before encoding.
    pub fn serialize_to_value(&self, value: &dyn Facet) -> Result<WireValue, EngineError> {
        self.serialize_with(value, &self.ctx)
    }

    /// Serializes under a per-operation context: the operation's groups are
    /// active and null fields are emitted.
    pub fn serialize_operation(
        &self,
        value: &dyn Facet,
        operation: &dyn Operation,
    ) -> Result<String, EngineError> {
        let ctx = Context::for_operation(operation);
        let wire = self.serialize_with(value, &ctx)?;
        Ok(serde_json::to_string(&wire)?)
    }

    fn serialize_with(&self, value: &dyn Facet, ctx: &Context) -> Result<WireValue, EngineError> {
        self.base.listeners.pre_serialize(value, ctx)?;
        let mut wire = SerializeDriver::new(&self.base, ctx).value_to_wire(value)?;
        self.base.listeners.post_serialize(&mut wire, ctx)?;
        Ok(wire)
    }

    // -------------------------------------------------------------------------
    // Deserialization

    /// Deserializes a JSON document into an instance of the declared class.
    ///
    /// Consumes the context's merge target, if one is set: fields absent
    /// from the document keep the target's values.
    pub fn deserialize(
        &mut self,
        json: &str,
        decl: &'static ClassDecl,
    ) -> Result<Box<dyn Facet>, EngineError> {
        let input = serde_json::from_str(json)?;
        let mut ctx = std::mem::take(&mut self.ctx);
        let result = self.deserialize_with(input, decl, &mut ctx);
        self.ctx = ctx;
        result
    }

    /// Typed counterpart of [`deserialize`](Self::deserialize).
    pub fn deserialize_as<T: Describe>(&mut self, json: &str) -> Result<T, EngineError> {
        let object = self.deserialize(json, T::class_decl())?;
        object
            .take::<T>()
            .map_err(|_| EngineError::TargetTypeMismatch {
                class: T::class_decl().type_name,
            })
    }

    /// Deserializes under a per-operation context into a fresh instance of
    /// the operation's target class.
    pub fn deserialize_operation(
        &self,
        json: &str,
        operation: &dyn Operation,
    ) -> Result<Box<dyn Facet>, EngineError> {
        let input = serde_json::from_str(json)?;
        let mut ctx = Context::for_operation_deserialize(operation);
        self.deserialize_with(input, operation.target(), &mut ctx)
    }

    /// Deserializes under a per-operation context, merging into `target`.
    pub fn deserialize_operation_into(
        &self,
        json: &str,
        operation: &dyn Operation,
        target: Box<dyn Facet>,
    ) -> Result<Box<dyn Facet>, EngineError> {
        let input = serde_json::from_str(json)?;
        let mut ctx = Context::for_operation_deserialize(operation).target(target);
        self.deserialize_with(input, operation.target(), &mut ctx)
    }

    fn deserialize_with(
        &self,
        mut input: WireValue,
        decl: &'static ClassDecl,
        ctx: &mut Context,
    ) -> Result<Box<dyn Facet>, EngineError> {
        self.base.listeners.pre_deserialize(&mut input, ctx)?;

        // Entry-type handler, mirroring the serialize driver's entry check.
        if let Some(handler) = self.base.handlers.lookup_deserialize((decl.type_id)()) {
            let mut object = handler.deserialize(&input, ctx)?;
            if object.value_type_id() != (decl.type_id)() {
                return Err(EngineError::TargetTypeMismatch {
                    class: decl.type_name,
                });
            }
            self.base.listeners.post_deserialize(object.as_mut(), ctx)?;
            return Ok(object);
        }

        let meta = self.base.store.metadata(decl)?;
        let mut object = construct(decl, ctx)?;
        DeserializeDriver::new(&self.base, ctx).populate(&meta, object.as_mut(), &input)?;
        self.base.listeners.post_deserialize(object.as_mut(), ctx)?;
        Ok(object)
    }

    // -------------------------------------------------------------------------
    // Metadata

    /// Returns the resolved metadata for a class, resolving it on first use.
    pub fn metadata(
        &self,
        decl: &'static ClassDecl,
    ) -> Result<Arc<ClassMetadata>, EngineError> {
        Ok(self.base.store.metadata(decl)?)
    }

    /// Flushes resolved metadata, in memory and on disk. The next lookup of
    /// each class resolves it fresh.
    pub fn clear_metadata_cache(&self, scope: CacheScope) -> Result<(), EngineError> {
        Ok(self.base.store.clear(scope)?)
    }

    /// The metadata store backing this engine, exposed for inspection.
    pub fn metadata_store(&self) -> &MetadataStore {
        &self.base.store
    }
}

// -----------------------------------------------------------------------------
// Tests
