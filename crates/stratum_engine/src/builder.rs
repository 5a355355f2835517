use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::engine::{Engine, EngineBase};
use crate::error::InitError;
use crate::handler::{HandlerPack, HandlerRegistry};
use crate::listener::{EventSubscriber, ListenerRegistry};
use crate::meta::{FileMetadataCache, MetadataStore};
use crate::naming::{IdenticalNaming, NamingStrategy};

// -----------------------------------------------------------------------------
// EngineBuilder

/// Assembles an [`Engine`] from host configuration.
///
/// Handler packs and subscribers are applied in the order they were added,
/// which is what decides the winner when two packs register for the same
/// type. [`build`](Self::build) provisions the cache directory and freezes
/// everything; the engine is immutable afterward.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use stratum_engine::{CamelCaseNaming, EngineBuilder};
///
/// # fn run() -> Result<(), stratum_engine::EngineError> {
/// let engine = EngineBuilder::new("/var/cache/app/serializer")
///     .naming(Arc::new(CamelCaseNaming))
///     .debug(cfg!(debug_assertions))
///     .build()?;
/// # Ok(()) }
/// ```
pub struct EngineBuilder {
    cache_dir: PathBuf,
    debug: bool,
    naming: Arc<dyn NamingStrategy>,
    packs: Vec<Box<dyn HandlerPack>>,
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EngineBuilder {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            debug: false,
            naming: Arc::new(IdenticalNaming),
            packs: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Debug mode bypasses the on-disk metadata cache and rewrites it on
    /// every resolution.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the naming strategy. Defaults to [`IdenticalNaming`].
    pub fn naming(mut self, naming: Arc<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    /// Appends a handler pack. Later packs win conflicts.
    pub fn handlers(mut self, pack: impl HandlerPack + 'static) -> Self {
        self.packs.push(Box::new(pack));
        self
    }

    /// Appends a lifecycle subscriber. Subscribers fire in this order.
    pub fn subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Provisions the cache directory and freezes the engine.
    pub fn build(self) -> Result<Engine, InitError> {
        let cache = FileMetadataCache::new(self.cache_dir);
        provision(&cache)?;

        let mut handlers = HandlerRegistry::new();
        for pack in &self.packs {
            pack.configure(&mut handlers);
        }

        let mut listeners = ListenerRegistry::new();
        for subscriber in self.subscribers {
            listeners.subscribe(subscriber);
        }

        debug!(cache_dir = %cache.root().display(), debug_mode = self.debug, "engine built");

        let store = MetadataStore::new(self.naming, cache, self.debug);
        Ok(Engine::new(Arc::new(EngineBase {
            store,
            handlers,
            listeners,
        })))
    }
}

/// Creates the cache directories and proves they are writable. An unusable
/// cache directory fails the build; the engine never falls back to running
/// without its cache.
fn provision(cache: &FileMetadataCache) -> Result<(), InitError> {
    let dir = cache.metadata_dir();
    fs::create_dir_all(dir).map_err(|err| InitError::CacheDir {
        path: dir.to_owned(),
        source: err,
    })?;

    let probe = dir.join(".writable");
    fs::write(&probe, b"").map_err(|err| InitError::CacheDir {
        path: dir.to_owned(),
        source: err,
    })?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::EngineBuilder;

    #[test]
    fn build_provisions_the_cache_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("serializer");
        let engine = EngineBuilder::new(&root).build().unwrap();

        assert!(root.join("metadata").is_dir());
        drop(engine);
    }

    #[test]
    fn unusable_cache_directory_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        assert!(EngineBuilder::new(&blocker).build().is_err());
    }
}
