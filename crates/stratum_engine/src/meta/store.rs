use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use stratum_reflect::ClassDecl;
use tracing::{debug, warn};

use crate::error::MetadataError;
use crate::meta::cache::{CacheEntry, CacheScope, CachedProperty, FileMetadataCache};
use crate::meta::metadata::ClassMetadata;
use crate::meta::resolve::{resolve, resolve_named};
use crate::naming::NamingStrategy;

// -----------------------------------------------------------------------------
// MetadataStore

/// Memoizing front of metadata resolution.
///
/// Each class resolves at most once per store; later lookups hit the
/// in-memory map. Resolved results are mirrored to the disk cache, and a
/// still-valid disk entry from an earlier process pins the serialized names
/// it recorded. In debug mode the disk cache is bypassed and rewritten on
/// every resolution, so attribute edits take effect immediately.
pub struct MetadataStore {
    naming: Arc<dyn NamingStrategy>,
    cache: FileMetadataCache,
    debug: bool,
    classes: RwLock<HashMap<TypeId, Arc<ClassMetadata>>>,
    resolutions: AtomicUsize,
}

impl MetadataStore {
    pub(crate) fn new(
        naming: Arc<dyn NamingStrategy>,
        cache: FileMetadataCache,
        debug: bool,
    ) -> Self {
        Self {
            naming,
            cache,
            debug,
            classes: RwLock::new(HashMap::new()),
            resolutions: AtomicUsize::new(0),
        }
    }

    /// The disk cache backing this store.
    pub fn cache(&self) -> &FileMetadataCache {
        &self.cache
    }

    /// How many classes have gone through full resolution, as opposed to
    /// being served from the in-memory map.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Returns the resolved metadata for a class, resolving and caching it
    /// on first access.
    pub fn metadata(
        &self,
        decl: &'static ClassDecl,
    ) -> Result<Arc<ClassMetadata>, MetadataError> {
        let type_id = (decl.type_id)();
        {
            let classes = self.classes.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(meta) = classes.get(&type_id) {
                return Ok(Arc::clone(meta));
            }
        }

        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        // Raced against another resolver of the same class.
        if let Some(meta) = classes.get(&type_id) {
            return Ok(Arc::clone(meta));
        }

        let meta = Arc::new(self.resolve_uncached(decl)?);
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        classes.insert(type_id, Arc::clone(&meta));
        Ok(meta)
    }

    /// Drops all memoized metadata and flushes the disk cache.
    pub fn clear(&self, scope: CacheScope) -> Result<(), MetadataError> {
        self.classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.cache.clear(scope)?;
        debug!(?scope, "metadata cache cleared");
        Ok(())
    }

    fn resolve_uncached(
        &self,
        decl: &'static ClassDecl,
    ) -> Result<ClassMetadata, MetadataError> {
        if !self.debug {
            if let Some(entry) = self.cache.load(decl.ident)? {
                if entry_matches(&entry, decl) {
                    debug!(class = decl.ident, "metadata served from disk cache");
                    let mut names = entry.properties.iter().map(|p| p.serialized_name.clone());
                    return resolve_named(decl, |_| {
                        names.next().unwrap_or_default()
                    });
                }
                warn!(
                    class = decl.ident,
                    "stale metadata cache entry discarded, declaration changed"
                );
            }
        }

        let meta = resolve(decl, self.naming.as_ref())?;
        self.cache.store(decl.ident, &entry_from(&meta))?;
        debug!(class = decl.ident, "metadata resolved and cached");
        Ok(meta)
    }
}

/// A disk entry is valid only if it describes the same field table the
/// declaration does now: same idents, same field names in order, same
/// groups.
fn entry_matches(entry: &CacheEntry, decl: &'static ClassDecl) -> bool {
    entry.ident == decl.ident
        && entry.properties.len() == decl.fields.len()
        && entry
            .properties
            .iter()
            .zip(decl.fields)
            .all(|(cached, field)| {
                cached.name == field.name && cached.groups == field.groups
            })
}

fn entry_from(meta: &ClassMetadata) -> CacheEntry {
    CacheEntry {
        ident: meta.ident.to_owned(),
        properties: meta
            .properties
            .iter()
            .map(|p| CachedProperty {
                name: p.name.to_owned(),
                serialized_name: p.serialized_name.clone(),
                groups: p.groups.iter().map(|g| (*g).to_owned()).collect(),
            })
            .collect(),
    }
}
