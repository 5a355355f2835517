use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

// -----------------------------------------------------------------------------
// CacheScope

/// Which cache-flush commands reach the metadata cache.
///
/// Both scopes flush resolved metadata; `All` additionally wipes anything
/// else living under the cache root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    All,
    System,
}

// -----------------------------------------------------------------------------
// Cache entries

/// The persisted form of one resolved class: exactly the parts that are not
/// recoverable from the static declaration alone plus enough of it to detect
/// a stale entry.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CacheEntry {
    pub ident: String,
    pub properties: Vec<CachedProperty>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CachedProperty {
    pub name: String,
    pub serialized_name: String,
    pub groups: Vec<String>,
}

// -----------------------------------------------------------------------------
// FileMetadataCache

/// On-disk mirror of resolved metadata, one JSON file per class under
/// `<root>/metadata`.
///
/// The mirror is advisory: a missing or stale entry just means the class is
/// resolved again. Only I/O failures are reported as errors.
#[derive(Debug)]
pub struct FileMetadataCache {
    root: PathBuf,
    metadata_dir: PathBuf,
}

impl FileMetadataCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let metadata_dir = root.join("metadata");
        Self { root, metadata_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    fn entry_path(&self, ident: &str) -> PathBuf {
        // Idents may contain path-hostile characters (`::`, `.`); flatten
        // them so every class maps to a single flat file.
        let sanitized: String = ident
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.metadata_dir.join(format!("{sanitized}.json"))
    }

    pub(crate) fn load(
        &self,
        class: &'static str,
    ) -> Result<Option<CacheEntry>, MetadataError> {
        let path = self.entry_path(class);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(MetadataError::CacheRead { class, source: err }),
        };
        let entry = serde_json::from_slice(&raw)
            .map_err(|err| MetadataError::CacheCorrupt { class, source: err })?;
        Ok(Some(entry))
    }

    pub(crate) fn store(
        &self,
        class: &'static str,
        entry: &CacheEntry,
    ) -> Result<(), MetadataError> {
        fs::create_dir_all(&self.metadata_dir)
            .map_err(|err| MetadataError::CacheWrite { class, source: err })?;
        let raw = serde_json::to_vec_pretty(entry).map_err(|err| MetadataError::CacheWrite {
            class,
            source: io::Error::from(err),
        })?;
        fs::write(self.entry_path(class), raw)
            .map_err(|err| MetadataError::CacheWrite { class, source: err })
    }

    pub(crate) fn clear(&self, scope: CacheScope) -> Result<(), MetadataError> {
        let dir = match scope {
            CacheScope::All => &self.root,
            CacheScope::System => &self.metadata_dir,
        };
        match fs::remove_dir_all(dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(MetadataError::CacheClear {
                    path: dir.clone(),
                    source: err,
                });
            }
        }
        fs::create_dir_all(dir).map_err(|err| MetadataError::CacheClear {
            path: dir.clone(),
            source: err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheEntry, CacheScope, CachedProperty, FileMetadataCache};

    fn sample_entry() -> CacheEntry {
        CacheEntry {
            ident: "tests.Sample".to_owned(),
            properties: vec![CachedProperty {
                name: "id".to_owned(),
                serialized_name: "id".to_owned(),
                groups: vec!["list".to_owned()],
            }],
        }
    }

    #[test]
    fn missing_entry_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileMetadataCache::new(dir.path());
        assert!(cache.load("tests.Nope").unwrap().is_none());
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileMetadataCache::new(dir.path());
        cache.store("tests.Sample", &sample_entry()).unwrap();

        let loaded = cache.load("tests.Sample").unwrap().unwrap();
        assert_eq!(loaded.ident, "tests.Sample");
        assert_eq!(loaded.properties[0].groups, ["list"]);
    }

    #[test]
    fn clear_drops_stored_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileMetadataCache::new(dir.path());
        cache.store("tests.Sample", &sample_entry()).unwrap();

        cache.clear(CacheScope::System).unwrap();
        assert!(cache.load("tests.Sample").unwrap().is_none());
    }

    #[test]
    fn corrupt_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileMetadataCache::new(dir.path());
        std::fs::create_dir_all(cache.metadata_dir()).unwrap();
        std::fs::write(cache.metadata_dir().join("tests_Bad.json"), b"{ nope").unwrap();

        assert!(cache.load("tests.Bad").is_err());
    }
}
