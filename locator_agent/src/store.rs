//! Durable fingerprint → descriptor cache.
//!
//! One JSON file per named store. Every mutation rewrites the whole file.

use crate::error::LocatorResult;
use crate::persist::{read_optional, write_json_atomic};
use locator_types::{Fingerprint, LocatorDescriptor};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default store name.
pub const DEFAULT_STORE_NAME: &str = "locatorCache";

/// Named, file-backed locator cache.
///
/// # Resolution flow
/// 1. The resolver computes a [`Fingerprint`] and calls [`get`](Self::get).
/// 2. On a miss it infers a descriptor and [`put`](Self::put)s it.
/// 3. When a cached selector proves stale it is [`delete`](Self::delete)d
///    before one re-inference.
///
/// No file locking is done. Two processes writing the same store can lose
/// each other's updates.
#[derive(Debug)]
pub struct LocatorCacheStore {
    dir: PathBuf,
    name: String,
    entries: BTreeMap<String, LocatorDescriptor>,
    hits: u64,
    misses: u64,
}

impl LocatorCacheStore {
    /// Open the store `<dir>/<name>.json`.
    pub fn open_named(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let mut store = Self {
            dir: dir.into(),
            name: name.into(),
            entries: BTreeMap::new(),
            hits: 0,
            misses: 0,
        };
        store.reload();
        store
    }

    /// Open the store backed by `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string());

        Self::open_named(dir, name)
    }

    /// Backing file of the active store.
    pub fn path(&self) -> PathBuf {
        if self.name.ends_with(".json") {
            self.dir.join(&self.name)
        } else {
            self.dir.join(format!("{}.json", self.name))
        }
    }

    /// Name of the active store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Switch to another named store in the same directory.
    ///
    /// In-memory entries and statistics are discarded and the new store is
    /// loaded from disk. Nothing is merged.
    pub fn switch_store(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.hits = 0;
        self.misses = 0;
        self.reload();
        log::debug!(
            "switched locator store to {} ({} entries)",
            self.path().display(),
            self.entries.len()
        );
    }

    fn reload(&mut self) {
        let path = self.path();
        self.entries = load_entries(&path);
    }

    /// Look up a descriptor.
    pub fn get(&mut self, fingerprint: &Fingerprint) -> Option<LocatorDescriptor> {
        match self.entries.get(fingerprint.as_str()) {
            Some(descriptor) => {
                self.hits += 1;
                Some(descriptor.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up without touching statistics.
    pub fn peek(&self, fingerprint: &Fingerprint) -> Option<&LocatorDescriptor> {
        self.entries.get(fingerprint.as_str())
    }

    /// Insert or overwrite an entry and persist.
    pub fn put(
        &mut self,
        fingerprint: &Fingerprint,
        descriptor: LocatorDescriptor,
    ) -> LocatorResult<()> {
        self.entries.insert(fingerprint.as_str().to_string(), descriptor);
        self.persist()
    }

    /// Remove an entry and persist. Returns whether it existed.
    pub fn delete(&mut self, fingerprint: &Fingerprint) -> LocatorResult<bool> {
        let existed = self.entries.remove(fingerprint.as_str()).is_some();
        if existed {
            self.persist()?;
        }
        Ok(existed)
    }

    /// Remove every entry and persist.
    pub fn clear(&mut self) -> LocatorResult<()> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> LocatorResult<()> {
        write_json_atomic(&self.path(), &self.entries)
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LocatorDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup statistics since the store was opened or switched.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entry_count: self.entries.len(),
            hit_rate: if self.hits + self.misses > 0 {
                self.hits as f64 / (self.hits + self.misses) as f64
            } else {
                0.0
            },
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries in cache.
    pub entry_count: usize,
    /// Hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Load a store file, skipping entries that are not descriptors.
fn load_entries(path: &Path) -> BTreeMap<String, LocatorDescriptor> {
    let text = match read_optional(path) {
        Ok(Some(text)) => text,
        Ok(None) => return BTreeMap::new(),
        Err(e) => {
            log::warn!("could not read locator store {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&text) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("could not parse locator store {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    raw.into_iter()
        .filter_map(|(key, value)| {
            if value.is_null() {
                log::debug!("skipping null entry in {}", path.display());
                return None;
            }
            match serde_json::from_value::<LocatorDescriptor>(value) {
                Ok(descriptor) if descriptor.is_cacheable() => Some((key, descriptor)),
                _ => {
                    log::debug!("skipping malformed entry in {}", path.display());
                    None
                }
            }
        })
        .collect()
}
