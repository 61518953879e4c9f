//! File-backed storage for the preset document.
//!
//! The store owns the durable file, the in-process cache, and the single
//! writer lock. Readers get the last-published snapshot without blocking;
//! every write replaces the durable file atomically (temp file + rename), so
//! a concurrent reader in any process sees either the old or the new
//! document, never a partial one. Cross-process cache coherency is not
//! provided; [`DocumentStore::reload`] is the escape hatch.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PresetError, PresetResult};

/// The entire persisted configuration. Top-level keys are namespaces.
pub type ConfigDocument = serde_json::Map<String, Value>;

/// Flat set of named sampling parameters resolved for a request.
pub type ParameterSet = serde_json::Map<String, Value>;

/// Single source of truth for the preset document's durable representation
/// and its in-memory cache.
pub struct DocumentStore {
    path: PathBuf,
    cache: ArcSwapOption<ConfigDocument>,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: ArcSwapOption::const_empty(),
            write_lock: Mutex::new(()),
        }
    }

    /// Durable path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document snapshot, lock-free once cached.
    ///
    /// The first call reads and parses the durable file. Cache population
    /// runs under the write lock and re-checks the cache, so a racing
    /// `persist` is never overwritten by a stale disk read.
    pub fn load(&self) -> PresetResult<Arc<ConfigDocument>> {
        if let Some(doc) = self.cache.load_full() {
            return Ok(doc);
        }

        let _guard = self.write_lock.lock().unwrap();
        if let Some(doc) = self.cache.load_full() {
            return Ok(doc);
        }

        let doc = Arc::new(self.read_from_disk()?);
        self.cache.store(Some(doc.clone()));
        debug!(path = %self.path.display(), "Preset config loaded");
        Ok(doc)
    }

    /// Re-read the durable file, bypassing the cache, and publish the result.
    pub fn reload(&self) -> PresetResult<Arc<ConfigDocument>> {
        let _guard = self.write_lock.lock().unwrap();
        let doc = Arc::new(self.read_from_disk()?);
        self.cache.store(Some(doc.clone()));
        Ok(doc)
    }

    /// Serialize `doc`, atomically replace the durable file, then publish
    /// `doc` as the cached snapshot.
    ///
    /// On failure the durable file keeps its previous content and the cache
    /// is left unchanged.
    pub fn persist(&self, doc: ConfigDocument) -> PresetResult<Arc<ConfigDocument>> {
        let _guard = self.write_lock.lock().unwrap();
        self.write_and_publish(doc)
    }

    /// Read-modify-write under a single exclusion scope: load the current
    /// document, apply `mutate` to a copy, persist, publish.
    pub fn update<F>(&self, mutate: F) -> PresetResult<Arc<ConfigDocument>>
    where
        F: FnOnce(&mut ConfigDocument) -> PresetResult<()>,
    {
        let _guard = self.write_lock.lock().unwrap();

        let mut doc = match self.cache.load_full() {
            Some(current) => current.as_ref().clone(),
            None => self.read_from_disk()?,
        };
        mutate(&mut doc)?;
        self.write_and_publish(doc)
    }

    fn read_from_disk(&self) -> PresetResult<ConfigDocument> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PresetError::Missing {
                    path: self.path.clone(),
                }
            } else {
                PresetError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| PresetError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Caller must hold `write_lock`.
    fn write_and_publish(&self, doc: ConfigDocument) -> PresetResult<Arc<ConfigDocument>> {
        let write_err = |source: std::io::Error| PresetError::Write {
            path: self.path.clone(),
            source,
        };

        // Keep the document human-editable: pretty-printed JSON text
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| write_err(std::io::Error::other(e)))?;

        // Temp file in the same directory so the rename stays on one filesystem
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        let doc = Arc::new(doc);
        self.cache.store(Some(doc.clone()));
        debug!(path = %self.path.display(), "Preset config persisted");
        Ok(doc)
    }
}
