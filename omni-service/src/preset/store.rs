//! Preset lookup and mutation over the shared document store.
//!
//! Every lookup is a single exact-path probe; a missing entry is a silent
//! empty parameter set, never an error. Fallback composition (mode, then
//! group default, then namespace default) is a caller policy; the resolve
//! handler in the API layer holds the canonical chain.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::document::{ConfigDocument, DocumentStore, ParameterSet};
use crate::error::{PresetError, PresetResult};

/// Namespace holding model-keyed presets.
pub const MODEL_PRESETS: &str = "preset";

/// Namespace holding UI-slug-keyed presets.
pub const SLUG_PRESETS: &str = "slug_preset";

/// Reserved key naming the fallback entry of its level, in every namespace
/// and at both group and mode depth.
pub const DEFAULT_KEY: &str = "default";

/// Resolves sampling parameter sets and applies nested preset updates.
///
/// Stateless apart from the document cache it reads through the store; one
/// instance per process, shared by reference.
pub struct PresetStore {
    documents: DocumentStore,
}

impl PresetStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            documents: DocumentStore::new(path),
        }
    }

    /// Durable path of the preset document.
    pub fn path(&self) -> &Path {
        self.documents.path()
    }

    /// Full current document snapshot.
    pub fn document(&self) -> PresetResult<Arc<ConfigDocument>> {
        self.documents.load()
    }

    /// Re-read the document from disk, bypassing the cache.
    pub fn reload(&self) -> PresetResult<Arc<ConfigDocument>> {
        self.documents.reload()
    }

    /// `document[namespace][group]`: the preset for a specific model or slug.
    pub fn group_params(&self, namespace: &str, group: &str) -> PresetResult<ParameterSet> {
        let doc = self.documents.load()?;
        Ok(lookup(&doc, &[namespace, group]))
    }

    /// `document[namespace][group][mode]`: the preset for a sub-mode.
    pub fn mode_params(
        &self,
        namespace: &str,
        group: &str,
        mode: &str,
    ) -> PresetResult<ParameterSet> {
        let doc = self.documents.load()?;
        Ok(lookup(&doc, &[namespace, group, mode]))
    }

    /// The namespace-wide fallback, independent of group and mode.
    pub fn namespace_default(&self, namespace: &str) -> PresetResult<ParameterSet> {
        let doc = self.documents.load()?;
        Ok(lookup(&doc, &[namespace, DEFAULT_KEY]))
    }

    /// The group-wide fallback, used when a requested mode has no entry.
    pub fn group_default(&self, namespace: &str, group: &str) -> PresetResult<ParameterSet> {
        let doc = self.documents.load()?;
        Ok(lookup(&doc, &[namespace, group, DEFAULT_KEY]))
    }

    /// Set the value at `key_path`, creating intermediate objects for absent
    /// keys, and persist the document.
    ///
    /// Fails with [`PresetError::InvalidKeyPath`] on an empty path and with
    /// [`PresetError::KeyPathConflict`] when an intermediate key already
    /// holds a non-object value. Overwriting the leaf itself is allowed.
    pub fn update_entry(&self, key_path: &[String], value: Value) -> PresetResult<()> {
        let (last, parents) = key_path.split_last().ok_or(PresetError::InvalidKeyPath)?;

        self.documents.update(|doc| {
            let mut node: &mut ConfigDocument = doc;
            for key in parents {
                let slot = node
                    .entry(key.as_str())
                    .or_insert_with(|| Value::Object(Map::new()));
                node = match slot {
                    Value::Object(map) => map,
                    _ => {
                        return Err(PresetError::KeyPathConflict { key: key.clone() });
                    }
                };
            }
            node.insert(last.clone(), value);
            Ok(())
        })?;

        debug!(key_path = %key_path.join("."), "Preset entry updated");
        Ok(())
    }
}

/// Single exact-path probe. Absence at any level, or a non-object value at
/// the final level, yields an empty parameter set.
fn lookup(doc: &ConfigDocument, path: &[&str]) -> ParameterSet {
    let Some((last, parents)) = path.split_last() else {
        return ParameterSet::new();
    };

    let mut node = doc;
    for key in parents {
        node = match node.get(*key).and_then(Value::as_object) {
            Some(map) => map,
            None => return ParameterSet::new(),
        };
    }

    node.get(*last)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(doc: serde_json::Value) -> (tempfile::TempDir, PresetStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        (dir, PresetStore::open(path))
    }

    fn params(value: serde_json::Value) -> ParameterSet {
        value.as_object().unwrap().clone()
    }

    fn keys(path: &[&str]) -> Vec<String> {
        path.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn model_lookup_prefers_the_specific_entry() {
        let (_dir, store) = store_with(json!({
            "preset": {"default": {"temp": 0.7}, "modelA": {"temp": 0.2}}
        }));

        assert_eq!(
            store.group_params("preset", "modelA").unwrap(),
            params(json!({"temp": 0.2}))
        );
        assert!(store.group_params("preset", "modelB").unwrap().is_empty());
        assert_eq!(
            store.namespace_default("preset").unwrap(),
            params(json!({"temp": 0.7}))
        );
    }

    #[test]
    fn mode_lookup_is_an_exact_path_probe() {
        let (_dir, store) = store_with(json!({
            "slug_preset": {"code": {"architect": {"temp": 0.1}, "default": {"temp": 0.5}}}
        }));

        assert_eq!(
            store.mode_params("slug_preset", "code", "architect").unwrap(),
            params(json!({"temp": 0.1}))
        );
        assert!(
            store
                .mode_params("slug_preset", "code", "unknown_mode")
                .unwrap()
                .is_empty()
        );
        // The caller-composed chain falls back to the group default
        assert_eq!(
            store.group_default("slug_preset", "code").unwrap(),
            params(json!({"temp": 0.5}))
        );
    }

    #[test]
    fn lookups_never_error_for_absent_namespaces() {
        let (_dir, store) = store_with(json!({"preset": {}}));

        assert!(store.group_params("slug_preset", "code").unwrap().is_empty());
        assert!(
            store
                .mode_params("slug_preset", "code", "architect")
                .unwrap()
                .is_empty()
        );
        assert!(store.namespace_default("slug_preset").unwrap().is_empty());
        assert!(store.group_default("slug_preset", "code").unwrap().is_empty());
    }

    #[test]
    fn non_object_group_entry_resolves_empty() {
        let (_dir, store) = store_with(json!({"preset": {"modelA": 3}}));

        assert!(store.group_params("preset", "modelA").unwrap().is_empty());
        assert!(
            store
                .mode_params("preset", "modelA", "fast")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn update_creates_intermediate_levels() {
        let (_dir, store) = store_with(json!({"preset": {}}));

        store
            .update_entry(&keys(&["preset", "modelC", "temp"]), json!(0.9))
            .unwrap();

        assert_eq!(
            store.group_params("preset", "modelC").unwrap(),
            params(json!({"temp": 0.9}))
        );
    }

    #[test]
    fn update_persists_and_leaves_siblings_untouched() {
        let (dir, store) = store_with(json!({
            "preset": {"default": {"temp": 0.7}, "modelA": {"temp": 0.2, "top_p": 0.9}}
        }));

        store
            .update_entry(&keys(&["preset", "modelA", "temp"]), json!(0.3))
            .unwrap();

        // A second store at the same path reads straight from disk
        let fresh = PresetStore::open(dir.path().join("config.json"));
        assert_eq!(
            fresh.group_params("preset", "modelA").unwrap(),
            params(json!({"temp": 0.3, "top_p": 0.9}))
        );
        assert_eq!(
            fresh.namespace_default("preset").unwrap(),
            params(json!({"temp": 0.7}))
        );
    }

    #[test]
    fn update_is_idempotent() {
        let (_dir, store) = store_with(json!({"preset": {"modelA": {"temp": 0.2}}}));
        let path = keys(&["preset", "modelA", "temp"]);

        store.update_entry(&path, json!(0.3)).unwrap();
        let after_first = store.document().unwrap().as_ref().clone();

        store.update_entry(&path, json!(0.3)).unwrap();
        assert_eq!(*store.reload().unwrap(), after_first);
    }

    #[test]
    fn scalar_leaf_overwrite_is_allowed() {
        let (_dir, store) = store_with(json!({"preset": {"modelA": {"temp": 0.2}}}));

        store
            .update_entry(&keys(&["preset", "modelA", "temp"]), json!(0.3))
            .unwrap();

        assert_eq!(
            store.group_params("preset", "modelA").unwrap(),
            params(json!({"temp": 0.3}))
        );
    }

    #[test]
    fn descending_through_a_scalar_is_a_conflict() {
        let (_dir, store) = store_with(json!({"preset": {"modelA": {"temp": 0.2}}}));

        let result = store.update_entry(&keys(&["preset", "modelA", "temp", "nested"]), json!(1));

        assert!(matches!(
            result,
            Err(PresetError::KeyPathConflict { key }) if key == "temp"
        ));
        // The failed update must not have persisted anything
        assert_eq!(
            *store.reload().unwrap(),
            params(json!({"preset": {"modelA": {"temp": 0.2}}}))
        );
    }

    #[test]
    fn empty_key_path_is_rejected() {
        let (_dir, store) = store_with(json!({"preset": {}}));

        assert!(matches!(
            store.update_entry(&[], json!(1)),
            Err(PresetError::InvalidKeyPath)
        ));
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let (dir, store) = store_with(json!({"preset": {}}));
        let store = Arc::new(store);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = store.clone();
                scope.spawn(move || {
                    let path = vec!["preset".to_string(), format!("model{i}"), "temp".to_string()];
                    store.update_entry(&path, json!(i)).unwrap();
                });
            }
        });

        let fresh = PresetStore::open(dir.path().join("config.json"));
        for i in 0..8 {
            assert_eq!(
                fresh.group_params("preset", &format!("model{i}")).unwrap(),
                params(json!({"temp": i}))
            );
        }
    }
}
