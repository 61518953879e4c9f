//! Hierarchical sampling preset store.
//!
//! One JSON document per process, file-backed and cached in memory, holds
//! every preset namespace. The document store owns durability and the cache;
//! the preset store layers single-path lookups and nested updates on top;
//! bootstrap seeds the user copy on first run.

pub mod bootstrap;
mod document;
mod store;

pub use document::{ConfigDocument, DocumentStore, ParameterSet};
pub use store::{DEFAULT_KEY, MODEL_PRESETS, PresetStore, SLUG_PRESETS};
