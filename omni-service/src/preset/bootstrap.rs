//! First-run seeding of the user preset document.
//!
//! The document store never creates its own file; this runs before the store
//! is first read and guarantees a user-writable copy exists.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PresetError, PresetResult};

/// Packaged default preset document, written on first run.
const DEFAULT_CONFIG: &str = include_str!("default_config.json");

/// File name of the durable preset document inside the preset directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default per-user preset directory (`~/.omni`).
pub fn default_preset_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".omni")
}

/// Guarantee a user preset document exists at `dir/config.json`, seeding it
/// from the packaged default. An existing file is never touched.
pub fn ensure_user_config(dir: &Path) -> PresetResult<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        debug!(path = %path.display(), "User preset config found");
        return Ok(path);
    }

    let write_err = |source: std::io::Error| PresetError::Write {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;
    std::fs::write(&path, DEFAULT_CONFIG).map_err(write_err)?;
    info!(path = %path.display(), "Seeded default preset config");
    Ok(path)
}
