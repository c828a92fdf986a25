//! Persisted matcher settings.
//!
//! Settings are stored as JSON, by default under the user's config
//! directory, and every field has a default so a missing file or a partial
//! file still yields a working configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration for index building and querying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory of the catalog images to index.
    pub inventory_dir: PathBuf,
    /// Location of the persisted embedding matrix artifact.
    pub matrix_path: PathBuf,
    /// Location of the persisted metadata artifact.
    pub metadata_path: PathBuf,
    /// Number of images sent to the provider per call.
    pub batch_size: usize,
    /// Default number of results returned by a query.
    pub top_k: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inventory_dir: PathBuf::from("data/inventory"),
            matrix_path: PathBuf::from("data/inventory_embeddings.bin"),
            metadata_path: PathBuf::from("data/inventory_metadata.json"),
            batch_size: 32,
            top_k: 5,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Loads settings from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> io::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes settings as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Default settings file location under the user config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vismatch")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }
}
