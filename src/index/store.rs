//! Durable storage for the embedding index.
//!
//! The index persists as two artifacts: the dense matrix (bincode) and the
//! aligned metadata sequence (human-readable JSON). The pair is not written
//! transactionally; `load` detects a half-written pair through the row/item
//! count invariant and degrades to absent instead of trusting it.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

use super::EmbeddingIndex;
use crate::domain::InventoryItem;

/// Errors that can occur while persisting the index.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Matrix artifact could not be encoded.
    #[error("matrix encoding failed: {0}")]
    Matrix(#[from] bincode::Error),

    /// Metadata artifact could not be encoded.
    #[error("metadata encoding failed: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reads and writes the on-disk index artifacts.
#[derive(Debug, Clone)]
pub struct IndexStore {
    matrix_path: PathBuf,
    metadata_path: PathBuf,
}

impl IndexStore {
    /// Creates a store over the given artifact locations.
    pub fn new(matrix_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            matrix_path: matrix_path.into(),
            metadata_path: metadata_path.into(),
        }
    }

    /// Path of the matrix artifact.
    pub fn matrix_path(&self) -> &Path {
        &self.matrix_path
    }

    /// Path of the metadata artifact.
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Writes both artifacts, creating parent directories as needed.
    ///
    /// The two writes are not atomic as a pair; a crash in between leaves
    /// artifacts that the next [`IndexStore::load`] will reject.
    pub fn save(&self, index: &EmbeddingIndex) -> StoreResult<()> {
        for path in [&self.matrix_path, &self.metadata_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let matrix_bytes = bincode::serialize(index.matrix())?;
        fs::write(&self.matrix_path, matrix_bytes)?;

        let metadata_json = serde_json::to_vec_pretty(index.items())?;
        fs::write(&self.metadata_path, metadata_json)?;

        tracing::info!(
            items = index.len(),
            dimension = index.dimension(),
            matrix = %self.matrix_path.display(),
            metadata = %self.metadata_path.display(),
            "index persisted"
        );
        Ok(())
    }

    /// Loads the index if both artifacts exist and agree.
    ///
    /// Any decode failure or count mismatch is logged and reported as
    /// absent: a corrupt or stale cache must only force a rebuild, never
    /// crash the system.
    pub fn load(&self) -> Option<EmbeddingIndex> {
        if !self.matrix_path.exists() || !self.metadata_path.exists() {
            return None;
        }

        let index = match self.try_load() {
            Ok(index) => index,
            Err(reason) => {
                tracing::warn!(
                    matrix = %self.matrix_path.display(),
                    metadata = %self.metadata_path.display(),
                    %reason,
                    "discarding cached index"
                );
                return None;
            }
        };

        tracing::info!(
            items = index.len(),
            dimension = index.dimension(),
            "loaded cached index"
        );
        Some(index)
    }

    fn try_load(&self) -> Result<EmbeddingIndex, String> {
        let matrix_bytes = fs::read(&self.matrix_path).map_err(|e| e.to_string())?;
        let matrix: Array2<f32> =
            bincode::deserialize(&matrix_bytes).map_err(|e| e.to_string())?;

        let metadata_bytes = fs::read(&self.metadata_path).map_err(|e| e.to_string())?;
        let items: Vec<InventoryItem> =
            serde_json::from_slice(&metadata_bytes).map_err(|e| e.to_string())?;

        EmbeddingIndex::new(matrix, items).map_err(|e| e.to_string())
    }
}
