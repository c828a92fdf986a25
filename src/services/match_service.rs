//! Matching service: builds the embedding index and answers queries.
//!
//! Orchestrates enumeration, batched provider calls, normalization, and
//! persistence, and serves top-k similarity queries from the in-memory
//! index. The service owns the only [`EmbeddingIndex`] instance; a rebuild
//! assembles a complete replacement before the old one is discarded.

use std::path::{Path, PathBuf};

use ndarray::{Array2, Axis};
use thiserror::Error;

use crate::config::Settings;
use crate::domain::{InventoryItem, MatchResult};
use crate::embedding::{preprocess, vector, EmbeddingProvider};
use crate::embedding::preprocess::PreprocessError;
use crate::embedding::provider::ProviderError;
use crate::index::{EmbeddingIndex, IndexStore, ShapeMismatch, StoreError};
use crate::inventory;

/// Errors surfaced by build and query operations.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A required path (inventory root or query image) does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// A build found zero eligible images under the inventory root.
    #[error("no images found under {0}")]
    EmptyInventory(PathBuf),

    /// A query was attempted before any index was built or loaded.
    #[error("index not ready; run a build or load a cached index first")]
    NotReady,

    /// The provider's output did not match the expected shape.
    #[error("embedding validation failed: {0}")]
    Validation(String),

    /// Matrix rows and metadata entries disagree.
    #[error(transparent)]
    Shape(#[from] ShapeMismatch),

    /// The embedding provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// An image could not be turned into a provider input.
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Other filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for matching operations.
pub type MatchResultSet = Result<Vec<MatchResult>, MatchError>;

/// Builds and queries the visual similarity index for an inventory.
pub struct MatchService {
    provider: Box<dyn EmbeddingProvider>,
    store: IndexStore,
    inventory_root: PathBuf,
    index: Option<EmbeddingIndex>,
}

impl MatchService {
    /// Creates a service over the given provider and settings.
    ///
    /// Fails when the inventory root is missing. If both index artifacts
    /// exist and are consistent the cached index is loaded; a corrupt cache
    /// is discarded with a warning and the service starts absent.
    pub fn new(
        provider: Box<dyn EmbeddingProvider>,
        settings: &Settings,
    ) -> Result<Self, MatchError> {
        if !settings.inventory_dir.exists() {
            return Err(MatchError::NotFound(settings.inventory_dir.clone()));
        }

        let store = IndexStore::new(&settings.matrix_path, &settings.metadata_path);
        let index = store.load();

        Ok(Self {
            provider,
            store,
            inventory_root: settings.inventory_dir.clone(),
            index,
        })
    }

    /// Returns whether an index is resident.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Number of indexed items, or 0 when no index is loaded.
    pub fn item_count(&self) -> usize {
        self.index.as_ref().map_or(0, EmbeddingIndex::len)
    }

    /// Extracts embeddings for every inventory image and persists the index.
    ///
    /// With an index already resident and `overwrite` false this is an
    /// idempotent no-op returning the current count. Otherwise images are
    /// processed in groups of `batch_size`, one provider call per group,
    /// each returned vector L2-normalized independently. Any failure aborts
    /// the whole build and leaves the previous index untouched.
    pub fn build(&mut self, batch_size: usize, overwrite: bool) -> Result<usize, MatchError> {
        if let Some(index) = &self.index {
            if !overwrite {
                return Ok(index.len());
            }
        }

        let paths: Vec<PathBuf> = inventory::enumerate_images(&self.inventory_root)?.collect();
        if paths.is_empty() {
            return Err(MatchError::EmptyInventory(self.inventory_root.clone()));
        }

        tracing::info!(
            images = paths.len(),
            batch_size,
            model = self.provider.model(),
            "building inventory index"
        );

        let input_size = self.provider.input_size();
        let scaling = self.provider.scaling();
        let dimension = self.provider.dimension();

        let mut blocks: Vec<Array2<f32>> = Vec::new();
        let mut items: Vec<InventoryItem> = Vec::with_capacity(paths.len());

        let batch_size = batch_size.max(1);
        for group in paths.chunks(batch_size) {
            let tensors = group
                .iter()
                .map(|path| preprocess::load_input(path, input_size, scaling))
                .collect::<Result<Vec<_>, _>>()?;
            let batch = preprocess::batch(&tensors)?;

            let mut embeddings = self.provider.embed_batch(&batch)?;
            validate_output(&embeddings, group.len(), dimension)?;
            vector::normalize_rows(&mut embeddings);
            blocks.push(embeddings);

            for path in group {
                let resolved = path.canonicalize()?;
                items.push(InventoryItem::from_path(resolved));
            }
        }

        let views: Vec<_> = blocks.iter().map(Array2::view).collect();
        let matrix = ndarray::concatenate(Axis(0), &views)
            .map_err(|e| MatchError::Validation(format!("batch concatenation failed: {e}")))?;

        let index = EmbeddingIndex::new(matrix, items)?;
        self.store.save(&index)?;

        let count = index.len();
        self.index = Some(index);
        tracing::info!(items = count, "inventory index ready");
        Ok(count)
    }

    /// Returns the `top_k` inventory items most similar to the query image.
    ///
    /// The query goes through the exact preprocessing and normalization used
    /// during the build. Results carry 1-based ranks and raw cosine
    /// similarities, descending; asking for more than the indexed count
    /// returns everything.
    pub fn find_similar(&self, query_image: &Path, top_k: usize) -> MatchResultSet {
        let index = self.index.as_ref().ok_or(MatchError::NotReady)?;
        if !query_image.exists() {
            return Err(MatchError::NotFound(query_image.to_path_buf()));
        }

        let tensor = preprocess::load_input(
            query_image,
            self.provider.input_size(),
            self.provider.scaling(),
        )?;
        let batch = preprocess::batch(std::slice::from_ref(&tensor))?;

        let embeddings = self.provider.embed_batch(&batch)?;
        validate_output(&embeddings, 1, self.provider.dimension())?;

        let mut query = embeddings.row(0).to_owned();
        vector::normalize(&mut query);

        if query.len() != index.dimension() {
            return Err(MatchError::Validation(format!(
                "query dimension {} does not match index dimension {}; rebuild the index",
                query.len(),
                index.dimension()
            )));
        }

        let results = index
            .rank(query.view(), top_k)
            .into_iter()
            .zip(1..)
            .map(|((row, similarity), rank)| {
                let item = &index.items()[row];
                MatchResult {
                    rank,
                    name: item.name.clone(),
                    similarity,
                    path: item.path.clone(),
                }
            })
            .collect();

        Ok(results)
    }
}

fn validate_output(
    embeddings: &Array2<f32>,
    expected_rows: usize,
    dimension: usize,
) -> Result<(), MatchError> {
    if embeddings.nrows() != expected_rows {
        return Err(MatchError::Validation(format!(
            "provider returned {} vectors for {} images",
            embeddings.nrows(),
            expected_rows
        )));
    }
    if embeddings.ncols() != dimension {
        return Err(MatchError::Validation(format!(
            "provider returned dimension {} but declared {}",
            embeddings.ncols(),
            dimension
        )));
    }
    Ok(())
}
