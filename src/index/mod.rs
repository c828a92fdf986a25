//! The in-memory embedding index.
//!
//! An [`EmbeddingIndex`] pairs an N×D matrix of unit-normalized embeddings
//! with N aligned [`InventoryItem`] records: row *i* and item *i* describe
//! the same catalog entry. The aggregate is constructed whole and replaced
//! whole; there is no partial-row update.

mod store;

pub use store::{IndexStore, StoreError, StoreResult};

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

use crate::domain::InventoryItem;

/// Rows and metadata entries disagree; the aggregate invariant is violated.
#[derive(Debug, Error)]
#[error("matrix rows ({rows}) do not match metadata entries ({items})")]
pub struct ShapeMismatch {
    /// Row count of the embedding matrix.
    pub rows: usize,
    /// Length of the metadata sequence.
    pub items: usize,
}

/// An immutable matrix of embeddings with aligned item metadata.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    matrix: Array2<f32>,
    items: Vec<InventoryItem>,
}

impl EmbeddingIndex {
    /// Builds an index from a matrix and aligned metadata.
    ///
    /// Fails when the row count and metadata length disagree; a loaded index
    /// always satisfies `matrix.nrows() == items.len()`.
    pub fn new(matrix: Array2<f32>, items: Vec<InventoryItem>) -> Result<Self, ShapeMismatch> {
        if matrix.nrows() != items.len() {
            return Err(ShapeMismatch {
                rows: matrix.nrows(),
                items: items.len(),
            });
        }
        Ok(Self { matrix, items })
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Embedding dimension of the matrix.
    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    /// The indexed metadata, in row order.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// The embedding matrix.
    pub fn matrix(&self) -> &Array2<f32> {
        &self.matrix
    }

    /// Scores a unit-normalized query against every row and returns the
    /// `top_k` best as `(row, similarity)` pairs, descending by similarity.
    ///
    /// Both operands are unit vectors, so the dot product is cosine
    /// similarity. Ties order by ascending row, which keeps results stable
    /// across runs. Asking for more than `len()` results returns them all.
    pub fn rank(&self, query: ArrayView1<f32>, top_k: usize) -> Vec<(usize, f32)> {
        let scores = self.matrix.dot(&query);

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top_k);
        ranked
    }
}
