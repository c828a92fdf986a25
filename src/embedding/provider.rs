//! Embedding provider boundary.
//!
//! The model that maps image tensors to fixed-length vectors is an external
//! collaborator: the index only depends on this trait. A provider declares
//! its input geometry and required pixel scaling; the builder prepares
//! batches accordingly and calls [`EmbeddingProvider::embed_batch`] once per
//! group of images.

use ndarray::{Array2, Array4};
use thiserror::Error;

/// Errors surfaced by an embedding provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backing model could not run inference.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The model produced no usable output shape.
    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    /// The provider is not ready to embed (e.g. weights not loaded).
    #[error("provider not available: {0}")]
    Unavailable(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Pixel value scaling a provider expects on its input tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelScaling {
    /// Channels scaled to [0, 1].
    Unit,
    /// Channels scaled to [-1, 1], MobileNet style (`x / 127.5 - 1`).
    Symmetric,
}

impl PixelScaling {
    /// Applies the scaling to a single 8-bit channel value.
    pub fn apply(self, value: u8) -> f32 {
        match self {
            PixelScaling::Unit => f32::from(value) / 255.0,
            PixelScaling::Symmetric => f32::from(value) / 127.5 - 1.0,
        }
    }
}

/// A batched image-to-vector embedding model.
///
/// Input is an NCHW tensor of preprocessed pixels; output is one row per
/// input image, with a fixed dimension for the provider's lifetime. Rows are
/// not required to be unit-normalized; the index builder normalizes them.
#[cfg_attr(test, mockall::automock)]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logs and artifacts.
    fn model(&self) -> &str;

    /// Output embedding dimension.
    fn dimension(&self) -> usize;

    /// Expected square input edge in pixels.
    fn input_size(&self) -> u32;

    /// Pixel scaling the provider requires on input tensors.
    fn scaling(&self) -> PixelScaling;

    /// Embeds a batch of images, one output row per input.
    fn embed_batch(&self, batch: &Array4<f32>) -> ProviderResult<Array2<f32>>;
}

/// Deterministic pseudo-embedding provider.
///
/// Derives each vector from a rolling hash of the input tensor, so identical
/// images always embed identically. Stands in for a trained model backend in
/// tests and when no model export is configured; similarity scores over its
/// output carry no visual meaning.
#[derive(Debug, Clone)]
pub struct PixelHashProvider {
    dimension: usize,
    input_size: u32,
}

impl PixelHashProvider {
    /// Creates a provider with the given output dimension and input edge.
    pub fn new(dimension: usize, input_size: u32) -> Self {
        Self {
            dimension,
            input_size,
        }
    }

    /// djb2 over the tensor's raw bits.
    fn tensor_hash(values: &Array4<f32>, image: usize) -> u64 {
        let mut hash: u64 = 5381;
        for value in values.index_axis(ndarray::Axis(0), image).iter() {
            for byte in value.to_bits().to_le_bytes() {
                hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
            }
        }
        hash
    }
}

impl Default for PixelHashProvider {
    fn default() -> Self {
        Self::new(128, 224)
    }
}

impl EmbeddingProvider for PixelHashProvider {
    fn model(&self) -> &str {
        "pixel-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn scaling(&self) -> PixelScaling {
        PixelScaling::Symmetric
    }

    fn embed_batch(&self, batch: &Array4<f32>) -> ProviderResult<Array2<f32>> {
        let count = batch.shape()[0];
        let mut output = Array2::<f32>::zeros((count, self.dimension));

        for i in 0..count {
            let hash = Self::tensor_hash(batch, i);
            for (j, slot) in output.row_mut(i).iter_mut().enumerate() {
                let seed = hash.wrapping_add(j as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                *slot = (seed as f32 / u64::MAX as f32) * 2.0 - 1.0;
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn batch_of(fill: f32, count: usize) -> Array4<f32> {
        Array4::from_elem((count, 3, 4, 4), fill)
    }

    #[test]
    fn hash_provider_reports_its_geometry() {
        let provider = PixelHashProvider::new(64, 224);
        assert_eq!(provider.dimension(), 64);
        assert_eq!(provider.input_size(), 224);
        assert_eq!(provider.model(), "pixel-hash");
    }

    #[test]
    fn hash_provider_is_deterministic() {
        let provider = PixelHashProvider::new(32, 4);
        let a = provider.embed_batch(&batch_of(0.5, 1)).unwrap();
        let b = provider.embed_batch(&batch_of(0.5, 1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_embed_differently() {
        let provider = PixelHashProvider::new(32, 4);
        let a = provider.embed_batch(&batch_of(0.5, 1)).unwrap();
        let b = provider.embed_batch(&batch_of(-0.5, 1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn one_row_per_input() {
        let provider = PixelHashProvider::new(16, 4);
        let out = provider.embed_batch(&batch_of(0.25, 3)).unwrap();
        assert_eq!(out.shape(), &[3, 16]);
    }

    #[test]
    fn scaling_maps_channel_extremes() {
        assert_eq!(PixelScaling::Unit.apply(0), 0.0);
        assert_eq!(PixelScaling::Unit.apply(255), 1.0);
        assert_eq!(PixelScaling::Symmetric.apply(0), -1.0);
        assert!((PixelScaling::Symmetric.apply(255) - 1.0).abs() < 1e-2);
    }
}
