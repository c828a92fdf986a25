//! Image preprocessing for the embedding provider.
//!
//! Query and inventory images go through the same path: decode, exact resize
//! to the provider's square input, RGB conversion, and channel-first tensor
//! layout with the provider's pixel scaling applied. Build and query must
//! match here exactly or similarity scores are meaningless.

use std::path::{Path, PathBuf};

use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array3, Array4, Axis};
use thiserror::Error;

use super::provider::PixelScaling;

/// Errors raised while turning an image file into a provider input tensor.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// The image could not be opened or decoded.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A batch was assembled from tensors of mismatched shapes.
    #[error("inconsistent tensor shapes in batch: {0}")]
    BatchShape(String),
}

/// Result type for preprocessing operations.
pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// Loads an image file and converts it into a CHW input tensor.
pub fn load_input(path: &Path, size: u32, scaling: PixelScaling) -> PreprocessResult<Array3<f32>> {
    let decoded = image::open(path).map_err(|source| PreprocessError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image_to_tensor(&decoded, size, scaling))
}

/// Resizes a decoded image to `size`×`size` and lays it out as a scaled
/// `[3, size, size]` tensor.
///
/// The resize is exact (aspect ratio is not preserved), matching the fixed
/// target-size resize used when the index was trained.
pub fn image_to_tensor(image: &DynamicImage, size: u32, scaling: PixelScaling) -> Array3<f32> {
    let resized = image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();

    let side = size as usize;
    let mut tensor = Array3::<f32>::zeros((3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, y, x]] = scaling.apply(pixel[0]);
        tensor[[1, y, x]] = scaling.apply(pixel[1]);
        tensor[[2, y, x]] = scaling.apply(pixel[2]);
    }
    tensor
}

/// Stacks per-image CHW tensors into one NCHW batch.
pub fn batch(tensors: &[Array3<f32>]) -> PreprocessResult<Array4<f32>> {
    let views: Vec<_> = tensors.iter().map(|t| t.view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|e| PreprocessError::BatchShape(e.to_string()))
}
