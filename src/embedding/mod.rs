//! Embedding provider boundary, preprocessing, and vector math.
//!
//! The model that produces embeddings is an external collaborator behind
//! [`EmbeddingProvider`]; this module owns everything around that boundary:
//!
//! - [`provider`] - the provider trait, its error type, and a deterministic
//!   stand-in implementation
//! - [`preprocess`] - image decode, resize, and NCHW tensor assembly
//! - [`vector`] - L2 normalization used on every stored and queried vector

pub mod preprocess;
pub mod provider;
pub mod vector;

pub use provider::{
    EmbeddingProvider, PixelHashProvider, PixelScaling, ProviderError, ProviderResult,
};
