//! vismatch - visual similarity matching for catalog image inventories
//!
//! This crate builds an in-memory embedding index over a directory of
//! catalog images and answers nearest-neighbor queries for a query image
//! under cosine similarity. The embedding model is an external collaborator
//! behind [`embedding::EmbeddingProvider`].

pub mod config;
pub mod domain;
pub mod embedding;
pub mod index;
pub mod inventory;
pub mod services;

pub use services::{MatchError, MatchService};
