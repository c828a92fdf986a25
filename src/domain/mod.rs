//! Domain types shared across the matching system.

mod types;

pub use types::{InventoryItem, MatchResult};
