//! Orchestration layer.
//!
//! Services coordinate the infrastructure pieces (enumeration, embedding
//! provider, index store) behind the operations callers actually invoke:
//! building the index and querying it.

mod match_service;

pub use match_service::{MatchError, MatchResultSet, MatchService};
