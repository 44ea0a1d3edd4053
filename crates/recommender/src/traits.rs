//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to scored candidates.

use crate::types::{ScoredMovie, UserProfile};
use anyhow::Result;

/// Core trait for filtering candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
/// Filters take ownership of the candidates and return the survivors in
/// their original order.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `profile` - The target user's ratings and exclusion set
    fn apply(&self, candidates: Vec<ScoredMovie>, profile: &UserProfile)
    -> Result<Vec<ScoredMovie>>;
}
