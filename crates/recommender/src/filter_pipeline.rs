//! The FilterPipeline chains multiple filters.

use crate::traits::Filter;
use crate::types::{ScoredMovie, UserProfile};
use anyhow::Result;
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new().add_filter(AlreadyRatedFilter);
/// let filtered = pipeline.apply(candidates, &profile)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// Stops at the first filter that fails.
    pub fn apply(
        &self,
        candidates: Vec<ScoredMovie>,
        profile: &UserProfile,
    ) -> Result<Vec<ScoredMovie>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, profile)?;
            debug!(
                "Filter {} kept {} of {} candidates",
                filter.name(),
                current.len(),
                before
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
