//! Filter to remove movies the user has already rated.
//!
//! Always part of the pipeline: a recommendation the user has already
//! seen is never useful.

use crate::traits::Filter;
use crate::types::{ScoredMovie, UserProfile};
use anyhow::Result;

/// Removes candidates in the profile's `rated_movies` set.
pub struct AlreadyRatedFilter;

impl Filter for AlreadyRatedFilter {
    fn name(&self) -> &str {
        "AlreadyRatedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredMovie>,
        profile: &UserProfile,
    ) -> Result<Vec<ScoredMovie>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| !profile.rated_movies.contains(&candidate.movie_id))
            .collect())
    }
}
