//! What to recommend when collaborative filtering has nothing to work with.
//!
//! Used for users with no ratings, and as the fallback when the rating
//! matrix would exceed the compute budget.

use crate::types::ScoredMovie;
use catalog::{MovieId, MovieStats, Rating};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Policy for users the correlation model cannot serve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColdStartPolicy {
    /// Recommend nothing
    #[default]
    Empty,
    /// Recommend the most popular movies (average rating weighted by rating count)
    Popularity,
}

impl ColdStartPolicy {
    /// Candidates this policy proposes, unfiltered and unranked
    pub fn candidates(&self, all_ratings: &[Rating]) -> Vec<ScoredMovie> {
        match self {
            ColdStartPolicy::Empty => Vec::new(),
            ColdStartPolicy::Popularity => popularity_candidates(all_ratings),
        }
    }
}

impl fmt::Display for ColdStartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColdStartPolicy::Empty => write!(f, "empty"),
            ColdStartPolicy::Popularity => write!(f, "popularity"),
        }
    }
}

impl FromStr for ColdStartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "empty" => Ok(ColdStartPolicy::Empty),
            "popularity" => Ok(ColdStartPolicy::Popularity),
            other => Err(format!(
                "unknown cold-start policy '{}' (expected 'empty' or 'popularity')",
                other
            )),
        }
    }
}

/// Every rated movie scored by its popularity
fn popularity_candidates(all_ratings: &[Rating]) -> Vec<ScoredMovie> {
    let mut by_movie: BTreeMap<MovieId, Vec<Rating>> = BTreeMap::new();
    for rating in all_ratings {
        by_movie.entry(rating.movie_id).or_default().push(*rating);
    }

    by_movie
        .into_iter()
        .filter_map(|(movie_id, ratings)| {
            let stats = MovieStats::from_ratings(&ratings)?;
            Some(ScoredMovie::new(movie_id, stats.popularity_score))
        })
        .collect()
}
