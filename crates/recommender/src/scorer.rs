//! Turns a user's ratings into a score for every movie.
//!
//! Each rated movie pulls its similarity row and weights it by the centered
//! rating `rating - neutral`. Liked movies push their correlated movies up,
//! disliked ones push them down. Contributions are summed per candidate;
//! an undefined (`NaN`) correlation contributes nothing.
//!
//! Already-rated movies are scored too. Removing them is the filter
//! pipeline's job.

use crate::similarity::SimilarityMatrix;
use crate::types::{ScoredMovie, UserProfile};
use tracing::debug;

/// Midpoint of the 0-5 rating scale
pub const DEFAULT_NEUTRAL_RATING: f64 = 2.5;

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    neutral_rating: f64,
}

impl Scorer {
    pub fn new(neutral_rating: f64) -> Self {
        Self { neutral_rating }
    }

    /// Aggregate score for every movie in the similarity matrix's column space
    pub fn score(&self, profile: &UserProfile, similarity: &SimilarityMatrix) -> Vec<ScoredMovie> {
        let mut totals = vec![0.0_f64; similarity.len()];

        for &(movie_id, rating) in &profile.ratings {
            let Some(row) = similarity.row(movie_id) else {
                debug!("Rated movie {} missing from similarity matrix", movie_id);
                continue;
            };
            let weight = f64::from(rating) - self.neutral_rating;

            for (total, &corr) in totals.iter_mut().zip(row.iter()) {
                let contribution = corr * weight;
                if contribution.is_finite() {
                    *total += contribution;
                }
            }
        }

        similarity
            .movie_ids()
            .iter()
            .zip(totals)
            .map(|(&movie_id, score)| ScoredMovie::new(movie_id, score))
            .collect()
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_NEUTRAL_RATING)
    }
}
