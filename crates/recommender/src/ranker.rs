//! Final ordering and truncation of scored candidates.

use crate::types::ScoredMovie;
use std::cmp::Ordering;

/// Default number of recommendations handed back to the caller
pub const DEFAULT_TOP_N: usize = 10;

/// Scores are compared on a grid of this step. Sums of correlations that
/// are equal in exact arithmetic land a few ulps apart in floating point.
const SCORE_RESOLUTION: f64 = 1e-9;

/// Sort candidates best-first and keep the top `limit`.
///
/// Ties are broken by ascending movie id so the output is reproducible.
/// Scores within `SCORE_RESOLUTION` of each other count as tied.
/// A non-finite score ranks as 0.
pub fn rank_and_select(mut candidates: Vec<ScoredMovie>, limit: usize) -> Vec<ScoredMovie> {
    for candidate in &mut candidates {
        if !candidate.score.is_finite() {
            candidate.score = 0.0;
        }
    }

    candidates.sort_by(|a, b| {
        rank_key(b.score)
            .partial_cmp(&rank_key(a.score))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
    candidates.truncate(limit);
    candidates
}

fn rank_key(score: f64) -> f64 {
    (score / SCORE_RESOLUTION).round()
}
