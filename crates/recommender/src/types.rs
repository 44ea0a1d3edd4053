//! Value types passed between the recommendation stages.

use catalog::{Movie, MovieId, Rating, UserId};
use serde::Serialize;
use std::collections::HashSet;

/// A candidate movie with its aggregated score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f64,
}

impl ScoredMovie {
    pub fn new(movie_id: MovieId, score: f64) -> Self {
        Self { movie_id, score }
    }
}

/// A ranked recommendation with its movie record filled in
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub movie: Movie,
    pub score: f64,
}

/// What the scorer and filters need to know about the target user.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub user_id: UserId,
    /// The user's own ratings as (movie, rating)
    pub ratings: Vec<(MovieId, u8)>,
    /// Movies that must never be recommended back to the user
    pub rated_movies: HashSet<MovieId>,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Build a profile from the user's ratings plus any extra watched ids
    pub fn from_ratings(
        user_id: UserId,
        ratings: &[Rating],
        watched: impl IntoIterator<Item = MovieId>,
    ) -> Self {
        let mut profile = Self::new(user_id);
        for rating in ratings.iter().filter(|r| r.user_id == user_id) {
            profile.ratings.push((rating.movie_id, rating.rating));
            profile.rated_movies.insert(rating.movie_id);
        }
        profile.rated_movies.extend(watched);
        profile
    }

    /// A user with no ratings has nothing to aggregate over
    pub fn is_cold_start(&self) -> bool {
        self.ratings.is_empty()
    }
}
