//! Data-access seam between the recommender and whatever stores the ratings.
//!
//! The recommender never reaches into a store directly; it pulls everything
//! through these traits. `CatalogIndex` implements both.

use anyhow::Result;
use catalog::{CatalogIndex, Movie, MovieId, Rating, UserId};
use std::collections::HashSet;

/// Read access to rating observations.
///
/// `Send + Sync` so a repository can sit behind an `Arc` shared across threads.
pub trait RatingRepository: Send + Sync {
    /// Every rating from every user
    fn fetch_all_ratings(&self) -> Result<Vec<Rating>>;

    /// The ratings made by one user
    fn fetch_user_ratings(&self, user_id: UserId) -> Result<Vec<Rating>>;

    /// Movies the user has already seen and must not be recommended again
    fn fetch_watched_movie_ids(&self, user_id: UserId) -> Result<HashSet<MovieId>>;
}

/// Read access to movie records, used to materialize a ranked id list.
pub trait MovieRepository: Send + Sync {
    /// Movies for `ids`, in the same order. Unknown ids are skipped.
    fn fetch_movies(&self, ids: &[MovieId]) -> Result<Vec<Movie>>;
}

impl RatingRepository for CatalogIndex {
    fn fetch_all_ratings(&self) -> Result<Vec<Rating>> {
        Ok(self.all_ratings())
    }

    fn fetch_user_ratings(&self, user_id: UserId) -> Result<Vec<Rating>> {
        Ok(self.get_user_ratings(user_id).to_vec())
    }

    /// A movie counts as watched once the user has rated it
    fn fetch_watched_movie_ids(&self, user_id: UserId) -> Result<HashSet<MovieId>> {
        Ok(self
            .get_user_ratings(user_id)
            .iter()
            .map(|r| r.movie_id)
            .collect())
    }
}

impl MovieRepository for CatalogIndex {
    fn fetch_movies(&self, ids: &[MovieId]) -> Result<Vec<Movie>> {
        Ok(ids
            .iter()
            .filter_map(|&id| self.get_movie(id).cloned())
            .collect())
    }
}
