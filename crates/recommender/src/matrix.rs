//! Dense user×movie rating matrix.
//!
//! Built fresh for every request from the flat rating rows. Rows and columns
//! follow ascending user and movie ids, so the same input always produces
//! the same layout.

use catalog::{MovieId, Rating, UserId};
use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};

/// Ratings laid out as `users × movies`, with absent pairs holding a fill value.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    user_ids: Vec<UserId>,
    movie_ids: Vec<MovieId>,
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
    values: Array2<f64>,
}

impl RatingMatrix {
    /// Number of distinct (users, movies) in a rating set, without building anything
    pub fn dimensions(ratings: &[Rating]) -> (usize, usize) {
        let users: BTreeSet<UserId> = ratings.iter().map(|r| r.user_id).collect();
        let movies: BTreeSet<MovieId> = ratings.iter().map(|r| r.movie_id).collect();
        (users.len(), movies.len())
    }

    /// Pivot rating rows into a dense matrix.
    ///
    /// Every user and movie in `ratings` gets a row/column. Pairs nobody
    /// rated hold `fill`. If a pair appears twice the later row wins.
    pub fn from_ratings(ratings: &[Rating], fill: f64) -> Self {
        let user_ids: Vec<UserId> = ratings
            .iter()
            .map(|r| r.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let movie_ids: Vec<MovieId> = ratings
            .iter()
            .map(|r| r.movie_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index = index_of(&user_ids);
        let movie_index = index_of(&movie_ids);

        let mut values = Array2::from_elem((user_ids.len(), movie_ids.len()), fill);
        for rating in ratings {
            let row = user_index[&rating.user_id];
            let col = movie_index[&rating.movie_id];
            values[[row, col]] = f64::from(rating.rating);
        }

        Self {
            user_ids,
            movie_ids,
            user_index,
            movie_index,
            values,
        }
    }

    /// (users, movies)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    /// Cell for a (user, movie) pair; `None` only if either id is unknown
    pub fn get(&self, user_id: UserId, movie_id: MovieId) -> Option<f64> {
        let row = *self.user_index.get(&user_id)?;
        let col = *self.movie_index.get(&movie_id)?;
        Some(self.values[[row, col]])
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

fn index_of(ids: &[u32]) -> HashMap<u32, usize> {
    ids.iter().enumerate().map(|(idx, &id)| (id, idx)).collect()
}
