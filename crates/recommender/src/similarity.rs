//! Movie×movie Pearson correlation.
//!
//! ## Algorithm
//! 1. Center every movie column on its mean over all users
//! 2. For each pair (i, j) with i <= j:
//!    corr = Σ(xᵢ·xⱼ) / sqrt(Σxᵢ² · Σxⱼ²)
//! 3. Mirror the upper triangle so the matrix is exactly symmetric
//!
//! A column with zero variance has no defined correlation with anything,
//! itself included, and gets `NaN` across its row and column. With fewer
//! than two users every column is degenerate.
//!
//! The cost is O(M²·U); rows are spread over the rayon pool.

use crate::matrix::RatingMatrix;
use catalog::MovieId;
use ndarray::{Array2, ArrayView1, Axis};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Sum of squared deviations at or below this is treated as zero variance
const ZERO_VARIANCE_EPSILON: f64 = 1e-12;

/// Pairwise movie similarity, indexed by movie id.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    movie_ids: Vec<MovieId>,
    movie_index: HashMap<MovieId, usize>,
    values: Array2<f64>,
}

impl SimilarityMatrix {
    /// Pearson correlation between every pair of movie columns
    pub fn pearson(ratings: &RatingMatrix) -> Self {
        let (n_users, n_movies) = ratings.shape();
        let movie_ids = ratings.movie_ids().to_vec();
        let movie_index = movie_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let values = if n_users < 2 {
            Array2::from_elem((n_movies, n_movies), f64::NAN)
        } else {
            correlate_columns(ratings.values())
        };

        debug!(
            "Computed {}x{} similarity matrix from {} users",
            n_movies, n_movies, n_users
        );

        Self {
            movie_ids,
            movie_index,
            values,
        }
    }

    /// Movies in column order
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    /// Correlation between two movies; `None` if either is unknown, `NaN` if undefined
    pub fn get(&self, a: MovieId, b: MovieId) -> Option<f64> {
        let i = *self.movie_index.get(&a)?;
        let j = *self.movie_index.get(&b)?;
        Some(self.values[[i, j]])
    }

    /// One movie's correlations with every movie, in `movie_ids()` order
    pub fn row(&self, movie_id: MovieId) -> Option<ArrayView1<'_, f64>> {
        let i = *self.movie_index.get(&movie_id)?;
        Some(self.values.row(i))
    }
}

fn correlate_columns(values: &Array2<f64>) -> Array2<f64> {
    let n_movies = values.ncols();
    let Some(means) = values.mean_axis(Axis(0)) else {
        return Array2::from_elem((n_movies, n_movies), f64::NAN);
    };
    let centered = values - &means;

    let norms: Vec<f64> = centered
        .axis_iter(Axis(1))
        .map(|col| col.dot(&col).sqrt())
        .collect();

    // Upper triangle, one row per task
    let upper: Vec<Vec<f64>> = (0..n_movies)
        .into_par_iter()
        .map(|i| {
            let col_i = centered.column(i);
            (i..n_movies)
                .map(|j| {
                    if norms[i] * norms[i] <= ZERO_VARIANCE_EPSILON
                        || norms[j] * norms[j] <= ZERO_VARIANCE_EPSILON
                    {
                        f64::NAN
                    } else if i == j {
                        1.0
                    } else {
                        let cov = col_i.dot(&centered.column(j));
                        (cov / (norms[i] * norms[j])).clamp(-1.0, 1.0)
                    }
                })
                .collect()
        })
        .collect();

    let mut result = Array2::from_elem((n_movies, n_movies), f64::NAN);
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, corr) in row.into_iter().enumerate() {
            let j = i + offset;
            result[[i, j]] = corr;
            result[[j, i]] = corr;
        }
    }
    result
}
