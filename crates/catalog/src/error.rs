//! Errors raised by the catalogue store.

use crate::types::{CategoryId, MovieId, MAX_RATING, MIN_RATING};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A data file is absent. Only `movies.dat` is required.
    #[error("Data file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line in a `.dat` file could not be read
    #[error("{file}:{line}: {reason}")]
    Malformed {
        file: &'static str,
        line: usize,
        reason: String,
    },

    #[error("Rating {rating} is outside {}..={}", MIN_RATING, MAX_RATING)]
    RatingOutOfRange { rating: u8 },

    #[error("No movie with id {0}")]
    UnknownMovie(MovieId),

    /// A movie is filed under a category that does not exist
    #[error("Movie {movie_id} refers to missing category {category_id}")]
    UnknownCategory {
        movie_id: MovieId,
        category_id: CategoryId,
    },

    #[error("Category name '{name}' is used by both {first} and {second}")]
    DuplicateCategoryName {
        name: String,
        first: CategoryId,
        second: CategoryId,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
