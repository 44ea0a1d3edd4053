//! # Catalog Crate
//!
//! This crate holds the movie catalogue: movies, categories, user ratings and
//! watchlists, loaded from flat `::`-delimited files into an in-memory index.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Category, Rating, WatchlistEntry, CatalogIndex)
//! - **parser**: Parse and write the .dat files
//! - **index**: Loading, validation, browsing, rating and watchlist operations
//! - **error**: Error types for the catalogue
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogIndex;
//! use std::path::Path;
//!
//! let mut index = CatalogIndex::load_from_files(Path::new("data/catalog"))?;
//!
//! index.rate(1, 42, 4)?;
//! index.set_watch(1, 7, true)?;
//! index.save_user_data(Path::new("data/catalog"))?;
//!
//! for movie in index.search_movies(Some("matrix"), None) {
//!     println!("{} {}", movie.id, movie.title);
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    CategoryId,
    // Rating bounds
    MIN_RATING,
    MAX_RATING,
    // Core types
    Movie,
    Category,
    Rating,
    WatchlistEntry,
    MovieStats,
    MovieDetail,
    CatalogIndex,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_index_creation() {
        let index = CatalogIndex::new();
        let (movies, categories, ratings) = index.counts();

        assert_eq!(movies, 0);
        assert_eq!(categories, 0);
        assert_eq!(ratings, 0);
    }

    #[test]
    fn test_insert_movie() {
        let mut index = CatalogIndex::new();

        index.insert_movie(Movie {
            id: 1,
            title: "Toy Story".to_string(),
            genre: "Animation".to_string(),
            category: None,
            release_year: Some(1995),
            description: None,
        });

        let retrieved = index.get_movie(1).unwrap();
        assert_eq!(retrieved.id, 1);
        assert_eq!(retrieved.release_year, Some(1995));
    }

    #[test]
    fn test_insert_rating_updates_both_indices() {
        let mut index = CatalogIndex::new();

        index.insert_rating(Rating { user_id: 1, movie_id: 19, rating: 5 });
        index.insert_rating(Rating { user_id: 1, movie_id: 19, rating: 2 });

        let user_ratings = index.get_user_ratings(1);
        assert_eq!(user_ratings.len(), 1);
        assert_eq!(user_ratings[0].rating, 2);

        let movie_ratings = index.get_movie_ratings(19);
        assert_eq!(movie_ratings.len(), 1);
        assert_eq!(movie_ratings[0].rating, 2);
    }

    #[test]
    fn test_all_ratings_is_ordered() {
        let mut index = CatalogIndex::new();
        index.insert_rating(Rating { user_id: 2, movie_id: 1, rating: 3 });
        index.insert_rating(Rating { user_id: 1, movie_id: 5, rating: 4 });
        index.insert_rating(Rating { user_id: 1, movie_id: 2, rating: 1 });

        let pairs: Vec<(UserId, MovieId)> = index
            .all_ratings()
            .iter()
            .map(|r| (r.user_id, r.movie_id))
            .collect();
        assert_eq!(pairs, vec![(1, 2), (1, 5), (2, 1)]);
        assert_eq!(index.get_rating_user_ids(), vec![1, 2]);
    }

    #[test]
    fn test_empty_queries() {
        let index = CatalogIndex::new();

        // Querying non-existent data should return None or empty slices
        assert!(index.get_movie(999).is_none());
        assert!(index.get_category(999).is_none());
        assert!(index.get_user_ratings(999).is_empty());
        assert!(index.get_movie_ratings(999).is_empty());
        assert!(index.watchlist(999, None).is_empty());
    }
}
