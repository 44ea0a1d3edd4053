//! Core domain types for the movie catalogue.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, MovieId, CategoryId)
//! - Movies, categories, ratings and watchlist entries
//! - `CatalogIndex`, the in-memory store every other crate reads from

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (owned by the authentication layer)
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Unique identifier for a category
pub type CategoryId = u32;

/// Lowest rating a user can give
pub const MIN_RATING: u8 = 0;

/// Highest rating a user can give
pub const MAX_RATING: u8 = 5;

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Free-form genre label (e.g. "Sci-Fi")
    pub genre: String,
    /// Category this movie is filed under, if any
    pub category: Option<CategoryId>,
    /// Year taken from the release date, when one is known
    pub release_year: Option<u16>,
    pub description: Option<String>,
}

/// A named grouping of movies. Names are unique across the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

// =============================================================================
// User activity Types
// =============================================================================

/// One user's rating for one movie.
///
/// Small, copyable struct. At most one exists per (user, movie) pair;
/// `CatalogIndex::rate` upserts to keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0 to 5
    pub rating: u8,
}

/// Whether a movie is on a user's watchlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub watch: bool,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Aggregate statistics for a movie, computed from its current ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: f64,
    pub rating_count: u32,
    /// `avg_rating * ln(rating_count + 1)`; rewards both high and many ratings
    pub popularity_score: f64,
}

impl MovieStats {
    /// Compute statistics from one movie's ratings, or None if there are none
    pub fn from_ratings(ratings: &[Rating]) -> Option<Self> {
        if ratings.is_empty() {
            return None;
        }
        let rating_count = ratings.len() as u32;
        let total: f64 = ratings.iter().map(|r| f64::from(r.rating)).sum();
        let avg_rating = total / f64::from(rating_count);
        Some(Self {
            avg_rating,
            rating_count,
            popularity_score: compute_popularity_score(avg_rating, rating_count),
        })
    }
}

/// avg_rating * ln(rating_count + 1): rewards both high ratings and many ratings
fn compute_popularity_score(avg_rating: f64, rating_count: u32) -> f64 {
    avg_rating * (f64::from(rating_count) + 1.0).ln()
}

/// A single movie as seen by one user
#[derive(Debug, Clone, Copy)]
pub struct MovieDetail<'a> {
    pub movie: &'a Movie,
    pub category: Option<&'a Category>,
    /// The user's own rating, if they rated it
    pub user_rating: Option<u8>,
    /// Whether it is on the user's watchlist
    pub watching: bool,
    pub stats: Option<MovieStats>,
}

// =============================================================================
// CatalogIndex - The In-Memory Store
// =============================================================================

/// Holds all catalogue data and the indices used to query it.
///
/// Methods return references (`&T`) rather than owned values wherever the
/// caller only needs to read.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    // Primary data stores
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) categories: HashMap<CategoryId, Category>,

    // Rating indices for fast lookups
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    /// Watchlist flags per user, keyed by movie for ordered listing
    pub(crate) watchlists: HashMap<UserId, BTreeMap<MovieId, bool>>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every rating in the catalogue, ordered by (user, movie)
    pub fn all_ratings(&self) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = self.user_ratings.values().flatten().copied().collect();
        ratings.sort_unstable_by_key(|r| (r.user_id, r.movie_id));
        ratings
    }

    /// Every user that has rated at least one movie, ascending
    pub fn get_rating_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Watchlist entries for every user, ordered by (user, movie)
    pub fn all_watchlist_entries(&self) -> Vec<WatchlistEntry> {
        let mut entries: Vec<WatchlistEntry> = self
            .watchlists
            .iter()
            .flat_map(|(&user_id, movies)| {
                movies.iter().map(move |(&movie_id, &watch)| WatchlistEntry {
                    user_id,
                    movie_id,
                    watch,
                })
            })
            .collect();
        entries.sort_unstable_by_key(|e| (e.user_id, e.movie_id));
        entries
    }

    // Mutators used during loading. They trust their input; `validate`
    // checks the result afterwards.

    /// Insert a movie into the index
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a category into the index
    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    /// Insert a rating, replacing any earlier rating for the same pair
    pub fn insert_rating(&mut self, rating: Rating) {
        upsert(
            self.user_ratings.entry(rating.user_id).or_default(),
            rating,
        );
        upsert(
            self.movie_ratings.entry(rating.movie_id).or_default(),
            rating,
        );
    }

    /// Insert or overwrite a watchlist flag
    pub fn insert_watchlist_entry(&mut self, entry: WatchlistEntry) {
        self.watchlists
            .entry(entry.user_id)
            .or_default()
            .insert(entry.movie_id, entry.watch);
    }

    /// Get counts for debugging/validation: (movies, categories, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.movies.len(), self.categories.len(), total_ratings)
    }
}

fn upsert(ratings: &mut Vec<Rating>, rating: Rating) {
    match ratings
        .iter_mut()
        .find(|r| r.user_id == rating.user_id && r.movie_id == rating.movie_id)
    {
        Some(existing) => existing.rating = rating.rating,
        None => ratings.push(rating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popularity_score() {
        // High rating with few ratings
        let score1 = compute_popularity_score(4.5, 10);
        // Medium rating with many ratings
        let score2 = compute_popularity_score(3.5, 1000);

        assert!(score1 > 0.0);
        assert!(score2 > score1);
        assert_eq!(compute_popularity_score(0.0, 50), 0.0);
    }

    #[test]
    fn test_stats_from_ratings() {
        assert!(MovieStats::from_ratings(&[]).is_none());

        let ratings = [
            Rating { user_id: 1, movie_id: 3, rating: 5 },
            Rating { user_id: 2, movie_id: 3, rating: 2 },
        ];
        let stats = MovieStats::from_ratings(&ratings).unwrap();
        assert_eq!(stats.rating_count, 2);
        assert!((stats.avg_rating - 3.5).abs() < 1e-12);
        assert!((stats.popularity_score - 3.5 * 3f64.ln()).abs() < 1e-12);
    }
}
