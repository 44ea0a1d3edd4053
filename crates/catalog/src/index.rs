//! CatalogIndex loading, validation and catalogue queries.
//!
//! Loading parses the data files in parallel and validates references.
//! The query and mutation methods here are everything the browsing,
//! rating and watchlist commands need from the store.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const MOVIES_FILE: &str = "movies.dat";
const CATEGORIES_FILE: &str = "categories.dat";
const RATINGS_FILE: &str = "ratings.dat";
const WATCHLIST_FILE: &str = "watchlist.dat";

impl CatalogIndex {
    /// Load the catalogue from a directory
    ///
    /// movies.dat is required; categories.dat, ratings.dat and watchlist.dat
    /// are treated as empty when absent.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading catalogue from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let categories_path = data_dir.join(CATEGORIES_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);
        let watchlist_path = data_dir.join(WATCHLIST_FILE);

        // Parse all four files in parallel
        let ((movies, categories), (ratings, watchlist)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&movies_path),
                    || optional(parser::parse_categories(&categories_path)),
                )
            },
            || {
                rayon::join(
                    || optional(parser::parse_ratings(&ratings_path)),
                    || optional(parser::parse_watchlist(&watchlist_path)),
                )
            },
        );

        let movies = movies?;
        let categories = categories?;
        let ratings = ratings?;
        let watchlist = watchlist?;

        info!(
            "Loaded {} movies, {} categories, {} ratings, {} watchlist entries",
            movies.len(),
            categories.len(),
            ratings.len(),
            watchlist.len()
        );

        let mut index = CatalogIndex::new();
        for category in categories {
            index.insert_category(category);
        }
        for movie in movies {
            index.insert_movie(movie);
        }
        for rating in ratings {
            index.insert_rating(rating);
        }
        for entry in watchlist {
            index.insert_watchlist_entry(entry);
        }

        index.validate()?;

        debug!("Catalogue successfully built and validated");
        Ok(index)
    }

    /// Write the user-owned data (ratings and watchlists) back to a directory
    pub fn save_user_data(&self, data_dir: &Path) -> Result<()> {
        parser::write_ratings(&data_dir.join(RATINGS_FILE), &self.all_ratings())?;
        parser::write_watchlist(
            &data_dir.join(WATCHLIST_FILE),
            &self.all_watchlist_entries(),
        )?;
        debug!("Saved ratings and watchlists to {:?}", data_dir);
        Ok(())
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every rating and watchlist entry references an existing movie
    /// - Every movie category exists
    /// - Ratings are in the valid range (0 - 5)
    /// - Category names are unique
    pub fn validate(&self) -> Result<()> {
        for movie in self.movies.values() {
            if let Some(category_id) = movie.category {
                if !self.categories.contains_key(&category_id) {
                    return Err(CatalogError::UnknownCategory {
                        movie_id: movie.id,
                        category_id,
                    });
                }
            }
        }

        for ratings in self.user_ratings.values() {
            for rating in ratings {
                check_rating_value(rating.rating)?;
                self.require_movie(rating.movie_id)?;
            }
        }

        for movies in self.watchlists.values() {
            for &movie_id in movies.keys() {
                self.require_movie(movie_id)?;
            }
        }

        let mut names: HashMap<&str, CategoryId> = HashMap::new();
        for category in self.categories.values() {
            if let Some(other) = names.insert(category.name.as_str(), category.id) {
                return Err(CatalogError::DuplicateCategoryName {
                    name: category.name.clone(),
                    first: other.min(category.id),
                    second: other.max(category.id),
                });
            }
        }

        Ok(())
    }

    /// Record a user's rating for a movie, replacing any earlier one
    pub fn rate(&mut self, user_id: UserId, movie_id: MovieId, rating: u8) -> Result<()> {
        check_rating_value(rating)?;
        self.require_movie(movie_id)?;
        self.insert_rating(Rating {
            user_id,
            movie_id,
            rating,
        });
        debug!(user_id, movie_id, rating, "Rating recorded");
        Ok(())
    }

    /// The rating a user gave a movie, if any
    pub fn user_rating(&self, user_id: UserId, movie_id: MovieId) -> Option<u8> {
        self.get_user_ratings(user_id)
            .iter()
            .find(|r| r.movie_id == movie_id)
            .map(|r| r.rating)
    }

    /// Put a movie on (or take it off) a user's watchlist
    pub fn set_watch(&mut self, user_id: UserId, movie_id: MovieId, watch: bool) -> Result<()> {
        self.require_movie(movie_id)?;
        self.insert_watchlist_entry(WatchlistEntry {
            user_id,
            movie_id,
            watch,
        });
        debug!(user_id, movie_id, watch, "Watchlist updated");
        Ok(())
    }

    /// Whether the movie is currently on the user's watchlist
    pub fn is_watching(&self, user_id: UserId, movie_id: MovieId) -> bool {
        self.watchlists
            .get(&user_id)
            .and_then(|movies| movies.get(&movie_id))
            .copied()
            .unwrap_or(false)
    }

    /// Movies on a user's watchlist, optionally narrowed by a title substring
    pub fn watchlist(&self, user_id: UserId, query: Option<&str>) -> Vec<&Movie> {
        let query = query.map(str::to_lowercase);
        let Some(movies) = self.watchlists.get(&user_id) else {
            return Vec::new();
        };

        movies
            .iter()
            .filter(|&(_, &watch)| watch)
            .filter_map(|(movie_id, _)| self.movies.get(movie_id))
            .filter(|movie| match &query {
                Some(q) => movie.title.to_lowercase().contains(q),
                None => true,
            })
            .collect()
    }

    /// Browse the catalogue
    ///
    /// `query` matches title or description, case-insensitively.
    /// `category` is read as a category id when it parses as one, otherwise
    /// as a case-insensitive fragment of the category name.
    pub fn search_movies(&self, query: Option<&str>, category: Option<&str>) -> Vec<&Movie> {
        let query = query.map(str::to_lowercase).filter(|q| !q.is_empty());
        let category = category.map(str::trim).filter(|c| !c.is_empty());

        let mut matches: Vec<&Movie> = self
            .movies
            .values()
            .filter(|movie| match &query {
                Some(q) => {
                    movie.title.to_lowercase().contains(q)
                        || movie
                            .description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(q))
                }
                None => true,
            })
            .filter(|movie| match category {
                Some(c) => self.movie_in_category(movie, c),
                None => true,
            })
            .collect();

        matches.sort_unstable_by_key(|m| m.id);
        matches
    }

    fn movie_in_category(&self, movie: &Movie, category: &str) -> bool {
        let Some(category_id) = movie.category else {
            return false;
        };
        match category.parse::<CategoryId>() {
            Ok(id) => category_id == id,
            Err(_) => self
                .categories
                .get(&category_id)
                .is_some_and(|c| c.name.to_lowercase().contains(&category.to_lowercase())),
        }
    }

    /// All categories ordered by name
    pub fn categories_by_name(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.values().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        categories
    }

    /// Statistics for one movie, or None if nobody has rated it
    pub fn movie_stats(&self, movie_id: MovieId) -> Option<MovieStats> {
        MovieStats::from_ratings(self.get_movie_ratings(movie_id))
    }

    /// One movie together with the user's rating and watchlist flag for it
    pub fn movie_detail(&self, user_id: UserId, movie_id: MovieId) -> Result<MovieDetail<'_>> {
        let movie = self
            .movies
            .get(&movie_id)
            .ok_or(CatalogError::UnknownMovie(movie_id))?;

        Ok(MovieDetail {
            movie,
            category: movie.category.and_then(|id| self.categories.get(&id)),
            user_rating: self.user_rating(user_id, movie_id),
            watching: self.is_watching(user_id, movie_id),
            stats: self.movie_stats(movie_id),
        })
    }

    fn require_movie(&self, movie_id: MovieId) -> Result<()> {
        if self.movies.contains_key(&movie_id) {
            Ok(())
        } else {
            Err(CatalogError::UnknownMovie(movie_id))
        }
    }
}

/// Treat a missing optional file as empty
fn optional<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(CatalogError::MissingFile { path }) => {
            debug!("Optional file {} not present", path.display());
            Ok(Vec::new())
        }
        other => other,
    }
}

fn check_rating_value(rating: u8) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CatalogError::RatingOutOfRange { rating })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn movie(id: MovieId, title: &str, category: Option<CategoryId>) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            genre: "Drama".to_string(),
            category,
            release_year: None,
            description: None,
        }
    }

    fn create_test_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        index.insert_category(Category { id: 1, name: "Thriller".to_string() });
        index.insert_category(Category { id: 2, name: "Animation".to_string() });

        index.insert_movie(movie(1, "Heat", Some(1)));
        index.insert_movie(Movie {
            description: Some("Toys come alive".to_string()),
            ..movie(2, "Toy Story", Some(2))
        });
        index.insert_movie(movie(3, "Se7en", Some(1)));
        index.insert_movie(movie(4, "Uncategorised", None));
        index
    }

    #[test]
    fn test_rate_upserts() {
        let mut index = create_test_index();
        index.rate(7, 1, 3).unwrap();
        index.rate(7, 1, 5).unwrap();

        assert_eq!(index.get_user_ratings(7).len(), 1);
        assert_eq!(index.get_movie_ratings(1).len(), 1);
        assert_eq!(index.user_rating(7, 1), Some(5));
        assert_eq!(index.user_rating(7, 2), None);
    }

    #[test]
    fn test_rate_rejects_bad_input() {
        let mut index = create_test_index();
        assert!(matches!(
            index.rate(7, 1, 6),
            Err(CatalogError::RatingOutOfRange { .. })
        ));
        assert!(matches!(
            index.rate(7, 99, 3),
            Err(CatalogError::UnknownMovie(99))
        ));
        assert!(index.get_user_ratings(7).is_empty());
    }

    #[test]
    fn test_watchlist_toggle_and_query() {
        let mut index = create_test_index();
        index.set_watch(5, 1, true).unwrap();
        index.set_watch(5, 2, true).unwrap();
        index.set_watch(5, 3, false).unwrap();

        assert!(index.is_watching(5, 1));
        assert!(!index.is_watching(5, 3));
        assert!(!index.is_watching(6, 1));

        let ids: Vec<MovieId> = index.watchlist(5, None).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let ids: Vec<MovieId> = index.watchlist(5, Some("toy")).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2]);

        index.set_watch(5, 1, false).unwrap();
        assert_eq!(index.watchlist(5, None).len(), 1);
    }

    #[test]
    fn test_search_by_text_and_category() {
        let index = create_test_index();

        let ids = |movies: Vec<&Movie>| movies.iter().map(|m| m.id).collect::<Vec<_>>();

        assert_eq!(ids(index.search_movies(None, None)), vec![1, 2, 3, 4]);
        // Description matches count too
        assert_eq!(ids(index.search_movies(Some("ALIVE"), None)), vec![2]);
        assert_eq!(ids(index.search_movies(None, Some("1"))), vec![1, 3]);
        assert_eq!(ids(index.search_movies(None, Some("anim"))), vec![2]);
        assert_eq!(ids(index.search_movies(Some("se7"), Some("thrill"))), vec![3]);
        assert!(index.search_movies(None, Some("42")).is_empty());
    }

    #[test]
    fn test_categories_by_name() {
        let index = create_test_index();
        let names: Vec<&str> = index
            .categories_by_name()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Animation", "Thriller"]);
    }

    #[test]
    fn test_movie_stats() {
        let mut index = create_test_index();
        index.rate(1, 1, 4).unwrap();
        index.rate(2, 1, 2).unwrap();

        let stats = index.movie_stats(1).unwrap();
        assert_eq!(stats.rating_count, 2);
        assert!((stats.avg_rating - 3.0).abs() < 1e-12);
        assert!(index.movie_stats(2).is_none());
    }

    #[test]
    fn test_movie_detail_for_user() {
        let mut index = create_test_index();
        index.rate(5, 2, 4).unwrap();
        index.set_watch(5, 2, true).unwrap();

        let detail = index.movie_detail(5, 2).unwrap();
        assert_eq!(detail.movie.title, "Toy Story");
        assert_eq!(detail.category.map(|c| c.name.as_str()), Some("Animation"));
        assert_eq!(detail.user_rating, Some(4));
        assert!(detail.watching);
        assert_eq!(detail.stats.map(|s| s.rating_count), Some(1));

        // Another user sees the same movie unrated and off their watchlist
        let detail = index.movie_detail(6, 2).unwrap();
        assert_eq!(detail.user_rating, None);
        assert!(!detail.watching);

        let detail = index.movie_detail(5, 4).unwrap();
        assert!(detail.category.is_none());
        assert!(detail.stats.is_none());

        assert!(matches!(
            index.movie_detail(5, 99),
            Err(CatalogError::UnknownMovie(99))
        ));
    }

    #[test]
    fn test_validate_catches_dangling_category() {
        let mut index = create_test_index();
        index.insert_movie(movie(9, "Lost", Some(77)));
        assert!(matches!(
            index.validate(),
            Err(CatalogError::UnknownCategory { category_id: 77, .. })
        ));
    }

    #[test]
    fn test_validate_catches_duplicate_category_names() {
        let mut index = create_test_index();
        index.insert_category(Category { id: 3, name: "Thriller".to_string() });
        assert!(matches!(
            index.validate(),
            Err(CatalogError::DuplicateCategoryName { .. })
        ));
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = std::env::temp_dir().join(format!("catalog-index-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("categories.dat"), "1::Thriller\n").unwrap();
        fs::write(dir.join("movies.dat"), "1::Heat::Crime::1::1995-12-15::\n2::Ronin::Action\n")
            .unwrap();
        fs::write(dir.join("ratings.dat"), "1::1::5\n").unwrap();
        let _ = fs::remove_file(dir.join("watchlist.dat"));

        let mut index = CatalogIndex::load_from_files(&dir).unwrap();
        assert_eq!(index.counts(), (2, 1, 1));
        assert_eq!(index.get_movie(1).unwrap().release_year, Some(1995));

        index.rate(2, 2, 0).unwrap();
        index.set_watch(2, 1, true).unwrap();
        index.save_user_data(&dir).unwrap();

        let reloaded = CatalogIndex::load_from_files(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(reloaded.user_rating(2, 2), Some(0));
        assert!(reloaded.is_watching(2, 1));
    }

    #[test]
    fn test_load_rejects_out_of_range_rating() {
        let dir = std::env::temp_dir().join(format!("catalog-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("movies.dat"), "1::Heat::Crime\n").unwrap();
        fs::write(dir.join("ratings.dat"), "1::1::9\n").unwrap();

        let result = CatalogIndex::load_from_files(&dir);
        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(result, Err(CatalogError::RatingOutOfRange { .. })));
    }

    #[test]
    fn test_load_leaves_no_scratch_files_behind() {
        let dir = std::env::temp_dir().join(format!("catalog-scratch-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("movies.dat"), "1::Heat::Crime\n").unwrap();

        let index = CatalogIndex::load_from_files(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(index.counts(), (1, 0, 0));
        assert!(!dir.exists());
    }
}
