//! # Recommender
//!
//! Coordinates one recommendation request end to end:
//! 1. Build the user's profile from the repository
//! 2. Answer cold-start users from the configured policy
//! 3. Build the rating matrix (checked against the compute budget)
//! 4. Correlate movies
//! 5. Score every movie from the user's centered ratings
//! 6. Filter out already-rated movies
//! 7. Rank and keep the top N
//!
//! Nothing is cached between calls. Errors never reach the caller: a failing
//! repository is logged and yields an empty list, so the recommendation
//! surface can always be rendered.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use catalog::{MovieId, Rating, UserId};
use tracing::{debug, info, instrument, warn};

use crate::config::RecommenderConfig;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::AlreadyRatedFilter;
use crate::matrix::RatingMatrix;
use crate::ranker::rank_and_select;
use crate::repository::{MovieRepository, RatingRepository};
use crate::scorer::Scorer;
use crate::similarity::SimilarityMatrix;
use crate::types::{Recommendation, ScoredMovie, UserProfile};

/// Collaborative-filtering recommender over a shared repository
pub struct Recommender<R> {
    repository: Arc<R>,
    config: RecommenderConfig,
    scorer: Scorer,
    filter_pipeline: FilterPipeline,
}

impl<R: RatingRepository> Recommender<R> {
    /// Create a recommender with the default configuration
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, RecommenderConfig::default())
    }

    pub fn with_config(repository: Arc<R>, config: RecommenderConfig) -> Self {
        Self {
            repository,
            scorer: Scorer::new(config.neutral_rating),
            filter_pipeline: FilterPipeline::new().add_filter(AlreadyRatedFilter),
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Ranked movie ids for a user, best first
    pub fn recommend_ids(&self, user_id: UserId) -> Vec<MovieId> {
        self.recommend(user_id)
            .into_iter()
            .map(|c| c.movie_id)
            .collect()
    }

    /// Ranked candidates with their scores, best first, at most `top_n`
    pub fn recommend(&self, user_id: UserId) -> Vec<ScoredMovie> {
        self.rank(user_id, self.config.top_n)
    }

    /// Ranked candidates, best first, at most `limit`. Failures degrade to
    /// an empty list.
    #[instrument(skip(self))]
    fn rank(&self, user_id: UserId, limit: usize) -> Vec<ScoredMovie> {
        let start_time = Instant::now();

        match self.try_rank(user_id, limit) {
            Ok(ranked) => {
                info!(
                    "Selected {} recommendations for user {} in {:.2?}",
                    ranked.len(),
                    user_id,
                    start_time.elapsed()
                );
                ranked
            }
            Err(e) => {
                warn!(
                    "Recommendation for user {} failed, returning none: {:#}",
                    user_id, e
                );
                Vec::new()
            }
        }
    }

    fn try_rank(&self, user_id: UserId, limit: usize) -> Result<Vec<ScoredMovie>> {
        let profile = self.build_user_profile(user_id)?;
        let all_ratings = self
            .repository
            .fetch_all_ratings()
            .context("Failed to fetch ratings")?;

        if profile.is_cold_start() {
            debug!("User {} has no ratings, applying {} policy", user_id, self.config.cold_start);
            return self.cold_start(&all_ratings, &profile, limit);
        }

        let (n_users, n_movies) = RatingMatrix::dimensions(&all_ratings);
        if let Some(max_cells) = self.config.max_matrix_cells {
            let cells = n_users.saturating_mul(n_movies);
            if cells > max_cells {
                warn!(
                    "Rating matrix {}x{} exceeds budget of {} cells, applying {} policy",
                    n_users, n_movies, max_cells, self.config.cold_start
                );
                return self.cold_start(&all_ratings, &profile, limit);
            }
        }

        let matrix = RatingMatrix::from_ratings(&all_ratings, self.config.fill_value);
        debug!("Built {}x{} rating matrix", n_users, n_movies);

        let similarity = SimilarityMatrix::pearson(&matrix);
        let scored = self.scorer.score(&profile, &similarity);
        let filtered = self.filter_pipeline.apply(scored, &profile)?;

        Ok(rank_and_select(filtered, limit))
    }

    fn build_user_profile(&self, user_id: UserId) -> Result<UserProfile> {
        let ratings = self
            .repository
            .fetch_user_ratings(user_id)
            .context("Failed to fetch user ratings")?;
        let watched = self
            .repository
            .fetch_watched_movie_ids(user_id)
            .context("Failed to fetch watched movies")?;
        Ok(UserProfile::from_ratings(user_id, &ratings, watched))
    }

    fn cold_start(
        &self,
        all_ratings: &[Rating],
        profile: &UserProfile,
        limit: usize,
    ) -> Result<Vec<ScoredMovie>> {
        let candidates = self.config.cold_start.candidates(all_ratings);
        let filtered = self.filter_pipeline.apply(candidates, profile)?;
        Ok(rank_and_select(filtered, limit))
    }
}

impl<R: RatingRepository + MovieRepository> Recommender<R> {
    /// Ranked recommendations with their movie records, best first, at
    /// most `top_n`.
    ///
    /// Ids the repository no longer knows are skipped and the next-ranked
    /// candidates move up to fill the list.
    pub fn recommend_movies(&self, user_id: UserId) -> Vec<Recommendation> {
        let ranked = self.rank(user_id, usize::MAX);
        if ranked.is_empty() || self.config.top_n == 0 {
            return Vec::new();
        }

        let ids: Vec<MovieId> = ranked.iter().map(|c| c.movie_id).collect();
        let movies = match self.repository.fetch_movies(&ids) {
            Ok(movies) => movies,
            Err(e) => {
                warn!("Failed to load recommended movies for user {}: {:#}", user_id, e);
                return Vec::new();
            }
        };

        let mut movies = movies.into_iter().peekable();
        let mut recommendations = Vec::with_capacity(self.config.top_n.min(ranked.len()));
        for candidate in ranked {
            if recommendations.len() == self.config.top_n {
                break;
            }
            match movies.peek() {
                Some(movie) if movie.id == candidate.movie_id => {
                    if let Some(movie) = movies.next() {
                        recommendations.push(Recommendation {
                            movie,
                            score: candidate.score,
                        });
                    }
                }
                _ => debug!("Movie {} not found, skipping", candidate.movie_id),
            }
        }
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cold_start::ColdStartPolicy;
    use anyhow::anyhow;
    use catalog::{CatalogIndex, Movie};
    use std::collections::HashSet;

    fn movie(id: MovieId) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            genre: "Drama".to_string(),
            category: None,
            release_year: None,
            description: None,
        }
    }

    fn build_index(ratings: &[(UserId, MovieId, u8)]) -> Arc<CatalogIndex> {
        let mut index = CatalogIndex::new();
        for &(user_id, movie_id, rating) in ratings {
            if index.get_movie(movie_id).is_none() {
                index.insert_movie(movie(movie_id));
            }
            index.insert_rating(Rating { user_id, movie_id, rating });
        }
        Arc::new(index)
    }

    /// Repository that is always down
    struct OfflineRepository;

    impl RatingRepository for OfflineRepository {
        fn fetch_all_ratings(&self) -> Result<Vec<Rating>> {
            Err(anyhow!("connection refused"))
        }

        fn fetch_user_ratings(&self, _: UserId) -> Result<Vec<Rating>> {
            Err(anyhow!("connection refused"))
        }

        fn fetch_watched_movie_ids(&self, _: UserId) -> Result<HashSet<MovieId>> {
            Err(anyhow!("connection refused"))
        }
    }

    /// Catalogue whose rating rows point at some movies it cannot return
    struct PartialCatalog {
        index: Arc<CatalogIndex>,
        missing: HashSet<MovieId>,
    }

    impl RatingRepository for PartialCatalog {
        fn fetch_all_ratings(&self) -> Result<Vec<Rating>> {
            self.index.fetch_all_ratings()
        }

        fn fetch_user_ratings(&self, user_id: UserId) -> Result<Vec<Rating>> {
            self.index.fetch_user_ratings(user_id)
        }

        fn fetch_watched_movie_ids(&self, user_id: UserId) -> Result<HashSet<MovieId>> {
            self.index.fetch_watched_movie_ids(user_id)
        }
    }

    impl MovieRepository for PartialCatalog {
        fn fetch_movies(&self, ids: &[MovieId]) -> Result<Vec<Movie>> {
            let known: Vec<MovieId> = ids
                .iter()
                .copied()
                .filter(|id| !self.missing.contains(id))
                .collect();
            self.index.fetch_movies(&known)
        }
    }

    #[test]
    fn test_co_rated_movie_is_recommended() {
        let index = build_index(&[(1, 1, 5), (1, 2, 1), (2, 1, 4), (2, 2, 5), (2, 3, 5)]);
        let recommender = Recommender::new(index);

        assert_eq!(recommender.recommend_ids(1), vec![3]);
    }

    #[test]
    fn test_cold_start_empty_policy() {
        let index = build_index(&[(1, 1, 5), (2, 2, 4)]);
        let recommender = Recommender::new(index);

        assert!(recommender.recommend(99).is_empty());
    }

    #[test]
    fn test_cold_start_popularity_policy() {
        let index = build_index(&[(1, 1, 5), (2, 1, 5), (1, 2, 3), (2, 3, 1)]);
        let config = RecommenderConfig::default().with_cold_start(ColdStartPolicy::Popularity);
        let recommender = Recommender::with_config(index, config);

        assert_eq!(recommender.recommend_ids(99), vec![1, 2, 3]);
    }

    #[test]
    fn test_budget_exceeded_falls_back() {
        let index = build_index(&[(1, 1, 5), (1, 2, 1), (2, 1, 4), (2, 2, 5), (2, 3, 5)]);

        let config = RecommenderConfig::default().with_max_matrix_cells(4);
        let recommender = Recommender::with_config(index.clone(), config);
        assert!(recommender.recommend(1).is_empty());

        let config = RecommenderConfig::default()
            .with_max_matrix_cells(4)
            .with_cold_start(ColdStartPolicy::Popularity);
        let recommender = Recommender::with_config(index, config);
        // Popularity fallback still excludes what the user rated
        assert_eq!(recommender.recommend_ids(1), vec![3]);
    }

    #[test]
    fn test_failing_repository_degrades_to_empty() {
        let recommender = Recommender::new(Arc::new(OfflineRepository));
        assert!(recommender.recommend(1).is_empty());
    }

    #[test]
    fn test_recommend_movies_backfills_missing_records() {
        let index = build_index(&[
            (1, 1, 5),
            (1, 2, 1),
            (2, 1, 5),
            (2, 3, 5),
            (2, 4, 1),
            (3, 2, 5),
            (3, 4, 5),
            (3, 3, 1),
        ]);
        let ranked = Recommender::new(index.clone()).recommend_ids(1);
        assert_eq!(ranked.len(), 2);

        // The best candidate has no movie record; the runner-up takes its place
        let repository = PartialCatalog {
            index,
            missing: HashSet::from([ranked[0]]),
        };
        let config = RecommenderConfig::default().with_top_n(1);
        let recommender = Recommender::with_config(Arc::new(repository), config);

        let movies = recommender.recommend_movies(1);
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].movie.id, ranked[1]);
        assert_eq!(recommender.recommend(1).len(), 1);
    }

    #[test]
    fn test_recommend_movies_keeps_rank_order() {
        let index = build_index(&[
            (1, 1, 5),
            (1, 2, 1),
            (2, 1, 5),
            (2, 3, 5),
            (2, 4, 1),
            (3, 2, 5),
            (3, 4, 5),
            (3, 3, 1),
        ]);
        let recommender = Recommender::new(index);

        let ids = recommender.recommend_ids(1);
        let movies = recommender.recommend_movies(1);

        assert_eq!(movies.len(), ids.len());
        for (rec, id) in movies.iter().zip(&ids) {
            assert_eq!(rec.movie.id, *id);
        }
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&2));
    }
}
