//! # Recommender Crate
//!
//! Item-correlation collaborative filtering over a user×movie rating matrix.
//!
//! ## Stages
//!
//! 1. **Matrix builder** (`matrix`): pivot rating rows into a dense
//!    users×movies matrix, unrated pairs filled with a constant
//! 2. **Correlation engine** (`similarity`): Pearson correlation between
//!    every pair of movie columns
//! 3. **Scorer** (`scorer`): weight each rated movie's similarity row by the
//!    user's centered rating and sum per candidate
//! 4. **Filters** (`filters`, `filter_pipeline`): drop movies the user already rated
//! 5. **Ranker** (`ranker`): best-first, ties by movie id, top N
//!
//! `Recommender` (in `engine`) runs the stages for one user, pulling data
//! through the `RatingRepository` / `MovieRepository` traits.
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogIndex;
//! use recommender::{Recommender, RecommenderConfig, ColdStartPolicy};
//! use std::sync::Arc;
//!
//! let index = Arc::new(CatalogIndex::load_from_files(path)?);
//! let config = RecommenderConfig::default().with_cold_start(ColdStartPolicy::Popularity);
//! let recommender = Recommender::with_config(index, config);
//!
//! for rec in recommender.recommend_movies(user_id) {
//!     println!("{} ({:.2})", rec.movie.title, rec.score);
//! }
//! ```

pub mod cold_start;
pub mod config;
pub mod engine;
pub mod filter_pipeline;
pub mod filters;
pub mod matrix;
pub mod ranker;
pub mod repository;
pub mod scorer;
pub mod similarity;
pub mod traits;
pub mod types;

// Re-export main types
pub use cold_start::ColdStartPolicy;
pub use config::RecommenderConfig;
pub use engine::Recommender;
pub use filter_pipeline::FilterPipeline;
pub use matrix::RatingMatrix;
pub use ranker::rank_and_select;
pub use repository::{MovieRepository, RatingRepository};
pub use scorer::Scorer;
pub use similarity::SimilarityMatrix;
pub use traits::Filter;
pub use types::{Recommendation, ScoredMovie, UserProfile};
