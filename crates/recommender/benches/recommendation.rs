//! Benchmarks for the recommendation path
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic catalogue so the benchmark needs no data files.

use catalog::{CatalogIndex, Movie, Rating};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recommender::{RatingMatrix, Recommender, Scorer, SimilarityMatrix, UserProfile};
use std::sync::Arc;

const USERS: u32 = 200;
const MOVIES: u32 = 300;

fn synthetic_catalogue() -> Arc<CatalogIndex> {
    let mut index = CatalogIndex::new();
    for id in 1..=MOVIES {
        index.insert_movie(Movie {
            id,
            title: format!("Movie {}", id),
            genre: "Drama".to_string(),
            category: None,
            release_year: None,
            description: None,
        });
    }
    for user_id in 1..=USERS {
        for movie_id in 1..=MOVIES {
            if (user_id * 31 + movie_id * 17) % 7 < 2 {
                let rating = ((user_id ^ movie_id) % 6) as u8;
                index.insert_rating(Rating { user_id, movie_id, rating });
            }
        }
    }
    Arc::new(index)
}

fn bench_build_matrix(c: &mut Criterion) {
    let ratings = synthetic_catalogue().all_ratings();

    c.bench_function("build_rating_matrix", |b| {
        b.iter(|| {
            let matrix = RatingMatrix::from_ratings(black_box(&ratings), 0.0);
            black_box(matrix)
        })
    });
}

fn bench_pearson(c: &mut Criterion) {
    let ratings = synthetic_catalogue().all_ratings();
    let matrix = RatingMatrix::from_ratings(&ratings, 0.0);

    c.bench_function("pearson_similarity", |b| {
        b.iter(|| {
            let similarity = SimilarityMatrix::pearson(black_box(&matrix));
            black_box(similarity)
        })
    });
}

fn bench_score(c: &mut Criterion) {
    let index = synthetic_catalogue();
    let similarity = SimilarityMatrix::pearson(&RatingMatrix::from_ratings(&index.all_ratings(), 0.0));
    let profile = UserProfile::from_ratings(1, index.get_user_ratings(1), []);
    let scorer = Scorer::default();

    c.bench_function("score_user", |b| {
        b.iter(|| {
            let scores = scorer.score(black_box(&profile), black_box(&similarity));
            black_box(scores)
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let recommender = Recommender::new(synthetic_catalogue());

    c.bench_function("recommend_end_to_end", |b| {
        b.iter(|| {
            let ranked = recommender.recommend(black_box(1));
            black_box(ranked)
        })
    });
}

criterion_group!(
    benches,
    bench_build_matrix,
    bench_pearson,
    bench_score,
    bench_recommend
);
criterion_main!(benches);
