use anyhow::{anyhow, Context, Result};
use catalog::{CatalogIndex, Movie, MovieId, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use recommender::{ColdStartPolicy, Recommendation, Recommender, RecommenderConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// MovieRecs - Movie catalogue and recommender
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie catalogue with item-correlation recommendations", long_about = None)]
struct Cli {
    /// Directory holding movies.dat, categories.dat, ratings.dat and watchlist.dat
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    /// JSON recommender configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return (overrides the config file)
        #[arg(long)]
        limit: Option<usize>,

        /// What to do when the user has no ratings: empty or popularity
        #[arg(long)]
        cold_start: Option<ColdStartPolicy>,

        /// Show category, year and rating statistics for each recommendation
        #[arg(long)]
        explain: bool,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rate a movie from 0 to 5, replacing any earlier rating
    Rate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        movie_id: MovieId,

        #[arg(long)]
        rating: u8,
    },

    /// Put a movie on a user's watchlist
    Watch {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        movie_id: MovieId,

        /// Take the movie off the watchlist instead
        #[arg(long)]
        off: bool,
    },

    /// Show a user's watchlist
    Watchlist {
        #[arg(long)]
        user_id: UserId,

        /// Only titles containing this text
        #[arg(long)]
        query: Option<String>,
    },

    /// Search the catalogue
    Search {
        /// Text to find in titles or descriptions (case-insensitive)
        #[arg(long)]
        query: Option<String>,

        /// Category id, or part of a category name
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one movie with a user's rating and watchlist flag
    Movie {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        movie_id: MovieId,
    },

    /// List categories
    Categories,

    /// Show a user's ratings and watchlist
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RecommenderConfig::from_json_file(path)?,
        None => RecommenderConfig::default(),
    };

    let start = Instant::now();
    let mut index = CatalogIndex::load_from_files(&cli.data_dir)
        .with_context(|| format!("Failed to load catalogue from {}", cli.data_dir.display()))?;
    info!("Loaded catalogue in {:?}", start.elapsed());

    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            cold_start,
            explain,
            json,
        } => {
            let mut config = config;
            if let Some(limit) = limit {
                config = config.with_top_n(limit);
            }
            if let Some(policy) = cold_start {
                config = config.with_cold_start(policy);
            }
            handle_recommend(Arc::new(index), config, user_id, explain, json)?
        }
        Commands::Rate {
            user_id,
            movie_id,
            rating,
        } => handle_rate(&mut index, &cli.data_dir, user_id, movie_id, rating)?,
        Commands::Watch {
            user_id,
            movie_id,
            off,
        } => handle_watch(&mut index, &cli.data_dir, user_id, movie_id, !off)?,
        Commands::Watchlist { user_id, query } => handle_watchlist(&index, user_id, query)?,
        Commands::Search { query, category } => handle_search(&index, query, category)?,
        Commands::Movie { user_id, movie_id } => handle_movie(&index, user_id, movie_id)?,
        Commands::Categories => handle_categories(&index)?,
        Commands::User { user_id } => handle_user(&index, user_id)?,
        Commands::Benchmark { requests } => handle_benchmark(Arc::new(index), config, requests)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    index: Arc<CatalogIndex>,
    config: RecommenderConfig,
    user_id: UserId,
    explain: bool,
    json: bool,
) -> Result<()> {
    let recommender = Recommender::with_config(index.clone(), config);
    let recommendations = recommender.recommend_movies(user_id);

    if json {
        let out = serde_json::to_string_pretty(&recommendations)
            .context("Failed to serialize recommendations")?;
        println!("{}", out);
        return Ok(());
    }

    print_recommendations(&index, user_id, &recommendations, explain);
    Ok(())
}

/// Handle the 'rate' command
fn handle_rate(
    index: &mut CatalogIndex,
    data_dir: &Path,
    user_id: UserId,
    movie_id: MovieId,
    rating: u8,
) -> Result<()> {
    let previous = index.user_rating(user_id, movie_id);
    index
        .rate(user_id, movie_id, rating)
        .with_context(|| format!("Could not rate movie {}", movie_id))?;
    index
        .save_user_data(data_dir)
        .context("Failed to save ratings")?;

    let title = movie_title(index, movie_id);
    match previous {
        Some(old) => println!(
            "{} Changed rating of {} from {} to {}",
            "✓".green(),
            title,
            old,
            rating
        ),
        None => println!("{} Rated {} with {}", "✓".green(), title, rating),
    }
    Ok(())
}

/// Handle the 'watch' command
fn handle_watch(
    index: &mut CatalogIndex,
    data_dir: &Path,
    user_id: UserId,
    movie_id: MovieId,
    watch: bool,
) -> Result<()> {
    index
        .set_watch(user_id, movie_id, watch)
        .with_context(|| format!("Could not update watchlist for movie {}", movie_id))?;
    index
        .save_user_data(data_dir)
        .context("Failed to save watchlist")?;

    let title = movie_title(index, movie_id);
    if watch {
        println!("{} Added {} to watchlist", "✓".green(), title);
    } else {
        println!("{} Removed {} from watchlist", "✓".green(), title);
    }
    Ok(())
}

/// Handle the 'watchlist' command
fn handle_watchlist(index: &CatalogIndex, user_id: UserId, query: Option<String>) -> Result<()> {
    let movies = index.watchlist(user_id, query.as_deref());

    println!("{}", format!("Watchlist for user {}:", user_id).bold().blue());
    if movies.is_empty() {
        println!("  (empty)");
    }
    for movie in movies {
        print_movie_line(index, user_id, movie);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(
    index: &CatalogIndex,
    query: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let matches = index.search_movies(query.as_deref(), category.as_deref());

    println!("{}", format!("{} movies found:", matches.len()).bold().blue());
    for movie in matches {
        let stats = index.movie_stats(movie.id);
        println!(
            "{}: {} ({}) [{}] avg {:.2} ({} ratings)",
            movie.id,
            movie.title,
            year_label(movie),
            movie.genre,
            stats.map(|s| s.avg_rating).unwrap_or(0.0),
            stats.map(|s| s.rating_count).unwrap_or(0)
        );
    }
    Ok(())
}

/// Handle the 'movie' command
fn handle_movie(index: &CatalogIndex, user_id: UserId, movie_id: MovieId) -> Result<()> {
    let detail = index
        .movie_detail(user_id, movie_id)
        .with_context(|| format!("Could not show movie {}", movie_id))?;
    let movie = detail.movie;

    println!("{}", format!("{}: {}", movie.id, movie.title).bold().blue());
    println!("{}Genre: {}", "• ".green(), movie.genre);
    println!(
        "{}Category: {}",
        "• ".green(),
        detail.category.map(|c| c.name.as_str()).unwrap_or("uncategorized")
    );
    println!("{}Released: {}", "• ".green(), year_label(movie));
    if let Some(description) = &movie.description {
        println!("{}{}", "• ".green(), description);
    }

    match detail.stats {
        Some(stats) => println!(
            "{}Average rating: {:.2} ({} ratings)",
            "• ".cyan(),
            stats.avg_rating,
            stats.rating_count
        ),
        None => println!("{}No ratings yet", "• ".cyan()),
    }
    let your_rating = detail
        .user_rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unrated".to_string());
    println!("{}Your rating: {}", "• ".cyan(), your_rating);
    println!(
        "{}On your watchlist: {}",
        "• ".cyan(),
        if detail.watching { "yes" } else { "no" }
    );
    Ok(())
}

/// Handle the 'categories' command
fn handle_categories(index: &CatalogIndex) -> Result<()> {
    println!("{}", "Categories:".bold().blue());
    for category in index.categories_by_name() {
        let count = index
            .search_movies(None, Some(&category.id.to_string()))
            .len();
        println!("{}: {} ({} movies)", category.id, category.name, count);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: &CatalogIndex, user_id: UserId) -> Result<()> {
    let ratings = index.get_user_ratings(user_id);
    let watchlist = index.watchlist(user_id, None);
    if ratings.is_empty() && watchlist.is_empty() {
        return Err(anyhow!("User {} has no ratings or watchlist entries", user_id));
    }

    println!("{}", format!("User ID: {}", user_id).bold().blue());

    let avg_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().map(|r| f64::from(r.rating)).sum::<f64>() / ratings.len() as f64
    };
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);
    println!("{}Watchlist size: {}", "• ".cyan(), watchlist.len());

    let mut top_rated: Vec<_> = ratings.iter().collect();
    top_rated.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.movie_id.cmp(&b.movie_id)));
    println!("Top rated movies:");
    for rating in top_rated.iter().take(5) {
        if let Some(movie) = index.get_movie(rating.movie_id) {
            println!("  - {} (Rating: {})", movie.title, rating.rating);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    index: Arc<CatalogIndex>,
    config: RecommenderConfig,
    requests: usize,
) -> Result<()> {
    let users = index.get_rating_user_ids();
    if users.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark: no rated users or no requests"));
    }

    let recommender = Recommender::with_config(index, config);

    // Random users drawn from those who have rated something
    let user_ids: Vec<UserId> = (0..requests)
        .map(|_| users[rand::random::<u32>() as usize % users.len()])
        .collect();

    let wall = Instant::now();
    let mut timings: Vec<Duration> = user_ids
        .par_iter()
        .map(|&user_id| {
            let start = Instant::now();
            let _ = recommender.recommend(user_id);
            start.elapsed()
        })
        .collect();
    let total_time = wall.elapsed();

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} on {} threads", requests, rayon::current_num_threads());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(
    index: &CatalogIndex,
    user_id: UserId,
    recommendations: &[Recommendation],
    explain: bool,
) {
    println!("{}", format!("Recommendations for user {}:", user_id).bold().blue());
    if recommendations.is_empty() {
        println!("  Nothing to recommend yet. Rate a few movies first.");
        return;
    }

    for (rank, rec) in recommendations.iter().enumerate() {
        let movie = &rec.movie;
        println!(
            "{}. {} ({}) [{}] - Score: {:.2}",
            (rank + 1).to_string().green(),
            movie.title,
            year_label(movie),
            movie.genre,
            rec.score
        );
        if explain {
            let category = movie
                .category
                .and_then(|id| index.get_category(id))
                .map(|c| c.name.as_str())
                .unwrap_or("uncategorized");
            match index.movie_stats(movie.id) {
                Some(stats) => println!(
                    "   {} | avg {:.2} over {} ratings | popularity {:.2}",
                    category, stats.avg_rating, stats.rating_count, stats.popularity_score
                ),
                None => println!("   {} | no ratings", category),
            }
        }
    }
}

fn print_movie_line(index: &CatalogIndex, user_id: UserId, movie: &Movie) {
    let rating = index
        .user_rating(user_id, movie.id)
        .map(|r| format!("rated {}", r))
        .unwrap_or_else(|| "unrated".to_string());
    println!(
        "  - {}: {} ({}) [{}] {}",
        movie.id,
        movie.title,
        year_label(movie),
        movie.genre,
        rating.dimmed()
    );
}

fn movie_title(index: &CatalogIndex, movie_id: MovieId) -> String {
    index
        .get_movie(movie_id)
        .map(|m| m.title.clone())
        .unwrap_or_else(|| format!("movie {}", movie_id))
}

fn year_label(movie: &Movie) -> String {
    movie
        .release_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
