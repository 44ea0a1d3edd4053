//! Parser and writer for the catalogue's flat data files.
//!
//! All files are UTF-8 text, one record per line, fields separated by `::`:
//! - categories.dat: categoryId::name
//! - movies.dat: movieId::title::genre::categoryId::releaseDate::description
//! - ratings.dat: userId::movieId::rating
//! - watchlist.dat: userId::movieId::watch (1 or 0)
//!
//! In movies.dat the last three fields may be empty. The description is the
//! remainder of the line, so it may itself contain `::`.

use crate::error::{CatalogError, Result};
use crate::types::*;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;

/// Read a file into non-empty, trimmed lines paired with their 1-based line number
fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Io(e),
    })?;

    Ok(content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty())
        .collect())
}

/// Take the next `::` field or report which one is missing
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &'static str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| CatalogError::Malformed {
        file,
        line,
        reason: format!("Missing {}", name),
    })
}

fn parse_number<T>(value: &str, file: &'static str, line: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| CatalogError::Malformed {
        file,
        line,
        reason: format!("Invalid {}: {}", name, e),
    })
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Parse the categories.dat file
pub fn parse_categories(path: &Path) -> Result<Vec<Category>> {
    const FILE: &str = "categories.dat";
    let mut categories = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let mut parts = line.splitn(2, "::");
        let id = next_field(&mut parts, FILE, line_no, "categoryId")?;
        let name = next_field(&mut parts, FILE, line_no, "name")?;

        categories.push(Category {
            id: parse_number(id, FILE, line_no, "categoryId")?,
            name: name.trim().to_string(),
        });
    }

    Ok(categories)
}

/// Parse the movies.dat file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    const FILE: &str = "movies.dat";
    let mut movies = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let mut parts = line.splitn(6, "::");
        let id = next_field(&mut parts, FILE, line_no, "movieId")?;
        let title = next_field(&mut parts, FILE, line_no, "title")?;
        let genre = next_field(&mut parts, FILE, line_no, "genre")?;
        // Trailing optional fields may be left off entirely
        let category = parts.next().and_then(non_empty);
        let release_date = parts.next().and_then(non_empty);
        let description = parts.next().and_then(non_empty);

        let release_year = match release_date {
            Some(date) => Some(extract_year_from_date(date).ok_or_else(|| {
                CatalogError::Malformed {
                    file: FILE,
                    line: line_no,
                    reason: format!("Invalid release date: {}", date),
                }
            })?),
            None => None,
        };

        movies.push(Movie {
            id: parse_number(id, FILE, line_no, "movieId")?,
            title: title.trim().to_string(),
            genre: genre.trim().to_string(),
            category: category
                .map(|c| parse_number(c, FILE, line_no, "categoryId"))
                .transpose()?,
            release_year,
            description: description.map(str::to_string),
        });
    }

    Ok(movies)
}

/// Parse the ratings.dat file
///
/// Range checking is left to `CatalogIndex::validate` so that a bad value is
/// reported as `RatingOutOfRange` rather than a parse failure.
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    const FILE: &str = "ratings.dat";
    let mut ratings = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let mut parts = line.split("::");
        let user_id = next_field(&mut parts, FILE, line_no, "userId")?;
        let movie_id = next_field(&mut parts, FILE, line_no, "movieId")?;
        let rating = next_field(&mut parts, FILE, line_no, "rating")?;

        ratings.push(Rating {
            user_id: parse_number(user_id, FILE, line_no, "userId")?,
            movie_id: parse_number(movie_id, FILE, line_no, "movieId")?,
            rating: parse_number(rating, FILE, line_no, "rating")?,
        });
    }

    Ok(ratings)
}

/// Parse the watchlist.dat file
pub fn parse_watchlist(path: &Path) -> Result<Vec<WatchlistEntry>> {
    const FILE: &str = "watchlist.dat";
    let mut entries = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let mut parts = line.split("::");
        let user_id = next_field(&mut parts, FILE, line_no, "userId")?;
        let movie_id = next_field(&mut parts, FILE, line_no, "movieId")?;
        let watch = next_field(&mut parts, FILE, line_no, "watch")?;

        let watch = match watch.trim() {
            "1" => true,
            "0" => false,
            other => {
                return Err(CatalogError::Malformed {
                    file: FILE,
                    line: line_no,
                    reason: format!("Invalid watch flag: {}", other),
                });
            }
        };

        entries.push(WatchlistEntry {
            user_id: parse_number(user_id, FILE, line_no, "userId")?,
            movie_id: parse_number(movie_id, FILE, line_no, "movieId")?,
            watch,
        });
    }

    Ok(entries)
}

/// Write ratings in ratings.dat format, replacing the file
pub fn write_ratings(path: &Path, ratings: &[Rating]) -> Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    for r in ratings {
        writeln!(out, "{}::{}::{}", r.user_id, r.movie_id, r.rating)?;
    }
    out.flush()?;
    Ok(())
}

/// Write watchlist entries in watchlist.dat format, replacing the file
pub fn write_watchlist(path: &Path, entries: &[WatchlistEntry]) -> Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    for e in entries {
        writeln!(out, "{}::{}::{}", e.user_id, e.movie_id, u8::from(e.watch))?;
    }
    out.flush()?;
    Ok(())
}

/// Extract the year from a release date
///
/// Example: "1999-03-31" -> Some(1999)
///          "1999" -> Some(1999)
///          "soon" -> None
fn extract_year_from_date(date: &str) -> Option<u16> {
    let year = date.split('-').next()?;
    if year.len() != 4 {
        return None;
    }
    year.parse().ok()
}
