use crate::model::{pipe_list, Movie, RawMovie};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

/// Records with fewer populated fields than this are dropped.
pub const MIN_NON_NULL_FIELDS: usize = 10;

const TEXT_PLACEHOLDERS: [&str; 2] = ["no data", "n/a"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanStats {
    pub input: usize,
    pub duplicates: usize,
    pub missing_id_or_title: usize,
    pub too_sparse: usize,
    pub unreleased: usize,
    pub output: usize,
}

struct Candidate {
    id: Option<u64>,
    title: Option<String>,
    status: Option<String>,
    movie: Movie,
}

/// Coerces raw records into typed movies and drops the malformed ones.
/// Output keeps input order.
pub fn clean_movies(raw: &[RawMovie]) -> Vec<Movie> {
    clean_movies_with_stats(raw).0
}

pub fn clean_movies_with_stats(raw: &[RawMovie]) -> (Vec<Movie>, CleanStats) {
    let mut stats = CleanStats {
        input: raw.len(),
        ..CleanStats::default()
    };
    info!("Starting data cleaning. Input: {} records", raw.len());

    let candidates: Vec<Candidate> = raw.iter().map(coerce).collect();

    // Duplicates first, keeping the first occurrence of each id.
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(candidates.len());
    for c in candidates {
        if let Some(id) = c.id {
            if !seen.insert(id) {
                stats.duplicates += 1;
                continue;
            }
        }
        unique.push(c);
    }

    let mut movies = Vec::with_capacity(unique.len());
    for c in unique {
        let (Some(id), Some(title)) = (c.id, c.title) else {
            stats.missing_id_or_title += 1;
            continue;
        };
        let mut movie = c.movie;
        movie.id = id;
        movie.title = title;

        if movie.non_null_count() < MIN_NON_NULL_FIELDS {
            stats.too_sparse += 1;
            continue;
        }
        if c.status.as_deref().is_some_and(|s| s != "Released") {
            stats.unreleased += 1;
            continue;
        }
        movies.push(movie);
    }

    stats.output = movies.len();
    info!(
        "Cleaning complete: {} kept, {} duplicates, {} missing id/title, {} sparse, {} unreleased",
        stats.output,
        stats.duplicates,
        stats.missing_id_or_title,
        stats.too_sparse,
        stats.unreleased
    );
    (movies, stats)
}

fn coerce(raw: &RawMovie) -> Candidate {
    let movie = Movie {
        id: 0,
        title: String::new(),
        tagline: raw.get("tagline").and_then(free_text),
        release_date: raw.get("release_date").and_then(date),
        genres: raw.get("genres").map(|v| names(v, &["name"])).unwrap_or_default(),
        belongs_to_collection: raw.get("belongs_to_collection").and_then(collection_name),
        original_language: raw.get("original_language").and_then(text),
        budget_musd: raw.get("budget").and_then(positive).map(to_millions),
        revenue_musd: raw.get("revenue").and_then(positive).map(to_millions),
        production_companies: raw
            .get("production_companies")
            .map(|v| names(v, &["name"]))
            .unwrap_or_default(),
        production_countries: raw
            .get("production_countries")
            .map(|v| names(v, &["name"]))
            .unwrap_or_default(),
        vote_count: raw.get("vote_count").and_then(count),
        vote_average: raw.get("vote_average").and_then(number),
        popularity: raw.get("popularity").and_then(number),
        runtime: raw
            .get("runtime")
            .and_then(positive)
            .map(|m| m.round() as u32)
            .filter(|&m| m > 0),
        overview: raw.get("overview").and_then(free_text),
        spoken_languages: raw
            .get("spoken_languages")
            .map(|v| names(v, &["english_name", "name", "iso_639_1"]))
            .unwrap_or_default(),
        poster_path: raw.get("poster_path").and_then(text),
        cast: raw.get("cast").map(|v| names(v, &["name"])).unwrap_or_default(),
        cast_size: raw.get("cast_size").and_then(count).unwrap_or(0),
        director: raw.get("director").map(|v| names(v, &["name"])).unwrap_or_default(),
        crew_size: raw.get("crew_size").and_then(count).unwrap_or(0),
        ..Movie::default()
    };

    Candidate {
        id: raw.get("id").and_then(whole),
        title: raw.get("title").and_then(text),
        status: raw.get("status").and_then(text),
        movie,
    }
}

/// JSON number or numeric string; non-finite values are null.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Zero means "unknown" for budget, revenue and runtime.
fn positive(value: &Value) -> Option<f64> {
    number(value).filter(|&n| n > 0.0)
}

fn whole(value: &Value) -> Option<u64> {
    number(value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}

fn count(value: &Value) -> Option<u32> {
    whole(value).and_then(|n| u32::try_from(n).ok())
}

fn to_millions(usd: f64) -> f64 {
    usd / 1_000_000.0
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Like `text`, also nulling the usual "nothing here" placeholders.
fn free_text(value: &Value) -> Option<String> {
    text(value).filter(|s| !TEXT_PLACEHOLDERS.contains(&s.to_lowercase().as_str()))
}

fn date(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn collection_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("name").and_then(text),
        Value::String(_) => text(value),
        _ => None,
    }
}

/// Names from a list of objects (first present key wins), a list of strings,
/// or an already pipe-joined string.
fn names(value: &Value, keys: &[&str]) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => keys.iter().find_map(|k| map.get(*k).and_then(text)),
                Value::String(_) => text(item),
                _ => None,
            })
            .collect(),
        Value::String(joined) => pipe_list::split(joined),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_raw(id: u64, title: &str) -> RawMovie {
        RawMovie::from(json!({
            "id": id,
            "title": title,
            "adult": false,
            "imdb_id": "tt0000000",
            "tagline": "Every legend has a beginning.",
            "release_date": "2019-04-24",
            "genres": [{ "id": 12, "name": "Adventure" }, { "id": 878, "name": "Science Fiction" }],
            "belongs_to_collection": { "id": 86311, "name": "The Avengers Collection" },
            "original_language": "en",
            "budget": 356000000,
            "revenue": 2799439100u64,
            "production_companies": [{ "name": "Marvel Studios" }],
            "production_countries": [{ "iso_3166_1": "US", "name": "United States of America" }],
            "vote_count": 26000,
            "vote_average": 8.2,
            "popularity": 95.5,
            "runtime": 181,
            "overview": "After the devastating events...",
            "spoken_languages": [{ "english_name": "English", "iso_639_1": "en",
                                   "name": "English" },
                                 { "iso_639_1": "ja", "name": "日本語" }],
            "poster_path": "/or06FN3Dka5tukK1e9sl16pB3iy.jpg",
            "status": "Released",
            "cast": "Robert Downey Jr.|Chris Evans",
            "cast_size": 105,
            "director": "Anthony Russo|Joe Russo",
            "crew_size": 593
        }))
    }

    #[test]
    fn test_flattens_nested_fields() {
        let movies = clean_movies(&[full_raw(299534, "Avengers: Endgame")]);
        assert_eq!(movies.len(), 1);
        let m = &movies[0];
        assert_eq!(m.genres, vec!["Adventure", "Science Fiction"]);
        assert_eq!(m.belongs_to_collection.as_deref(), Some("The Avengers Collection"));
        assert_eq!(m.spoken_languages, vec!["English", "日本語"]);
        assert_eq!(m.production_countries, vec!["United States of America"]);
        assert_eq!(m.director, vec!["Anthony Russo", "Joe Russo"]);
        assert_eq!(m.release_date, NaiveDate::from_ymd_opt(2019, 4, 24));
        assert_eq!(m.budget_musd, Some(356.0));
        assert_eq!(m.runtime, Some(181));
        assert_eq!(m.vote_count, Some(26000));
    }

    #[test]
    fn test_zeros_placeholders_and_bad_types_become_null() {
        let mut raw = full_raw(1, "Zeroes");
        raw.insert("budget", 0);
        raw.insert("revenue", "not a number");
        raw.insert("runtime", 0);
        raw.insert("tagline", "No Data");
        raw.insert("overview", "  ");
        raw.insert("release_date", "2019-13-45");
        raw.insert("vote_average", "7.5");

        let m = &clean_movies(&[raw])[0];
        assert_eq!(m.budget_musd, None);
        assert_eq!(m.revenue_musd, None);
        assert_eq!(m.runtime, None);
        assert_eq!(m.tagline, None);
        assert_eq!(m.overview, None);
        assert_eq!(m.release_date, None);
        assert_eq!(m.vote_average, Some(7.5));
    }

    #[test]
    fn test_drops_duplicates_missing_keys_sparse_and_unreleased() {
        let mut rumored = full_raw(3, "Rumored");
        rumored.insert("status", "Rumored");
        let mut untitled = full_raw(4, "x");
        untitled.insert("title", Value::Null);
        let sparse = RawMovie::from(json!({ "id": 5, "title": "Sparse", "status": "Released" }));
        let mut bad_id = full_raw(6, "Bad id");
        bad_id.insert("id", "abc");

        let raw = vec![
            full_raw(1, "First"),
            full_raw(1, "First again"),
            full_raw(2, "Second"),
            rumored,
            untitled,
            sparse,
            bad_id,
        ];
        let (movies, stats) = clean_movies_with_stats(&raw);

        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(movies[0].title, "First");
        assert_eq!(
            stats,
            CleanStats {
                input: 7,
                duplicates: 1,
                missing_id_or_title: 2,
                too_sparse: 1,
                unreleased: 1,
                output: 2,
            }
        );
    }

    #[test]
    fn test_missing_status_is_kept() {
        let mut raw = full_raw(7, "No status");
        raw.0.remove("status");
        assert_eq!(clean_movies(&[raw]).len(), 1);
    }

    #[test]
    fn test_cleaning_is_deterministic() {
        let raw = vec![full_raw(1, "A"), full_raw(2, "B"), full_raw(1, "A dup")];
        assert_eq!(clean_movies(&raw), clean_movies(&raw));
    }
}
