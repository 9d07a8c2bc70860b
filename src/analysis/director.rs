use crate::analysis::stats::{mean, total};
use crate::model::Movie;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DirectorStats {
    pub name: String,
    pub movie_count: usize,
    pub total_revenue_musd: f64,
    pub mean_revenue_musd: Option<f64>,
    pub mean_rating: Option<f64>,
    pub total_profit_musd: f64,
}

/// Per-director aggregates in order of first appearance. A movie with several
/// directors counts for each of them.
pub fn director_stats(movies: &[Movie]) -> Vec<DirectorStats> {
    let mut order: Vec<&str> = Vec::new();
    let mut credited: HashMap<&str, Vec<&Movie>> = HashMap::new();
    for movie in movies {
        for name in &movie.director {
            credited
                .entry(name.as_str())
                .or_insert_with(|| {
                    order.push(name.as_str());
                    Vec::new()
                })
                .push(movie);
        }
    }
    if order.is_empty() {
        warn!("No movies with director information found");
    }

    order
        .into_iter()
        .map(|name| {
            let films = &credited[name];
            DirectorStats {
                name: name.to_string(),
                movie_count: films.len(),
                total_revenue_musd: total(films.iter().map(|m| m.revenue_musd)),
                mean_revenue_musd: mean(films.iter().map(|m| m.revenue_musd)),
                mean_rating: mean(films.iter().map(|m| m.vote_average)),
                total_profit_musd: total(films.iter().map(|m| m.profit_musd)),
            }
        })
        .collect()
}

/// Directors with at least `min_movies` films, by total revenue.
pub fn top_directors(movies: &[Movie], n: usize, min_movies: usize) -> Vec<DirectorStats> {
    let mut stats: Vec<DirectorStats> = director_stats(movies)
        .into_iter()
        .filter(|d| d.movie_count >= min_movies)
        .collect();
    stats.sort_by(|a, b| b.total_revenue_musd.total_cmp(&a.total_revenue_musd));
    stats.truncate(n);
    info!("Found {} top directors (with >= {} movies)", stats.len(), min_movies);
    stats
}

pub fn directors_by_movie_count(movies: &[Movie], n: usize) -> Vec<DirectorStats> {
    let mut stats = director_stats(movies);
    stats.sort_by(|a, b| b.movie_count.cmp(&a.movie_count));
    stats.truncate(n);
    stats
}

/// Directors with a known mean rating and at least `min_movies` films.
pub fn directors_by_rating(movies: &[Movie], n: usize, min_movies: usize) -> Vec<DirectorStats> {
    let mut stats: Vec<DirectorStats> = director_stats(movies)
        .into_iter()
        .filter(|d| d.movie_count >= min_movies && d.mean_rating.is_some())
        .collect();
    stats.sort_by(|a, b| {
        let (a, b) = (a.mean_rating.unwrap_or_default(), b.mean_rating.unwrap_or_default());
        b.total_cmp(&a)
    });
    stats.truncate(n);
    stats
}

/// Movies whose director list mentions `name` (case-insensitive substring),
/// oldest first.
pub fn director_filmography<'a>(movies: &'a [Movie], name: &str) -> Vec<&'a Movie> {
    let needle = name.to_lowercase();
    let mut films: Vec<&Movie> = movies
        .iter()
        .filter(|m| m.director.iter().any(|d| d.to_lowercase().contains(&needle)))
        .collect();
    films.sort_by_key(|m| (m.release_year.is_none(), m.release_year));
    films
}
