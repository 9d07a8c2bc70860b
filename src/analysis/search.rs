// Filtered movie searches over genre, cast and director lists.
use crate::analysis::kpi::Metric;
use crate::model::Movie;
use tracing::info;

/// True when every required genre matches one of the movie's genres, either
/// way round as a case-insensitive substring ("fiction" matches "Science Fiction").
pub fn check_genres(genres: &[String], required: &[String]) -> bool {
    if genres.is_empty() {
        return false;
    }
    let have: Vec<String> = genres.iter().map(|g| g.trim().to_lowercase()).collect();
    required.iter().all(|genre| {
        let want = genre.to_lowercase();
        have.iter().any(|g| g.contains(&want) || want.contains(g.as_str()))
    })
}

pub fn check_cast(cast: &[String], actor: &str) -> bool {
    contains_name(cast, actor)
}

pub fn check_director(directors: &[String], director: &str) -> bool {
    contains_name(directors, director)
}

fn contains_name(names: &[String], wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    names.iter().any(|n| n.to_lowercase().contains(&wanted))
}

/// Composable movie search. Every criterion left unset matches everything.
#[derive(Debug, Clone)]
pub struct MovieQuery {
    genres: Vec<String>,
    actor: Option<String>,
    director: Option<String>,
    min_rating: Option<f64>,
    max_rating: Option<f64>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    sort_by: Metric,
    ascending: bool,
}

impl Default for MovieQuery {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            actor: None,
            director: None,
            min_rating: None,
            max_rating: None,
            min_year: None,
            max_year: None,
            sort_by: Metric::Rating,
            ascending: false,
        }
    }
}

impl MovieQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genre(mut self, genre: &str) -> Self {
        self.genres.push(genre.to_string());
        self
    }

    pub fn actor(mut self, name: &str) -> Self {
        self.actor = Some(name.to_string());
        self
    }

    pub fn director(mut self, name: &str) -> Self {
        self.director = Some(name.to_string());
        self
    }

    pub fn rating_between(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_rating = min;
        self.max_rating = max;
        self
    }

    pub fn years_between(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_year = min;
        self.max_year = max;
        self
    }

    pub fn sort_by(mut self, metric: Metric, ascending: bool) -> Self {
        self.sort_by = metric;
        self.ascending = ascending;
        self
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        if !self.genres.is_empty() && !check_genres(&movie.genres, &self.genres) {
            return false;
        }
        if let Some(actor) = &self.actor {
            if !check_cast(&movie.cast, actor) {
                return false;
            }
        }
        if let Some(director) = &self.director {
            if !check_director(&movie.director, director) {
                return false;
            }
        }
        // A bound on a missing value never matches.
        if let Some(min) = self.min_rating {
            if !movie.vote_average.is_some_and(|r| r >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_rating {
            if !movie.vote_average.is_some_and(|r| r <= max) {
                return false;
            }
        }
        if let Some(min) = self.min_year {
            if !movie.release_year.is_some_and(|y| y >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_year {
            if !movie.release_year.is_some_and(|y| y <= max) {
                return false;
            }
        }
        true
    }

    /// Matching movies sorted by the sort key; movies without it go last.
    pub fn run<'a>(&self, movies: &'a [Movie]) -> Vec<&'a Movie> {
        let mut found: Vec<&Movie> = movies.iter().filter(|m| self.matches(m)).collect();
        let metric = self.sort_by;
        let ascending = self.ascending;
        found.sort_by(|a, b| match (metric.value(a), metric.value(b)) {
            (Some(x), Some(y)) if ascending => x.total_cmp(&y),
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        found
    }
}

/// Best rated Science Fiction Action movies starring Bruce Willis.
pub fn search_scifi_action_bruce_willis(movies: &[Movie]) -> Vec<&Movie> {
    let found = MovieQuery::new()
        .genre("Science Fiction")
        .genre("Action")
        .actor("Bruce Willis")
        .sort_by(Metric::Rating, false)
        .run(movies);
    info!("Search: {} Sci-Fi Action movies with Bruce Willis", found.len());
    found
}

/// Uma Thurman movies directed by Quentin Tarantino, shortest first.
pub fn search_uma_thurman_tarantino(movies: &[Movie]) -> Vec<&Movie> {
    let found = MovieQuery::new()
        .actor("Uma Thurman")
        .director("Quentin Tarantino")
        .sort_by(Metric::Runtime, true)
        .run(movies);
    info!("Search: {} Uma Thurman movies directed by Tarantino", found.len());
    found
}
