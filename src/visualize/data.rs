// Chart inputs derived from the final dataset.
use crate::analysis::stats::mean;
use crate::analysis::FranchiseComparison;
use crate::model::Movie;
use std::collections::{BTreeMap, HashMap};

/// Labelled points per scatter chart.
pub const ANNOTATED_POINTS: usize = 5;
const LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Marker radius in pixels.
    pub size: i32,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearStats {
    pub year: i32,
    pub mean_budget_musd: Option<f64>,
    pub mean_revenue_musd: Option<f64>,
    pub mean_rating: Option<f64>,
    pub movie_count: usize,
}

fn short_title(title: &str) -> String {
    title.chars().take(LABEL_CHARS).collect()
}

/// Labels the `ANNOTATED_POINTS` largest points by `rank_key`.
fn annotate(points: &mut [ScatterPoint], titles: &[&str], rank_key: impl Fn(&ScatterPoint) -> f64) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| rank_key(&points[b]).total_cmp(&rank_key(&points[a])));
    for &i in order.iter().take(ANNOTATED_POINTS) {
        points[i].label = Some(short_title(titles[i]));
    }
}

/// Budget on x, revenue on y; the top grossers are labelled.
pub fn revenue_budget_points(movies: &[Movie]) -> Vec<ScatterPoint> {
    let (mut points, titles): (Vec<ScatterPoint>, Vec<&str>) = movies
        .iter()
        .filter_map(|m| match (m.budget_musd, m.revenue_musd) {
            (Some(x), Some(y)) => Some((
                ScatterPoint { x, y, size: 6, label: None },
                m.title.as_str(),
            )),
            _ => None,
        })
        .unzip();
    annotate(&mut points, &titles, |p| p.y);
    points
}

/// Popularity on x, rating on y, marker size by revenue.
pub fn popularity_rating_points(movies: &[Movie]) -> Vec<ScatterPoint> {
    let plotted: Vec<&Movie> = movies
        .iter()
        .filter(|m| m.popularity.is_some() && m.vote_average.is_some())
        .collect();
    let max_revenue = plotted
        .iter()
        .filter_map(|m| m.revenue_musd)
        .fold(0.0_f64, f64::max);

    let (mut points, titles): (Vec<ScatterPoint>, Vec<&str>) = plotted
        .iter()
        .map(|m| {
            let share = match (m.revenue_musd, max_revenue > 0.0) {
                (Some(r), true) => r / max_revenue,
                _ => 0.1,
            };
            let point = ScatterPoint {
                x: m.popularity.unwrap_or_default(),
                y: m.vote_average.unwrap_or_default(),
                size: 4 + (share * 16.0).round() as i32,
                label: None,
            };
            (point, m.title.as_str())
        })
        .unzip();
    annotate(&mut points, &titles, |p| p.x);
    points
}

/// Mean ROI per genre, lowest first. Multi-genre movies count for each genre.
pub fn genre_roi(movies: &[Movie]) -> Vec<(String, f64)> {
    let mut per_genre: HashMap<&str, Vec<f64>> = HashMap::new();
    for movie in movies {
        if let Some(roi) = movie.roi {
            for genre in &movie.genres {
                per_genre.entry(genre.as_str()).or_default().push(roi);
            }
        }
    }
    let mut means: Vec<(String, f64)> = per_genre
        .into_iter()
        .filter_map(|(genre, rois)| {
            mean(rois.into_iter().map(Some)).map(|m| (genre.to_string(), m))
        })
        .collect();
    means.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    means
}

pub fn yearly_trends(movies: &[Movie]) -> Vec<YearStats> {
    let mut by_year: BTreeMap<i32, Vec<&Movie>> = BTreeMap::new();
    for movie in movies {
        if let Some(year) = movie.release_year {
            by_year.entry(year).or_default().push(movie);
        }
    }
    by_year
        .into_iter()
        .map(|(year, films)| YearStats {
            year,
            mean_budget_musd: mean(films.iter().map(|m| m.budget_musd)),
            mean_revenue_musd: mean(films.iter().map(|m| m.revenue_musd)),
            mean_rating: mean(films.iter().map(|m| m.vote_average)),
            movie_count: films.len(),
        })
        .collect()
}

/// `(metric, franchise, standalone)` bar groups. Rating is scaled by 10 so it
/// shares an axis with the money columns; missing means plot as zero.
pub fn franchise_bars(cmp: &FranchiseComparison) -> Vec<(&'static str, f64, f64)> {
    let (f, s) = (&cmp.franchise, &cmp.standalone);
    vec![
        (
            "Avg Revenue ($M)",
            f.mean_revenue_musd.unwrap_or(0.0),
            s.mean_revenue_musd.unwrap_or(0.0),
        ),
        ("Avg Budget ($M)", f.mean_budget_musd.unwrap_or(0.0), s.mean_budget_musd.unwrap_or(0.0)),
        (
            "Avg Rating (x10)",
            f.mean_rating.unwrap_or(0.0) * 10.0,
            s.mean_rating.unwrap_or(0.0) * 10.0,
        ),
        ("Avg Popularity", f.mean_popularity.unwrap_or(0.0), s.mean_popularity.unwrap_or(0.0)),
    ]
}
