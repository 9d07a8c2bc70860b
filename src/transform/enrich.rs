use crate::model::{Movie, RuntimeCategory};
use chrono::Datelike;
use tracing::info;

/// Votes needed before `vote_score` trusts the raw average fully.
pub const VOTE_SCORE_MIN_VOTES: f64 = 100.0;

/// Fills the derived fields in place. Running it twice gives the same result.
pub fn enrich_movies(movies: &mut [Movie]) {
    for movie in movies.iter_mut() {
        enrich_movie(movie);
    }
    let with_profit = movies.iter().filter(|m| m.profit_musd.is_some()).count();
    let with_roi = movies.iter().filter(|m| m.roi.is_some()).count();
    info!(
        "Enrichment complete: {} movies, profit for {}, ROI for {}",
        movies.len(),
        with_profit,
        with_roi
    );
}

fn enrich_movie(movie: &mut Movie) {
    movie.profit_musd = match (movie.revenue_musd, movie.budget_musd) {
        (Some(revenue), Some(budget)) => Some(revenue - budget),
        _ => None,
    };
    movie.roi = match (movie.profit_musd, movie.budget_musd) {
        (Some(profit), Some(budget)) if budget > 0.0 => Some(profit / budget),
        _ => None,
    };
    movie.release_year = movie.release_date.map(|d| d.year());
    movie.release_month = movie.release_date.map(|d| d.month());
    movie.runtime_category = movie.runtime.map(RuntimeCategory::from_minutes);
    movie.is_franchise = movie.belongs_to_collection.is_some();
    movie.vote_score = match (movie.vote_count, movie.vote_average) {
        (Some(count), Some(average)) => {
            let count = f64::from(count);
            Some(count / (count + VOTE_SCORE_MIN_VOTES) * average)
        }
        _ => None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn movie(budget: Option<f64>, revenue: Option<f64>) -> Movie {
        Movie {
            id: 1,
            title: "Test".into(),
            budget_musd: budget,
            revenue_musd: revenue,
            release_date: NaiveDate::from_ymd_opt(2020, 6, 15),
            runtime: Some(120),
            vote_count: Some(100),
            vote_average: Some(8.0),
            belongs_to_collection: Some("Collection".into()),
            ..Movie::default()
        }
    }

    #[test]
    fn test_profit_roi_and_dates() {
        let mut movies = vec![movie(Some(100.0), Some(500.0))];
        enrich_movies(&mut movies);
        let m = &movies[0];
        assert_eq!(m.profit_musd, Some(400.0));
        assert_eq!(m.roi, Some(4.0));
        assert_eq!(m.release_year, Some(2020));
        assert_eq!(m.release_month, Some(6));
        assert_eq!(m.runtime_category, Some(RuntimeCategory::Medium));
        assert!(m.is_franchise);
        assert_eq!(m.vote_score, Some(4.0));
    }

    #[test]
    fn test_missing_budget_leaves_profit_and_roi_null() {
        let mut movies = vec![movie(None, Some(500.0)), movie(Some(50.0), None)];
        enrich_movies(&mut movies);
        assert!(movies.iter().all(|m| m.profit_musd.is_none() && m.roi.is_none()));
    }

    #[test]
    fn test_runtime_boundaries() {
        assert_eq!(RuntimeCategory::from_minutes(89), RuntimeCategory::Short);
        assert_eq!(RuntimeCategory::from_minutes(90), RuntimeCategory::Medium);
        assert_eq!(RuntimeCategory::from_minutes(150), RuntimeCategory::Medium);
        assert_eq!(RuntimeCategory::from_minutes(151), RuntimeCategory::Long);
    }

    #[test]
    fn test_enrichment_is_idempotent() {
        let mut once = vec![movie(Some(30.0), Some(20.0))];
        enrich_movies(&mut once);
        let mut twice = once.clone();
        enrich_movies(&mut twice);
        assert_eq!(once, twice);
        assert_eq!(once[0].profit_musd, Some(-10.0));
    }
}
