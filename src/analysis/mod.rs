// Analysis module: KPI rankings, franchise and director aggregates, searches.

pub mod director;
pub mod franchise;
pub mod kpi;
pub mod search;
pub mod stats;

pub use director::{
    director_filmography, directors_by_movie_count, directors_by_rating, top_directors,
    DirectorStats,
};
pub use franchise::{
    compare_franchise_vs_standalone, franchise_details, top_franchises, FranchiseComparison,
    FranchiseStats,
};
pub use kpi::{all_rankings, top_movies, Metric, RankedMovie, Ranking, RankingKind};
pub use search::{search_scifi_action_bruce_willis, search_uma_thurman_tarantino, MovieQuery};

use crate::config::AnalysisConfig;
use crate::model::Movie;

/// Directors need this many films to be ranked by mean rating.
pub const MIN_MOVIES_FOR_DIRECTOR_RATING: usize = 2;

/// Everything the report and the analytics store need from one dataset.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub rankings: Vec<Ranking>,
    pub franchise_comparison: FranchiseComparison,
    pub top_franchises: Vec<FranchiseStats>,
    pub top_directors: Vec<DirectorStats>,
    pub directors_by_count: Vec<DirectorStats>,
    pub directors_by_rating: Vec<DirectorStats>,
    pub scifi_action_willis: Vec<Movie>,
    pub thurman_tarantino: Vec<Movie>,
}

pub fn analyze(movies: &[Movie], cfg: &AnalysisConfig) -> AnalysisResult {
    let n = cfg.top_groups;
    AnalysisResult {
        rankings: all_rankings(movies, cfg),
        franchise_comparison: compare_franchise_vs_standalone(movies),
        top_franchises: top_franchises(movies, n),
        top_directors: top_directors(movies, n, 1),
        directors_by_count: directors_by_movie_count(movies, n),
        directors_by_rating: directors_by_rating(movies, n, MIN_MOVIES_FOR_DIRECTOR_RATING),
        scifi_action_willis: search_scifi_action_bruce_willis(movies)
            .into_iter()
            .cloned()
            .collect(),
        thurman_tarantino: search_uma_thurman_tarantino(movies)
            .into_iter()
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(i: u64) -> Movie {
        Movie {
            id: i,
            title: format!("Movie {}", i),
            belongs_to_collection: Some(format!("Saga {}", i)),
            director: vec![format!("Director {}", i)],
            revenue_musd: Some(100.0 + i as f64),
            budget_musd: Some(50.0),
            profit_musd: Some(50.0 + i as f64),
            roi: Some((50.0 + i as f64) / 50.0),
            vote_average: Some(7.0),
            vote_count: Some(500),
            popularity: Some(i as f64),
            ..Movie::default()
        }
    }

    #[test]
    fn test_group_tables_use_their_own_limit() {
        let movies: Vec<Movie> = (1..=12).map(movie).collect();
        let result = analyze(&movies, &AnalysisConfig::default());

        assert!(result.rankings.iter().all(|r| r.entries.len() == 5));
        assert_eq!(result.top_franchises.len(), 10);
        assert_eq!(result.top_franchises[0].name, "Saga 12");
        assert_eq!(result.top_directors.len(), 10);
        assert_eq!(result.directors_by_count.len(), 10);

        let cfg = AnalysisConfig {
            top_groups: 3,
            ..AnalysisConfig::default()
        };
        let result = analyze(&movies, &cfg);
        assert_eq!(result.top_franchises.len(), 3);
        assert_eq!(result.top_directors.len(), 3);
    }
}
