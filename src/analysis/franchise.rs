use crate::analysis::stats::{mean, median, total};
use crate::model::Movie;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub movie_count: usize,
    pub mean_revenue_musd: Option<f64>,
    pub median_roi: Option<f64>,
    pub mean_budget_musd: Option<f64>,
    pub mean_popularity: Option<f64>,
    pub mean_rating: Option<f64>,
}

impl GroupSummary {
    fn of(movies: &[&Movie]) -> Self {
        Self {
            movie_count: movies.len(),
            mean_revenue_musd: mean(movies.iter().map(|m| m.revenue_musd)),
            median_roi: median(movies.iter().map(|m| m.roi)),
            mean_budget_musd: mean(movies.iter().map(|m| m.budget_musd)),
            mean_popularity: mean(movies.iter().map(|m| m.popularity)),
            mean_rating: mean(movies.iter().map(|m| m.vote_average)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FranchiseComparison {
    pub franchise: GroupSummary,
    pub standalone: GroupSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FranchiseStats {
    pub name: String,
    pub movie_count: usize,
    pub total_budget_musd: f64,
    pub mean_budget_musd: Option<f64>,
    pub total_revenue_musd: f64,
    pub mean_revenue_musd: Option<f64>,
    pub mean_rating: Option<f64>,
    pub total_profit_musd: f64,
    /// Total profit over total budget.
    pub franchise_roi: Option<f64>,
}

fn in_franchise(movie: &Movie) -> bool {
    movie.is_franchise || movie.belongs_to_collection.is_some()
}

pub fn compare_franchise_vs_standalone(movies: &[Movie]) -> FranchiseComparison {
    let (franchise, standalone): (Vec<&Movie>, Vec<&Movie>) =
        movies.iter().partition(|m| in_franchise(m));
    info!(
        "Franchise vs standalone: {} franchise, {} standalone",
        franchise.len(),
        standalone.len()
    );
    FranchiseComparison {
        franchise: GroupSummary::of(&franchise),
        standalone: GroupSummary::of(&standalone),
    }
}

/// Collections ranked by total revenue, largest first.
pub fn top_franchises(movies: &[Movie], n: usize) -> Vec<FranchiseStats> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Movie>> = HashMap::new();
    for movie in movies {
        if let Some(name) = movie.belongs_to_collection.as_deref() {
            groups
                .entry(name)
                .or_insert_with(|| {
                    order.push(name);
                    Vec::new()
                })
                .push(movie);
        }
    }
    if order.is_empty() {
        warn!("No franchise movies found");
        return Vec::new();
    }

    let mut stats: Vec<FranchiseStats> = order
        .into_iter()
        .map(|name| {
            let members = &groups[name];
            let total_budget = total(members.iter().map(|m| m.budget_musd));
            let total_profit = total(members.iter().map(|m| m.profit_musd));
            FranchiseStats {
                name: name.to_string(),
                movie_count: members.len(),
                total_budget_musd: total_budget,
                mean_budget_musd: mean(members.iter().map(|m| m.budget_musd)),
                total_revenue_musd: total(members.iter().map(|m| m.revenue_musd)),
                mean_revenue_musd: mean(members.iter().map(|m| m.revenue_musd)),
                mean_rating: mean(members.iter().map(|m| m.vote_average)),
                total_profit_musd: total_profit,
                franchise_roi: (total_budget > 0.0).then(|| total_profit / total_budget),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.total_revenue_musd.total_cmp(&a.total_revenue_musd));
    stats.truncate(n);
    info!("Found {} top franchises", stats.len());
    stats
}

/// Movies of one collection, oldest first; undated movies go last.
pub fn franchise_details<'a>(movies: &'a [Movie], name: &str) -> Vec<&'a Movie> {
    let mut members: Vec<&Movie> = movies
        .iter()
        .filter(|m| m.belongs_to_collection.as_deref() == Some(name))
        .collect();
    members.sort_by_key(|m| (m.release_year.is_none(), m.release_year));
    members
}
