use crate::config::AnalysisConfig;
use crate::model::Movie;
use tracing::info;

/// Numeric column a movie can be ranked or sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Revenue,
    Budget,
    Profit,
    Roi,
    VoteCount,
    Rating,
    Popularity,
    Runtime,
    ReleaseYear,
}

impl Metric {
    pub fn value(&self, movie: &Movie) -> Option<f64> {
        match self {
            Metric::Revenue => movie.revenue_musd,
            Metric::Budget => movie.budget_musd,
            Metric::Profit => movie.profit_musd,
            Metric::Roi => movie.roi,
            Metric::VoteCount => movie.vote_count.map(f64::from),
            Metric::Rating => movie.vote_average,
            Metric::Popularity => movie.popularity,
            Metric::Runtime => movie.runtime.map(f64::from),
            Metric::ReleaseYear => movie.release_year.map(f64::from),
        }
    }

    /// Column name as it appears in the flat files.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue_musd",
            Metric::Budget => "budget_musd",
            Metric::Profit => "profit_musd",
            Metric::Roi => "roi",
            Metric::VoteCount => "vote_count",
            Metric::Rating => "vote_average",
            Metric::Popularity => "popularity",
            Metric::Runtime => "runtime",
            Metric::ReleaseYear => "release_year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RankingKind {
    HighestRevenue,
    HighestBudget,
    HighestProfit,
    LowestProfit,
    HighestRoi,
    LowestRoi,
    MostVoted,
    HighestRated,
    LowestRated,
    MostPopular,
}

impl RankingKind {
    pub const ALL: [RankingKind; 10] = [
        RankingKind::HighestRevenue,
        RankingKind::HighestBudget,
        RankingKind::HighestProfit,
        RankingKind::LowestProfit,
        RankingKind::HighestRoi,
        RankingKind::LowestRoi,
        RankingKind::MostVoted,
        RankingKind::HighestRated,
        RankingKind::LowestRated,
        RankingKind::MostPopular,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RankingKind::HighestRevenue => "highest_revenue",
            RankingKind::HighestBudget => "highest_budget",
            RankingKind::HighestProfit => "highest_profit",
            RankingKind::LowestProfit => "lowest_profit",
            RankingKind::HighestRoi => "highest_roi",
            RankingKind::LowestRoi => "lowest_roi",
            RankingKind::MostVoted => "most_voted",
            RankingKind::HighestRated => "highest_rated",
            RankingKind::LowestRated => "lowest_rated",
            RankingKind::MostPopular => "most_popular",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RankingKind::HighestRevenue => "Highest Revenue Movies",
            RankingKind::HighestBudget => "Highest Budget Movies",
            RankingKind::HighestProfit => "Highest Profit Movies",
            RankingKind::LowestProfit => "Lowest Profit Movies (Biggest Losses)",
            RankingKind::HighestRoi => "Best ROI",
            RankingKind::LowestRoi => "Worst ROI",
            RankingKind::MostVoted => "Most Voted Movies",
            RankingKind::HighestRated => "Highest Rated Movies",
            RankingKind::LowestRated => "Lowest Rated Movies",
            RankingKind::MostPopular => "Most Popular Movies",
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            RankingKind::HighestRevenue => Metric::Revenue,
            RankingKind::HighestBudget => Metric::Budget,
            RankingKind::HighestProfit | RankingKind::LowestProfit => Metric::Profit,
            RankingKind::HighestRoi | RankingKind::LowestRoi => Metric::Roi,
            RankingKind::MostVoted => Metric::VoteCount,
            RankingKind::HighestRated | RankingKind::LowestRated => Metric::Rating,
            RankingKind::MostPopular => Metric::Popularity,
        }
    }

    pub fn ascending(&self) -> bool {
        matches!(
            self,
            RankingKind::LowestProfit | RankingKind::LowestRoi | RankingKind::LowestRated
        )
    }

    /// Eligibility threshold applied before ranking.
    fn admits(&self, movie: &Movie, cfg: &AnalysisConfig) -> bool {
        match self {
            RankingKind::HighestRoi | RankingKind::LowestRoi => movie
                .budget_musd
                .is_some_and(|b| b >= cfg.min_budget_musd_for_roi),
            RankingKind::HighestRated | RankingKind::LowestRated => movie
                .vote_count
                .is_some_and(|v| v >= cfg.min_votes_for_rating),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedMovie {
    pub rank: usize,
    pub id: u64,
    pub title: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub kind: RankingKind,
    pub entries: Vec<RankedMovie>,
}

/// Top `n` movies by `metric` among those accepted by `filter`.
/// Movies without a value are skipped; ties keep dataset order.
pub fn top_movies<F>(
    movies: &[Movie],
    metric: Metric,
    n: usize,
    ascending: bool,
    filter: F,
) -> Vec<RankedMovie>
where
    F: Fn(&Movie) -> bool,
{
    let mut scored: Vec<(&Movie, f64)> = movies
        .iter()
        .filter(|m| filter(m))
        .filter_map(|m| metric.value(m).map(|v| (m, v)))
        .collect();

    // Stable sort, so equal values stay in input order.
    if ascending {
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    } else {
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    }

    scored
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (m, value))| RankedMovie {
            rank: i + 1,
            id: m.id,
            title: m.title.clone(),
            value,
        })
        .collect()
}

pub fn ranking(movies: &[Movie], kind: RankingKind, cfg: &AnalysisConfig) -> Ranking {
    Ranking {
        kind,
        entries: top_movies(movies, kind.metric(), cfg.top_n, kind.ascending(), |m| {
            kind.admits(m, cfg)
        }),
    }
}

pub fn all_rankings(movies: &[Movie], cfg: &AnalysisConfig) -> Vec<Ranking> {
    info!("Generating all KPI rankings (top {})", cfg.top_n);
    let rankings: Vec<Ranking> = RankingKind::ALL
        .iter()
        .map(|&kind| ranking(movies, kind, cfg))
        .collect();
    info!("Generated {} ranking tables", rankings.len());
    rankings
}
