// Plain-text rendering of the analysis results.
use crate::analysis::{
    director_filmography, franchise_details, AnalysisResult, DirectorStats, Metric, Ranking,
};
use crate::model::Movie;
use crate::transform::QualityReport;
use std::fmt::Write;
use tabled::{Table, Tabled};

const RULE_WIDTH: usize = 60;

fn num(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into())
}

fn int<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn listing<R: Tabled>(rows: Vec<R>) -> String {
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    format!("{}\n", Table::new(rows))
}

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n{}\n{}\n", title, "=".repeat(RULE_WIDTH));
}

#[derive(Tabled)]
struct RankingRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct DirectorRow {
    #[tabled(rename = "Director")]
    name: String,
    #[tabled(rename = "Movies")]
    movies: usize,
    #[tabled(rename = "Total Revenue ($M)")]
    total_revenue: String,
    #[tabled(rename = "Mean Rating")]
    mean_rating: String,
    #[tabled(rename = "Total Profit ($M)")]
    total_profit: String,
}

#[derive(Tabled)]
struct FranchiseRow {
    #[tabled(rename = "Franchise")]
    name: String,
    #[tabled(rename = "Movies")]
    movies: usize,
    #[tabled(rename = "Total Budget ($M)")]
    total_budget: String,
    #[tabled(rename = "Total Revenue ($M)")]
    total_revenue: String,
    #[tabled(rename = "Mean Rating")]
    mean_rating: String,
    #[tabled(rename = "Franchise ROI")]
    roi: String,
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Franchise")]
    franchise: String,
    #[tabled(rename = "Standalone")]
    standalone: String,
}

#[derive(Tabled)]
struct MovieRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Budget ($M)")]
    budget: String,
    #[tabled(rename = "Revenue ($M)")]
    revenue: String,
    #[tabled(rename = "ROI")]
    roi: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Runtime")]
    runtime: String,
}

fn ranking_table(ranking: &Ranking) -> String {
    let rows = ranking
        .entries
        .iter()
        .map(|e| RankingRow {
            rank: e.rank,
            title: e.title.clone(),
            value: match ranking.kind.metric() {
                Metric::VoteCount => format!("{:.0}", e.value),
                _ => format!("{:.2}", e.value),
            },
        })
        .collect();
    listing(rows)
}

fn director_table(directors: &[DirectorStats]) -> String {
    let rows = directors
        .iter()
        .map(|d| DirectorRow {
            name: d.name.clone(),
            movies: d.movie_count,
            total_revenue: format!("{:.2}", d.total_revenue_musd),
            mean_rating: num(d.mean_rating),
            total_profit: format!("{:.2}", d.total_profit_musd),
        })
        .collect();
    listing(rows)
}

fn movie_table(movies: &[&Movie]) -> String {
    let rows = movies
        .iter()
        .map(|m| MovieRow {
            title: m.title.clone(),
            year: int(m.release_year),
            budget: num(m.budget_musd),
            revenue: num(m.revenue_musd),
            roi: num(m.roi),
            rating: num(m.vote_average),
            runtime: int(m.runtime),
        })
        .collect();
    listing(rows)
}

pub fn render_report(movies: &[Movie], result: &AnalysisResult, quality: &QualityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Movie analytics report");
    let _ = writeln!(
        out,
        "{} movies, {:.1}% of descriptive fields populated",
        quality.total_rows,
        quality.completeness * 100.0
    );

    for ranking in &result.rankings {
        section(
            &mut out,
            &format!("{} ({})", ranking.kind.title(), ranking.kind.metric().column()),
        );
        out.push_str(&ranking_table(ranking));
    }

    section(&mut out, "Franchise vs Standalone");
    let (f, s) = (&result.franchise_comparison.franchise, &result.franchise_comparison.standalone);
    let comparison = vec![
        ComparisonRow {
            metric: "Mean Revenue ($M)",
            franchise: num(f.mean_revenue_musd),
            standalone: num(s.mean_revenue_musd),
        },
        ComparisonRow {
            metric: "Median ROI",
            franchise: num(f.median_roi),
            standalone: num(s.median_roi),
        },
        ComparisonRow {
            metric: "Mean Budget ($M)",
            franchise: num(f.mean_budget_musd),
            standalone: num(s.mean_budget_musd),
        },
        ComparisonRow {
            metric: "Mean Popularity",
            franchise: num(f.mean_popularity),
            standalone: num(s.mean_popularity),
        },
        ComparisonRow {
            metric: "Mean Rating",
            franchise: num(f.mean_rating),
            standalone: num(s.mean_rating),
        },
        ComparisonRow {
            metric: "Movie Count",
            franchise: f.movie_count.to_string(),
            standalone: s.movie_count.to_string(),
        },
    ];
    out.push_str(&listing(comparison));

    section(&mut out, "Top Franchises");
    let franchises = result
        .top_franchises
        .iter()
        .map(|fr| FranchiseRow {
            name: fr.name.clone(),
            movies: fr.movie_count,
            total_budget: format!("{:.2}", fr.total_budget_musd),
            total_revenue: format!("{:.2}", fr.total_revenue_musd),
            mean_rating: num(fr.mean_rating),
            roi: num(fr.franchise_roi),
        })
        .collect();
    out.push_str(&listing(franchises));
    if let Some(top) = result.top_franchises.first() {
        section(&mut out, &format!("{} lineup", top.name));
        out.push_str(&movie_table(&franchise_details(movies, &top.name)));
    }

    section(&mut out, "Top Directors by Revenue");
    out.push_str(&director_table(&result.top_directors));
    section(&mut out, "Directors by Movie Count");
    out.push_str(&director_table(&result.directors_by_count));
    section(&mut out, "Directors by Mean Rating");
    out.push_str(&director_table(&result.directors_by_rating));
    if let Some(top) = result.top_directors.first() {
        section(&mut out, &format!("{} filmography", top.name));
        out.push_str(&movie_table(&director_filmography(movies, &top.name)));
    }

    section(&mut out, "Search: Sci-Fi Action movies with Bruce Willis");
    out.push_str(&movie_table(&result.scifi_action_willis.iter().collect::<Vec<_>>()));
    section(&mut out, "Search: Uma Thurman movies directed by Quentin Tarantino");
    out.push_str(&movie_table(&result.thurman_tarantino.iter().collect::<Vec<_>>()));

    out
}
