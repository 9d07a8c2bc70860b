use crate::model::Movie;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    Empty,
    DuplicateIds(usize),
    EmptyTitles(usize),
    /// Records with none of the descriptive fields populated.
    BareRecords(usize),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty => write!(f, "dataset is empty"),
            ValidationIssue::DuplicateIds(n) => write!(f, "found {} duplicate movie ids", n),
            ValidationIssue::EmptyTitles(n) => write!(f, "found {} movies with an empty title", n),
            ValidationIssue::BareRecords(n) => write!(f, "found {} completely empty records", n),
        }
    }
}

pub fn validate_movies(movies: &[Movie]) -> Vec<ValidationIssue> {
    if movies.is_empty() {
        return vec![ValidationIssue::Empty];
    }
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    let duplicates = movies.iter().filter(|m| !seen.insert(m.id)).count();
    if duplicates > 0 {
        issues.push(ValidationIssue::DuplicateIds(duplicates));
    }

    let empty_titles = movies.iter().filter(|m| m.title.trim().is_empty()).count();
    if empty_titles > 0 {
        issues.push(ValidationIssue::EmptyTitles(empty_titles));
    }

    let bare = movies
        .iter()
        .filter(|m| m.field_presence().iter().all(|(_, set)| !set))
        .count();
    if bare > 0 {
        issues.push(ValidationIssue::BareRecords(bare));
    }
    issues
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_cells: usize,
    pub null_cells: usize,
    pub completeness: f64,
    pub null_counts: BTreeMap<&'static str, usize>,
}

impl QualityReport {
    pub fn columns_with_nulls(&self) -> Vec<&'static str> {
        self.null_counts
            .iter()
            .filter(|&(_, &n)| n > 0)
            .map(|(&name, _)| name)
            .collect()
    }
}

/// Null counts over the nullable descriptive fields.
pub fn quality_report(movies: &[Movie]) -> QualityReport {
    let mut null_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total_cells = 0;
    for movie in movies {
        for (name, set) in movie.field_presence() {
            total_cells += 1;
            let entry = null_counts.entry(name).or_default();
            if !set {
                *entry += 1;
            }
        }
    }
    let null_cells: usize = null_counts.values().sum();
    let completeness = if total_cells > 0 {
        (total_cells - null_cells) as f64 / total_cells as f64
    } else {
        0.0
    };

    QualityReport {
        total_rows: movies.len(),
        total_cells,
        null_cells,
        completeness,
        null_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.into(),
            ..Movie::default()
        }
    }

    #[test]
    fn test_reports_duplicates_and_blank_records() {
        let movies = vec![bare(1, "A"), bare(1, "A again"), bare(2, " ")];
        let issues = validate_movies(&movies);
        assert_eq!(
            issues,
            vec![
                ValidationIssue::DuplicateIds(1),
                ValidationIssue::EmptyTitles(1),
                ValidationIssue::BareRecords(3),
            ]
        );
        assert_eq!(validate_movies(&[]), vec![ValidationIssue::Empty]);
    }

    #[test]
    fn test_quality_report_counts_nulls() {
        let mut full = bare(1, "A");
        full.budget_musd = Some(10.0);
        full.genres = vec!["Drama".into()];
        let report = quality_report(&[full, bare(2, "B")]);

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.total_cells, 36);
        assert_eq!(report.null_cells, 34);
        assert_eq!(report.null_counts["budget_musd"], 1);
        assert_eq!(report.null_counts["runtime"], 2);
        assert!((report.completeness - 2.0 / 36.0).abs() < 1e-12);
        assert_eq!(report.columns_with_nulls().len(), 18);
    }
}
