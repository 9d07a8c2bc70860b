use reel_metrics::analysis::{
    all_rankings, search_scifi_action_bruce_willis, search_uma_thurman_tarantino, RankingKind,
};
use reel_metrics::config::AppConfig;
use reel_metrics::storage::{read_raw_json, AnalyticsStore, ArtifactPaths};
use reel_metrics::transform::{clean_movies_with_stats, enrich_movies, CleanStats};
use reel_metrics::{run_analysis, run_from_raw, Movie};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/movies_raw.json")
}

fn final_movies() -> Vec<Movie> {
    let raw = read_raw_json(&fixture()).unwrap();
    let (mut movies, _) = clean_movies_with_stats(&raw);
    enrich_movies(&mut movies);
    movies
}

fn config(data_dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.output.data_dir = data_dir.to_string_lossy().into_owned();
    cfg
}

#[test]
fn test_cleaning_drops_the_bad_records() {
    let raw = read_raw_json(&fixture()).unwrap();
    let (movies, stats) = clean_movies_with_stats(&raw);
    assert_eq!(
        stats,
        CleanStats {
            input: 11,
            duplicates: 1,
            missing_id_or_title: 1,
            too_sparse: 1,
            unreleased: 1,
            output: 7,
        }
    );
    let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![299534, 19995, 597, 18, 24, 680, 95]);
    assert!(movies.iter().all(|m| m.tagline.is_none()));
}

#[test]
fn test_transformation_is_idempotent() {
    let first = final_movies();
    assert_eq!(first, final_movies());

    let mut again = first.clone();
    enrich_movies(&mut again);
    assert_eq!(first, again);
}

#[test]
fn test_rankings_on_fixture() {
    let movies = final_movies();
    let rankings = all_rankings(&movies, &AppConfig::default().analysis);
    let ids = |kind: RankingKind| -> Vec<u64> {
        rankings
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.entries.iter().map(|e| e.id).collect())
            .unwrap()
    };

    assert_eq!(ids(RankingKind::HighestRevenue), vec![19995, 299534, 597, 95, 18]);
    // Pulp Fiction's 8M budget is under the ROI floor.
    assert_eq!(ids(RankingKind::HighestRoi), vec![19995, 597, 299534, 24, 95]);
    assert_eq!(ids(RankingKind::HighestRated), vec![680, 299534, 24, 597, 19995]);
    assert_eq!(ids(RankingKind::MostPopular), vec![299534, 19995, 597, 680, 18]);

    let willis: Vec<u64> = search_scifi_action_bruce_willis(&movies).iter().map(|m| m.id).collect();
    assert_eq!(willis, vec![18, 95]);
    let tarantino: Vec<u64> = search_uma_thurman_tarantino(&movies).iter().map(|m| m.id).collect();
    assert_eq!(tarantino, vec![24, 680]);
}

#[test]
fn test_offline_run_then_reanalysis() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let paths = ArtifactPaths::new(dir.path());

    let output = run_from_raw(&fixture(), &cfg).unwrap();
    assert_eq!(output.run.raw_count, 11);
    assert_eq!(output.run.cleaned_count, 7);
    assert_eq!(output.charts.len(), 5);
    assert!(paths.cleaned_csv().exists());
    assert_eq!(fs::read_to_string(paths.report()).unwrap(), output.report);

    // Cleaned snapshot carries no derived values; the final one does.
    let cleaned = fs::read_to_string(paths.cleaned_csv()).unwrap();
    let final_csv = fs::read_to_string(paths.final_csv()).unwrap();
    assert!(!cleaned.contains("Medium"));
    assert!(final_csv.contains("Medium"));

    let again = run_analysis(&paths.final_csv(), &cfg).unwrap();
    assert_eq!(again.report, output.report);

    let store = AnalyticsStore::open(&paths.database()).unwrap();
    assert_eq!(store.movie_count().unwrap(), 7);
    assert_eq!(store.run_count().unwrap(), 2);
    let stored: Vec<u64> = store
        .ranking("highest_revenue")
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(stored, vec![19995, 299534, 597, 95, 18]);
}
