// Stage orchestration: extract → clean → enrich → analyze → publish.
use crate::analysis::analyze;
use crate::api::CatalogApi;
use crate::config::AppConfig;
use crate::extract::extract;
use crate::model::{Movie, PipelineError, PipelineRun, RawMovie, StorageError};
use crate::report::render_report;
use crate::retry::RetryPolicy;
use crate::storage::{
    read_movies_csv, read_raw_json, write_movies_csv, write_raw_json, AnalyticsStore,
    ArtifactPaths,
};
use crate::transform::{
    clean_movies_with_stats, enrich_movies, quality_report, validate_movies,
};
use crate::visualize::render_all;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run: PipelineRun,
    pub report: String,
    pub charts: BTreeMap<String, PathBuf>,
}

/// Fetches raw records and writes the raw snapshot.
pub async fn extract_stage(
    api: &dyn CatalogApi,
    cfg: &AppConfig,
) -> Result<Vec<RawMovie>, PipelineError> {
    info!("=== Extract ===");
    let policy = RetryPolicy::from_config(&cfg.retry);
    let (raw, summary) = extract(api, &cfg.extract, &policy).await;
    info!(
        "Extraction summary: {}/{} succeeded",
        summary.succeeded, summary.requested
    );
    if raw.is_empty() {
        return Err(PipelineError::NoRecords);
    }
    let paths = ArtifactPaths::new(&cfg.output.data_dir);
    write_raw_json(&paths.raw_json(), &raw)?;
    Ok(raw)
}

/// Cleans and enriches, writing the processed and analytics CSVs.
pub fn transform_stage(raw: &[RawMovie], cfg: &AppConfig) -> Result<Vec<Movie>, PipelineError> {
    info!("=== Transform ===");
    let paths = ArtifactPaths::new(&cfg.output.data_dir);

    let (mut movies, _) = clean_movies_with_stats(raw);
    write_movies_csv(&paths.cleaned_csv(), &movies)?;

    enrich_movies(&mut movies);
    for issue in validate_movies(&movies) {
        warn!("Validation: {}", issue);
    }
    let quality = quality_report(&movies);
    info!(
        "Data quality: {} rows, {:.1}% complete",
        quality.total_rows,
        quality.completeness * 100.0
    );
    let sparse = quality.columns_with_nulls();
    if !sparse.is_empty() {
        info!("Columns with nulls: {}", sparse.join(", "));
    }

    write_movies_csv(&paths.final_csv(), &movies)?;
    Ok(movies)
}

struct Published {
    report: String,
    charts: BTreeMap<String, PathBuf>,
}

/// Analysis, text report, analytics database and charts for a final dataset.
fn publish_stage(
    movies: &[Movie],
    cfg: &AppConfig,
    run_started: DateTime<Utc>,
    raw_count: usize,
) -> Result<(Published, PipelineRun), PipelineError> {
    info!("=== Analyze ===");
    let paths = ArtifactPaths::new(&cfg.output.data_dir);
    let result = analyze(movies, &cfg.analysis);
    let report = render_report(movies, &result, &quality_report(movies));

    let report_path = paths.report();
    crate::storage::snapshot::ensure_parent(&report_path)?;
    fs::write(&report_path, &report).map_err(StorageError::from)?;
    info!("Report saved to {}", report_path.display());

    let charts = if cfg.output.charts {
        info!("=== Visualize ===");
        render_all(movies, &paths.charts_dir())
    } else {
        BTreeMap::new()
    };

    let run = PipelineRun {
        started_at: run_started,
        finished_at: Utc::now(),
        raw_count,
        cleaned_count: movies.len(),
        chart_count: charts.len(),
    };

    if cfg.output.sqlite {
        let mut store = AnalyticsStore::open(&paths.database())?;
        store.save_movies(movies)?;
        store.replace_rankings(&result.rankings)?;
        store.record_run(&run)?;
        info!("Analytics database holds {} movies", store.movie_count()?);
    }

    Ok((Published { report, charts }, run))
}

fn finish(published: Published, run: PipelineRun) -> PipelineOutput {
    info!(
        "Pipeline finished in {}s: {} raw, {} cleaned, {} charts",
        (run.finished_at - run.started_at).num_seconds(),
        run.raw_count,
        run.cleaned_count,
        run.chart_count
    );
    PipelineOutput {
        run,
        report: published.report,
        charts: published.charts,
    }
}

fn process_raw(
    raw: &[RawMovie],
    cfg: &AppConfig,
    started: DateTime<Utc>,
) -> Result<PipelineOutput, PipelineError> {
    let movies = transform_stage(raw, cfg)?;
    let (published, run) = publish_stage(&movies, cfg, started, raw.len())?;
    Ok(finish(published, run))
}

/// Full run against the catalog API.
pub async fn run_pipeline(
    api: &dyn CatalogApi,
    cfg: &AppConfig,
) -> Result<PipelineOutput, PipelineError> {
    let started = Utc::now();
    let raw = extract_stage(api, cfg).await?;
    process_raw(&raw, cfg, started)
}

/// Full run replaying a raw snapshot instead of calling the API.
pub fn run_from_raw(raw_path: &Path, cfg: &AppConfig) -> Result<PipelineOutput, PipelineError> {
    let started = Utc::now();
    let raw = read_raw_json(raw_path)?;
    if raw.is_empty() {
        return Err(PipelineError::NoRecords);
    }
    process_raw(&raw, cfg, started)
}

/// Analysis, report and charts from an existing analytics CSV.
pub fn run_analysis(input: &Path, cfg: &AppConfig) -> Result<PipelineOutput, PipelineError> {
    let started = Utc::now();
    let movies = read_movies_csv(input)?;
    if movies.is_empty() {
        return Err(PipelineError::NoRecords);
    }
    let (published, run) = publish_stage(&movies, cfg, started, 0)?;
    Ok(finish(published, run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Credits, DiscoverPage};
    use crate::model::ApiError;
    use serde_json::json;

    /// Serves one fixed movie for id 550 and 404s for everything else.
    struct OneMovie;

    #[async_trait::async_trait]
    impl CatalogApi for OneMovie {
        async fn discover_page(&self, _page: u32) -> Result<DiscoverPage, ApiError> {
            Err(ApiError::Status { status: 500, url: "discover".into() })
        }

        async fn movie_details(&self, id: u64) -> Result<RawMovie, ApiError> {
            if id != 550 {
                return Err(ApiError::NotFound(format!("movie/{}", id)));
            }
            Ok(RawMovie::from(json!({
                "id": 550, "title": "Fight Club", "status": "Released",
                "release_date": "1999-10-15", "budget": 63000000, "revenue": 100853753,
                "runtime": 139, "vote_count": 29000, "vote_average": 8.4, "popularity": 61.4,
                "genres": [{ "name": "Drama" }], "original_language": "en",
                "overview": "A ticking-time-bomb insomniac...",
                "spoken_languages": [{ "english_name": "English" }]
            })))
        }

        async fn movie_credits(&self, _id: u64) -> Result<Credits, ApiError> {
            Ok(serde_json::from_value(json!({
                "cast": [{ "name": "Edward Norton" }, { "name": "Brad Pitt" }],
                "crew": [{ "name": "David Fincher", "job": "Director" }]
            }))
            .unwrap())
        }
    }

    fn config(dir: &Path, ids: Vec<u64>) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.output.data_dir = dir.to_string_lossy().into_owned();
        cfg.output.charts = false;
        cfg.extract.movie_ids = ids;
        cfg.retry.initial_delay_ms = 0;
        cfg.retry.jitter = false;
        cfg
    }

    #[tokio::test]
    async fn test_full_run_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), vec![0, 550]);
        let output = run_pipeline(&OneMovie, &cfg).await.unwrap();

        assert_eq!(output.run.raw_count, 1);
        assert_eq!(output.run.cleaned_count, 1);
        let paths = ArtifactPaths::new(dir.path());
        for path in [
            paths.raw_json(),
            paths.cleaned_csv(),
            paths.final_csv(),
            paths.report(),
            paths.database(),
        ] {
            assert!(path.exists(), "missing {}", path.display());
        }
        assert!(output.report.contains("Fight Club"));

        let movies = read_movies_csv(&paths.final_csv()).unwrap();
        assert_eq!(movies[0].director, vec!["David Fincher"]);
        assert_eq!(movies[0].release_year, Some(1999));
    }

    #[tokio::test]
    async fn test_no_records_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), vec![0, 1]);
        let err = run_pipeline(&OneMovie, &cfg).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoRecords));
        assert!(!ArtifactPaths::new(dir.path()).raw_json().exists());
    }
}
