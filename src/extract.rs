// Extraction: id discovery, detail + credit fetching, retry and skip policy.
use crate::api::{CatalogApi, Credits};
use crate::config::ExtractConfig;
use crate::model::{ApiError, ExtractionSummary, RawMovie};
use crate::retry::{run_with_retry, RetryPolicy};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Billed cast members kept per movie.
pub const TOP_CAST: usize = 10;

/// Builds the ordered, de-duplicated id list: configured ids first, then
/// discovered ones, capped at `max_records`.
pub async fn collect_ids(
    api: &dyn CatalogApi,
    cfg: &ExtractConfig,
    policy: &RetryPolicy,
) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut ids: Vec<u64> = cfg
        .movie_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if cfg.discover {
        for id in discover_ids(api, cfg, policy).await {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }

    if ids.len() > cfg.max_records {
        info!("Capping {} ids at max_records = {}", ids.len(), cfg.max_records);
        ids.truncate(cfg.max_records);
    }
    ids
}

/// Walks discover pages until `max_pages`, the last page, or `max_records`.
/// A page that keeps failing ends the walk; what was gathered is kept.
async fn discover_ids(api: &dyn CatalogApi, cfg: &ExtractConfig, policy: &RetryPolicy) -> Vec<u64> {
    let mut ids = Vec::new();
    let mut page = 1;

    while page <= cfg.max_pages && ids.len() < cfg.max_records {
        let step = format!("discover page {}", page);
        let result = run_with_retry(policy, &step, || api.discover_page(page)).await;
        match result {
            Ok(listing) => {
                info!(
                    "Discover page {}/{}: {} entries",
                    page,
                    listing.total_pages,
                    listing.results.len()
                );
                let empty = listing.results.is_empty();
                ids.extend(listing.results.into_iter().map(|entry| entry.id));
                if empty || (listing.total_pages > 0 && page >= listing.total_pages) {
                    break;
                }
            }
            Err(e) => {
                error!("Aborting discovery at page {}: {}", page, e);
                break;
            }
        }
        page += 1;
    }

    ids.truncate(cfg.max_records);
    ids
}

/// Fetches details and credits for every id, in order. Movies whose details
/// cannot be fetched are logged and skipped.
pub async fn fetch_movies(
    api: &dyn CatalogApi,
    ids: &[u64],
    policy: &RetryPolicy,
) -> (Vec<RawMovie>, ExtractionSummary) {
    info!("Starting extraction for {} movies...", ids.len());
    let mut movies = Vec::with_capacity(ids.len());
    let mut failed_ids = Vec::new();

    for (i, &id) in ids.iter().enumerate() {
        info!("Fetching movie {}/{} (ID: {})...", i + 1, ids.len(), id);

        let step = format!("movie {}", id);
        let mut movie = match run_with_retry(policy, &step, || api.movie_details(id)).await {
            Ok(movie) => movie,
            Err(ApiError::NotFound(_)) => {
                warn!("Movie ID {} not found, skipping", id);
                failed_ids.push(id);
                continue;
            }
            Err(e) => {
                error!("Error fetching movie {}: {}", id, e);
                failed_ids.push(id);
                continue;
            }
        };

        let step = format!("credits {}", id);
        let credits = match run_with_retry(policy, &step, || api.movie_credits(id)).await {
            Ok(credits) => Some(credits),
            Err(e) => {
                warn!("No credits for movie {}: {}", id, e);
                None
            }
        };
        attach_credits(&mut movie, credits.as_ref());
        movies.push(movie);
    }

    let summary = ExtractionSummary {
        requested: ids.len(),
        succeeded: movies.len(),
        failed_ids,
    };
    info!(
        "Extraction complete: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed_ids.len()
    );
    if !summary.failed_ids.is_empty() {
        warn!("Failed movie IDs: {:?}", summary.failed_ids);
    }
    (movies, summary)
}

pub async fn extract(
    api: &dyn CatalogApi,
    cfg: &ExtractConfig,
    policy: &RetryPolicy,
) -> (Vec<RawMovie>, ExtractionSummary) {
    let ids = collect_ids(api, cfg, policy).await;
    fetch_movies(api, &ids, policy).await
}

/// Adds the pipe-joined cast/director summary and crew sizes to a raw record.
pub fn attach_credits(movie: &mut RawMovie, credits: Option<&Credits>) {
    match credits {
        Some(credits) if !credits.cast.is_empty() => {
            let names: Vec<&str> = credits
                .cast
                .iter()
                .take(TOP_CAST)
                .map(|c| c.name.as_str())
                .collect();
            movie.insert("cast", names.join("|"));
            movie.insert("cast_size", credits.cast.len() as u64);
        }
        _ => {
            movie.insert("cast", Value::Null);
            movie.insert("cast_size", 0u64);
        }
    }

    match credits {
        Some(credits) if !credits.crew.is_empty() => {
            let directors: Vec<&str> = credits
                .crew
                .iter()
                .filter(|c| c.job == "Director")
                .map(|c| c.name.as_str())
                .collect();
            if directors.is_empty() {
                movie.insert("director", Value::Null);
            } else {
                movie.insert("director", directors.join("|"));
            }
            movie.insert("crew_size", credits.crew.len() as u64);
        }
        _ => {
            movie.insert("director", Value::Null);
            movie.insert("crew_size", 0u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CastMember, CrewMember, DiscoverEntry, DiscoverPage};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeCatalog {
        movies: HashMap<u64, Value>,
        pages: Vec<Vec<u64>>,
        broken_page: Option<u32>,
        /// Remaining 503s before an id starts succeeding.
        flaky: Mutex<HashMap<u64, u32>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn with_movies(ids: &[u64]) -> Self {
            let movies = ids
                .iter()
                .map(|&id| (id, json!({ "id": id, "title": format!("Movie {}", id) })))
                .collect();
            Self {
                movies,
                ..Self::default()
            }
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    fn unavailable(url: String) -> ApiError {
        ApiError::Status { status: 503, url }
    }

    #[async_trait::async_trait]
    impl CatalogApi for FakeCatalog {
        async fn discover_page(&self, page: u32) -> Result<DiscoverPage, ApiError> {
            self.log(format!("page {}", page));
            if self.broken_page == Some(page) {
                return Err(unavailable(format!("discover/{}", page)));
            }
            let results = self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|id| DiscoverEntry { id })
                .collect();
            Ok(DiscoverPage {
                page,
                total_pages: self.pages.len() as u32,
                results,
            })
        }

        async fn movie_details(&self, id: u64) -> Result<RawMovie, ApiError> {
            self.log(format!("details {}", id));
            {
                let mut flaky = self.flaky.lock().unwrap();
                if let Some(left) = flaky.get_mut(&id) {
                    if *left > 0 {
                        *left -= 1;
                        return Err(unavailable(format!("movie/{}", id)));
                    }
                }
            }
            self.movies
                .get(&id)
                .cloned()
                .map(RawMovie::from)
                .ok_or_else(|| ApiError::NotFound(format!("movie/{}", id)))
        }

        async fn movie_credits(&self, id: u64) -> Result<Credits, ApiError> {
            self.log(format!("credits {}", id));
            Ok(Credits {
                cast: vec![CastMember { name: format!("Actor {}", id) }],
                crew: vec![CrewMember {
                    name: format!("Director {}", id),
                    job: "Director".into(),
                }],
            })
        }
    }

    fn cfg(ids: Vec<u64>) -> ExtractConfig {
        ExtractConfig {
            movie_ids: ids,
            discover: false,
            max_pages: 10,
            max_records: 100,
        }
    }

    #[tokio::test]
    async fn test_missing_movie_is_skipped_not_fatal() {
        let api = FakeCatalog::with_movies(&[597, 19995]);
        let policy = RetryPolicy::immediate(3);
        let (movies, summary) = extract(&api, &cfg(vec![0, 597, 19995]), &policy).await;

        assert_eq!(movies.len(), 2);
        assert_eq!(summary.failed_ids, vec![0]);
        // 404 is final: exactly one call for id 0.
        assert_eq!(api.count("details 0"), 1);
        assert_eq!(movies[0].get("director"), Some(&json!("Director 597")));
        assert_eq!(movies[0].get("cast_size"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_flaky_movie_recovers_within_budget() {
        let api = FakeCatalog::with_movies(&[597]);
        api.flaky.lock().unwrap().insert(597, 2);
        let (movies, summary) = fetch_movies(&api, &[597], &RetryPolicy::immediate(3)).await;

        assert_eq!(movies.len(), 1);
        assert!(summary.failed_ids.is_empty());
        assert_eq!(api.count("details 597"), 3);
    }

    #[tokio::test]
    async fn test_flaky_movie_skipped_after_budget() {
        let api = FakeCatalog::with_movies(&[597, 24428]);
        api.flaky.lock().unwrap().insert(597, 10);
        let (movies, summary) = fetch_movies(&api, &[597, 24428], &RetryPolicy::immediate(3)).await;

        assert_eq!(summary.failed_ids, vec![597]);
        assert_eq!(movies.len(), 1);
        assert_eq!(api.count("details 597"), 3);
    }

    #[tokio::test]
    async fn test_discovery_respects_record_limit() {
        let mut api = FakeCatalog::default();
        api.pages = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        let config = ExtractConfig {
            movie_ids: vec![2],
            discover: true,
            max_pages: 10,
            max_records: 5,
        };
        let ids = collect_ids(&api, &config, &RetryPolicy::immediate(1)).await;

        assert_eq!(ids, vec![2, 1, 3, 4, 5]);
        assert_eq!(api.count("page"), 2);
    }

    #[tokio::test]
    async fn test_discovery_stops_at_last_page_and_page_limit() {
        let mut api = FakeCatalog::default();
        api.pages = vec![vec![1], vec![2], vec![3]];
        let config = ExtractConfig {
            movie_ids: vec![],
            discover: true,
            max_pages: 2,
            max_records: 100,
        };
        let ids = collect_ids(&api, &config, &RetryPolicy::immediate(1)).await;
        assert_eq!(ids, vec![1, 2]);

        let config = ExtractConfig { max_pages: 10, ..config };
        let ids = collect_ids(&api, &config, &RetryPolicy::immediate(1)).await;
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failing_page_aborts_discovery_keeps_earlier_ids() {
        let mut api = FakeCatalog::default();
        api.pages = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
        api.broken_page = Some(2);
        let config = ExtractConfig {
            movie_ids: vec![],
            discover: true,
            max_pages: 10,
            max_records: 100,
        };
        let ids = collect_ids(&api, &config, &RetryPolicy::immediate(2)).await;

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(api.count("page 2"), 2);
        assert_eq!(api.count("page 3"), 0);
    }

    #[test]
    fn test_attach_credits_limits_cast_and_joins_directors() {
        let credits = Credits {
            cast: (0..12).map(|i| CastMember { name: format!("A{}", i) }).collect(),
            crew: vec![
                CrewMember { name: "Anthony Russo".into(), job: "Director".into() },
                CrewMember { name: "Alan Silvestri".into(), job: "Original Music Composer".into() },
                CrewMember { name: "Joe Russo".into(), job: "Director".into() },
            ],
        };
        let mut movie = RawMovie::default();
        attach_credits(&mut movie, Some(&credits));

        let cast = movie.get("cast").and_then(Value::as_str).unwrap();
        assert_eq!(cast.split('|').count(), TOP_CAST);
        assert_eq!(movie.get("cast_size"), Some(&json!(12)));
        assert_eq!(movie.get("director"), Some(&json!("Anthony Russo|Joe Russo")));
        assert_eq!(movie.get("crew_size"), Some(&json!(3)));
    }

    #[test]
    fn test_attach_without_credits() {
        let mut movie = RawMovie::default();
        attach_credits(&mut movie, None);
        assert_eq!(movie.get("cast"), None);
        assert_eq!(movie.get("cast_size"), Some(&json!(0)));
        assert_eq!(movie.get("crew_size"), Some(&json!(0)));
    }
}
