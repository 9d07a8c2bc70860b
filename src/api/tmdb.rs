use crate::api::traits::{CatalogApi, Credits, DiscoverPage};
use crate::config::ApiConfig;
use crate::model::{ApiError, RawMovie};

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const DISCOVER_SORT: &str = "popularity.desc";

pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limit_delay: Duration,
}

impl TmdbClient {
    pub fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("reel-metrics/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            rate_limit_delay: cfg.rate_limit_delay(),
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET + status classification + JSON decode. The key only travels in the
    /// query string, `url` (used in errors and logs) never contains it.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let sent = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await;

        // Spacing between calls, whatever the outcome.
        if !self.rate_limit_delay.is_zero() {
            sleep(self.rate_limit_delay).await;
        }

        let response = check_status(sent?, &url)?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
    }
}

fn check_status(response: Response, url: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(url.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited {
            url: url.to_string(),
            retry_after: parse_retry_after(
                response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            ),
        }),
        _ => Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}

/// Only the delta-seconds form of `Retry-After` is understood.
fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait::async_trait]
impl CatalogApi for TmdbClient {
    async fn discover_page(&self, page: u32) -> Result<DiscoverPage, ApiError> {
        self.get_json(
            "discover/movie",
            &[("page", page.to_string()), ("sort_by", DISCOVER_SORT.to_string())],
        )
        .await
    }

    async fn movie_details(&self, id: u64) -> Result<RawMovie, ApiError> {
        self.get_json(&format!("movie/{}", id), &[]).await
    }

    async fn movie_credits(&self, id: u64) -> Result<Credits, ApiError> {
        self.get_json(&format!("movie/{}/credits", id), &[]).await
    }
}
