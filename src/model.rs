// Core structs: RawMovie, Movie, error enums
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// A movie exactly as the catalog API returned it, plus the credit summary
/// keys (`cast`, `cast_size`, `director`, `crew_size`) the extractor attaches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMovie(pub Map<String, Value>);

impl RawMovie {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }
}

impl From<Value> for RawMovie {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawMovie(map),
            _ => RawMovie::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuntimeCategory {
    Short,
    Medium,
    Long,
}

impl RuntimeCategory {
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes < 90 {
            RuntimeCategory::Short
        } else if minutes <= 150 {
            RuntimeCategory::Medium
        } else {
            RuntimeCategory::Long
        }
    }
}

/// Cleaned movie record. The block of fields after `crew_size` is empty until
/// enrichment fills it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub tagline: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[serde(with = "pipe_list")]
    pub genres: Vec<String>,
    pub belongs_to_collection: Option<String>,
    pub original_language: Option<String>,
    pub budget_musd: Option<f64>,
    pub revenue_musd: Option<f64>,
    #[serde(with = "pipe_list")]
    pub production_companies: Vec<String>,
    #[serde(with = "pipe_list")]
    pub production_countries: Vec<String>,
    pub vote_count: Option<u32>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    pub runtime: Option<u32>,
    pub overview: Option<String>,
    #[serde(with = "pipe_list")]
    pub spoken_languages: Vec<String>,
    pub poster_path: Option<String>,
    #[serde(with = "pipe_list")]
    pub cast: Vec<String>,
    pub cast_size: u32,
    #[serde(with = "pipe_list")]
    pub director: Vec<String>,
    pub crew_size: u32,

    pub profit_musd: Option<f64>,
    pub roi: Option<f64>,
    pub release_year: Option<i32>,
    pub release_month: Option<u32>,
    pub runtime_category: Option<RuntimeCategory>,
    pub is_franchise: bool,
    pub vote_score: Option<f64>,
}

impl Movie {
    /// Presence of every nullable descriptive field, by column name.
    pub fn field_presence(&self) -> [(&'static str, bool); 18] {
        [
            ("tagline", self.tagline.is_some()),
            ("release_date", self.release_date.is_some()),
            ("genres", !self.genres.is_empty()),
            ("belongs_to_collection", self.belongs_to_collection.is_some()),
            ("original_language", self.original_language.is_some()),
            ("budget_musd", self.budget_musd.is_some()),
            ("revenue_musd", self.revenue_musd.is_some()),
            ("production_companies", !self.production_companies.is_empty()),
            ("production_countries", !self.production_countries.is_empty()),
            ("vote_count", self.vote_count.is_some()),
            ("vote_average", self.vote_average.is_some()),
            ("popularity", self.popularity.is_some()),
            ("runtime", self.runtime.is_some()),
            ("overview", self.overview.is_some()),
            ("spoken_languages", !self.spoken_languages.is_empty()),
            ("poster_path", self.poster_path.is_some()),
            ("cast", !self.cast.is_empty()),
            ("director", !self.director.is_empty()),
        ]
    }

    /// Number of populated descriptive fields. `id`, `title`, `cast_size` and
    /// `crew_size` always count.
    pub fn non_null_count(&self) -> usize {
        4 + self.field_presence().iter().filter(|(_, set)| *set).count()
    }
}

/// Lists are pipe-joined in flat files (`Action|Adventure`).
pub mod pipe_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join("|"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(split(raw.as_deref().unwrap_or_default()))
    }

    pub fn split(joined: &str) -> Vec<String> {
        joined
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub failed_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub raw_count: usize,
    pub cleaned_count: usize,
    pub chart_count: usize,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("rate limited by {url}")]
    RateLimited { url: String, retry_after: Option<Duration> },
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
            }
            ApiError::NotFound(_) | ApiError::Decode(_) => false,
        }
    }

    /// Server-imposed minimum wait before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("render error: {0}")]
    Render(String),
    #[error("no data to plot")]
    NoData,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("extraction produced no movies")]
    NoRecords,
}
