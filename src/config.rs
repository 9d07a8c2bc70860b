use crate::model::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause after every request to stay under the catalog's rate limit.
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Ids fetched directly, in this order.
    #[serde(default = "default_movie_ids")]
    pub movie_ids: Vec<u64>,
    /// Also walk the paginated discover listing.
    #[serde(default)]
    pub discover: bool,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            movie_ids: default_movie_ids(),
            discover: false,
            max_pages: default_max_pages(),
            max_records: default_max_records(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Rows in the franchise and director tables.
    #[serde(default = "default_top_groups")]
    pub top_groups: usize,
    #[serde(default = "default_min_budget_musd")]
    pub min_budget_musd_for_roi: f64,
    #[serde(default = "default_min_votes")]
    pub min_votes_for_rating: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            top_groups: default_top_groups(),
            min_budget_musd_for_roi: default_min_budget_musd(),
            min_votes_for_rating: default_min_votes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_true")]
    pub charts: bool,
    #[serde(default = "default_true")]
    pub sqlite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            charts: true,
            sqlite: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file written next to console output. `None` disables it.
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    /// Key with everything but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.analysis.top_n == 0 || self.analysis.top_groups == 0 {
            return Err(ConfigError::Invalid(
                "analysis.top_n and analysis.top_groups must be at least 1".into(),
            ));
        }
        if !is_valid_log_filter(&self.logging.level) {
            return Err(ConfigError::Invalid(format!(
                "logging.level {:?} is not a valid filter",
                self.logging.level
            )));
        }
        if self.extract.movie_ids.is_empty() && !self.extract.discover {
            return Err(ConfigError::Invalid(
                "extract.movie_ids is empty and discovery is disabled".into(),
            ));
        }
        Ok(())
    }

    /// Network runs need a key; offline replays do not.
    pub fn require_api_key(&self) -> Result<(), ConfigError> {
        if self.api.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no API key: set api.api_key or {}",
                API_KEY_ENV
            )));
        }
        Ok(())
    }

    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api.api_key = key;
        }
    }
}

/// A lone word must be a level name; `inf` would otherwise parse as a target.
fn is_valid_log_filter(filter: &str) -> bool {
    if filter.contains(['=', ',', '[']) {
        EnvFilter::try_new(filter).is_ok()
    } else {
        filter.trim().parse::<LevelFilter>().is_ok()
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content, std::env::var(API_KEY_ENV).ok())?;
    Ok(config)
}

pub fn parse_config(content: &str, env_api_key: Option<String>) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    config.apply_env(env_api_key);
    config.validate()?;
    Ok(config)
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_rate_limit_delay_ms() -> u64 {
    250
}
fn default_max_pages() -> u32 {
    5
}
fn default_max_records() -> usize {
    100
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    2000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_top_n() -> usize {
    5
}
fn default_min_budget_musd() -> f64 {
    10.0
}
fn default_min_votes() -> u32 {
    10
}
fn default_data_dir() -> String {
    "data".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_file() -> Option<String> {
    Some("logs/pipeline.log".into())
}
fn default_top_groups() -> usize {
    10
}
fn default_true() -> bool {
    true
}

// Box-office list the pipeline was built around. 0 is deliberately invalid.
fn default_movie_ids() -> Vec<u64> {
    vec![
        0, 299534, 19995, 140607, 299536, 597, 135397, 420818, 24428, 168259, 99861, 284054,
        12445, 181808, 330457, 351286, 109445, 321612, 260513,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = parse_config("{}", None).unwrap();
        assert_eq!(config.api.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.analysis.top_n, 5);
        assert_eq!(config.analysis.top_groups, 10);
        assert_eq!(config.extract.movie_ids.len(), 19);
        assert_eq!(config.output.data_dir, "data");
    }

    #[test]
    fn test_env_key_overrides_file() {
        let json = r#"{ "api": { "api_key": "from-file" } }"#;
        let config = parse_config(json, Some("from-env".into())).unwrap();
        assert_eq!(config.api.api_key, "from-env");

        let config = parse_config(json, Some("  ".into())).unwrap();
        assert_eq!(config.api.api_key, "from-file");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let json = r#"{ "retry": { "max_attempts": 0 } }"#;
        assert!(matches!(parse_config(json, None), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        for level in ["inf", "info,reel_metrics=loud"] {
            let json = format!(r#"{{ "logging": {{ "level": "{}" }} }}"#, level);
            assert!(
                matches!(parse_config(&json, None), Err(ConfigError::Invalid(_))),
                "{} accepted",
                level
            );
        }

        let json = r#"{ "logging": { "level": "warn,reel_metrics=debug" } }"#;
        assert!(parse_config(json, None).is_ok());
    }

    #[test]
    fn test_missing_key_only_matters_online() {
        let config = parse_config("{}", None).unwrap();
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_masked_key() {
        let api = ApiConfig {
            api_key: "abcdef123456".into(),
            ..ApiConfig::default()
        };
        assert_eq!(api.masked_key(), "********3456");
    }
}
