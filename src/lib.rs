//! Movie metadata ETL: catalog extraction with retry, cleaning and enrichment,
//! KPI analysis, reports and charts.

pub mod analysis;
pub mod api;
pub mod config;
pub mod extract;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod storage;
pub mod transform;
pub mod visualize;

pub use config::{load_config, AppConfig};
pub use model::{Movie, PipelineError, RawMovie};
pub use pipeline::{run_analysis, run_from_raw, run_pipeline, PipelineOutput};
