// Transformation stage: cleaning, enrichment, data-quality checks.
pub mod clean;
pub mod enrich;
pub mod validate;

pub use clean::{clean_movies, clean_movies_with_stats, CleanStats};
pub use enrich::enrich_movies;
pub use validate::{quality_report, validate_movies, QualityReport};
