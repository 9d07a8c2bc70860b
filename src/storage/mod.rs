pub mod snapshot;
pub mod sqlite;

pub use snapshot::{read_movies_csv, read_raw_json, write_movies_csv, write_raw_json, ArtifactPaths};
pub use sqlite::AnalyticsStore;
