// Catalog API access: trait seam plus the TMDB implementation.
pub mod tmdb;
pub mod traits;

pub use tmdb::TmdbClient;
pub use traits::{CastMember, CatalogApi, Credits, CrewMember, DiscoverEntry, DiscoverPage};
