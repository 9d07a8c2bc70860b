use crate::model::{ApiError, RawMovie};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<DiscoverEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscoverEntry {
    pub id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// One page of the paginated discover listing (pages start at 1).
    async fn discover_page(&self, page: u32) -> Result<DiscoverPage, ApiError>;
    async fn movie_details(&self, id: u64) -> Result<RawMovie, ApiError>;
    async fn movie_credits(&self, id: u64) -> Result<Credits, ApiError>;
}
