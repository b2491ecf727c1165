//! Seams between the aggregator and the systems it consults.

use async_trait::async_trait;
use cobalt_core::{GeoPoint, PlaceRecord, SearchFilters, SearchIntent, ServiceRecord};
use thiserror::Error;

/// Which step of discovery a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Catalog,
    Intent,
    Places,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Catalog => write!(f, "catalog"),
            Stage::Intent => write!(f, "intent"),
            Stage::Places => write!(f, "places"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("provider unavailable")]
    Unavailable,
    #[error("timed out")]
    Timeout,
    #[error("{0}")]
    Call(String),
}

/// A classified failure from one discovery stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} lookup failed: {kind}")]
pub struct SourceFailure {
    pub stage: Stage,
    pub kind: FailureKind,
}

impl SourceFailure {
    #[must_use]
    pub fn new(stage: Stage, kind: FailureKind) -> Self {
        Self { stage, kind }
    }

    pub fn call(stage: Stage, error: impl std::fmt::Display) -> Self {
        Self::new(stage, FailureKind::Call(error.to_string()))
    }
}

/// The locally owned catalog.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Case-insensitive match on name/description, exact on category.
    async fn search_local(
        &self,
        text: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<ServiceRecord>, SourceFailure>;
}

/// The external places provider.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    fn is_available(&self) -> bool;

    async fn search_places(
        &self,
        keyword: &str,
        origin: Option<GeoPoint>,
        place_type: Option<&str>,
    ) -> Result<Vec<PlaceRecord>, SourceFailure>;
}

/// Free-text to intent. Implementations never fail; they degrade to
/// [`SearchIntent::passthrough`].
#[async_trait]
pub trait IntentResolve: Send + Sync {
    async fn resolve(&self, query: &str) -> SearchIntent;
}
