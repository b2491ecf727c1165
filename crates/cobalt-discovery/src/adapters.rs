//! Bindings from the concrete catalog, places and intent clients to the
//! discovery traits.

use async_trait::async_trait;
use cobalt_ai::QueryIntentResolver;
use cobalt_core::{GeoPoint, PlaceRecord, SearchFilters, SearchIntent, ServiceRecord};
use cobalt_maps::{MapsError, PlacesGateway};
use sqlx::PgPool;

use crate::mapping::service_from_row;
use crate::sources::{
    CatalogSearch, FailureKind, IntentResolve, PlaceSearch, SourceFailure, Stage,
};

/// Postgres-backed catalog.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSearch for PgCatalog {
    async fn search_local(
        &self,
        text: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<ServiceRecord>, SourceFailure> {
        let rows = cobalt_db::search_services(&self.pool, Some(text), filters.category.as_deref())
            .await
            .map_err(|e| SourceFailure::call(Stage::Catalog, e))?;
        Ok(rows.into_iter().map(service_from_row).collect())
    }
}

#[async_trait]
impl PlaceSearch for PlacesGateway {
    fn is_available(&self) -> bool {
        PlacesGateway::is_available(self)
    }

    async fn search_places(
        &self,
        keyword: &str,
        origin: Option<GeoPoint>,
        place_type: Option<&str>,
    ) -> Result<Vec<PlaceRecord>, SourceFailure> {
        self.try_search_places(keyword, origin, place_type)
            .await
            .map_err(|e| match e {
                MapsError::Unavailable => SourceFailure::new(Stage::Places, FailureKind::Unavailable),
                other => SourceFailure::call(Stage::Places, other),
            })
    }
}

#[async_trait]
impl IntentResolve for QueryIntentResolver {
    async fn resolve(&self, query: &str) -> SearchIntent {
        QueryIntentResolver::resolve(self, query).await
    }
}
