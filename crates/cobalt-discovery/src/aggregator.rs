//! The discovery fallback chain.
//!
//! 1. Local catalog. Any hit is returned as-is and nothing external runs.
//! 2. Blank query: stop with an empty list.
//! 3. Places provider available: resolve the intent, search places, map
//!    each place into an external-origin record.
//!
//! Every failure along the way is logged and becomes "no results" for its
//! stage; [`DiscoveryAggregator::search`] itself cannot fail.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cobalt_core::{SearchIntent, SearchQuery, ServiceRecord};

use crate::mapping::service_from_place;
use crate::sources::{
    CatalogSearch, FailureKind, IntentResolve, PlaceSearch, SourceFailure, Stage,
};

pub struct DiscoveryAggregator {
    catalog: Arc<dyn CatalogSearch>,
    places: Arc<dyn PlaceSearch>,
    intents: Arc<dyn IntentResolve>,
    call_timeout: Duration,
}

impl DiscoveryAggregator {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogSearch>,
        places: Arc<dyn PlaceSearch>,
        intents: Arc<dyn IntentResolve>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            places,
            intents,
            call_timeout,
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Vec<ServiceRecord> {
        match self.search_local(query).await {
            Ok(records) if !records.is_empty() => {
                tracing::debug!(query = %query.text, count = records.len(), "served from catalog");
                return records;
            }
            Ok(_) => {}
            Err(failure) => {
                tracing::warn!(error = %failure, query = %query.text, "catalog search degraded to empty");
            }
        }

        if query.is_blank() {
            return Vec::new();
        }

        match self.search_external(query).await {
            Ok(records) => {
                tracing::debug!(query = %query.text, count = records.len(), "served from places provider");
                records
            }
            Err(SourceFailure {
                kind: FailureKind::Unavailable,
                ..
            }) => Vec::new(),
            Err(failure) => {
                tracing::warn!(error = %failure, query = %query.text, "external search degraded to empty");
                Vec::new()
            }
        }
    }

    async fn search_local(&self, query: &SearchQuery) -> Result<Vec<ServiceRecord>, SourceFailure> {
        self.catalog.search_local(&query.text, &query.filters).await
    }

    /// Steps 3a-3c. Returns the classified failure instead of logging it.
    async fn search_external(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<ServiceRecord>, SourceFailure> {
        if !self.places.is_available() {
            return Err(SourceFailure::new(Stage::Places, FailureKind::Unavailable));
        }

        let intent = self.resolve_intent(&query.text).await;

        let places = self
            .bounded(
                Stage::Places,
                self.places.search_places(
                    &intent.keyword,
                    query.origin,
                    intent.business_type.as_deref(),
                ),
            )
            .await??;

        Ok(places
            .iter()
            .map(|place| service_from_place(place, intent.business_type.as_deref()))
            .collect())
    }

    async fn resolve_intent(&self, text: &str) -> SearchIntent {
        match self.bounded(Stage::Intent, self.intents.resolve(text)).await {
            Ok(intent) => intent,
            Err(failure) => {
                tracing::warn!(error = %failure, query = text, "intent resolution degraded to raw query");
                SearchIntent::passthrough(text)
            }
        }
    }

    async fn bounded<F: Future>(&self, stage: Stage, call: F) -> Result<F::Output, SourceFailure> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| SourceFailure::new(stage, FailureKind::Timeout))
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
