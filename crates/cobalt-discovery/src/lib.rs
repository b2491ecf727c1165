//! Unified service search: local catalog first, external places as fallback.

pub mod adapters;
pub mod aggregator;
pub mod mapping;
pub mod sources;

pub use adapters::PgCatalog;
pub use aggregator::DiscoveryAggregator;
pub use mapping::{service_from_place, service_from_row, EXTERNAL_DESCRIPTION, FALLBACK_CATEGORY};
pub use sources::{CatalogSearch, FailureKind, IntentResolve, PlaceSearch, SourceFailure, Stage};
