//! Shared domain types, configuration loading and pure helpers for the
//! cobalt booking backend.

pub mod app_config;
pub mod config;
pub mod geo;
pub mod provider;
pub mod search;
pub mod validators;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_meters, format_distance, GeoError, GeoPoint};
pub use provider::ProviderState;
pub use search::{
    PlaceRecord, RecordSource, SearchFilters, SearchIntent, SearchQuery, ServiceId, ServiceRecord,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
