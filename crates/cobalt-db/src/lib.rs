use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

use cobalt_core::AppConfig;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/cobalt-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// True when the failure is a unique-constraint violation (`23505`).
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::Sqlx(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505"))
    }

    /// True when the failure is a foreign-key violation (`23503`).
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DbError::Sqlx(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23503"))
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Maps an `UPDATE`/`DELETE` that touched nothing to [`DbError::NotFound`].
pub(crate) fn expect_affected(result: &sqlx::postgres::PgQueryResult) -> Result<(), DbError> {
    if result.rows_affected() == 0 {
        Err(DbError::NotFound)
    } else {
        Ok(())
    }
}

pub mod blacklist;
pub mod bookings;
pub mod companies;
pub mod favorites;
pub mod masters;
pub mod promotions;
pub mod reviews;
pub mod services;
pub mod users;

pub use blacklist::{add_to_blacklist, remove_from_blacklist, BlacklistRow};
pub use bookings::{
    create_booking, delete_booking, list_client_bookings, reschedule_booking, BookingRow,
    NewBooking,
};
pub use companies::{
    create_company, get_company, get_company_by_user_id, update_company_settings, CompanyRow,
    CompanyUpdate,
};
pub use favorites::{add_favorite, list_favorites, remove_favorite, FavoriteRow};
pub use masters::{
    create_master, delete_master, list_company_masters, list_service_masters, update_master,
    MasterRow, MasterUpdate, NewMaster,
};
pub use promotions::{
    create_promotion, delete_promotion, list_company_promotions, NewPromotion, PromotionRow,
};
pub use reviews::{list_service_examples, list_service_reviews, ReviewRow, WorkExampleRow};
pub use services::{
    create_service, delete_service, get_service, list_company_services, search_services,
    update_service, NewService, ServiceRow, ServiceSearchRow, ServiceUpdate,
};
pub use users::{
    create_user, get_user, get_user_by_email, update_user_settings, UserRow, UserSettingsUpdate,
};
