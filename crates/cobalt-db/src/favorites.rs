//! Database operations for client favorites.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::{expect_affected, DbError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FavoriteRow {
    pub id: i64,
    pub client_id: i64,
    pub service_id: i64,
    pub created_at: DateTime<Utc>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including a unique violation
/// when the service is already a favorite.
pub async fn add_favorite(
    pool: &PgPool,
    client_id: i64,
    service_id: i64,
) -> Result<FavoriteRow, DbError> {
    let row = sqlx::query_as::<_, FavoriteRow>(
        "INSERT INTO favorites (client_id, service_id) \
         VALUES ($1, $2) \
         RETURNING id, client_id, service_id, created_at",
    )
    .bind(client_id)
    .bind(service_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the pair was not a favorite, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn remove_favorite(pool: &PgPool, client_id: i64, service_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM favorites WHERE client_id = $1 AND service_id = $2")
        .bind(client_id)
        .bind(service_id)
        .execute(pool)
        .await?;
    expect_affected(&result)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_favorites(pool: &PgPool, client_id: i64) -> Result<Vec<FavoriteRow>, DbError> {
    let rows = sqlx::query_as::<_, FavoriteRow>(
        "SELECT id, client_id, service_id, created_at \
         FROM favorites \
         WHERE client_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
