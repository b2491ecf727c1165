//! Read-only access to service reviews and portfolio examples.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub service_id: i64,
    pub client_id: Option<i64>,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkExampleRow {
    pub id: i64,
    pub service_id: i64,
    pub image_url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Newest reviews first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_service_reviews(
    pool: &PgPool,
    service_id: i64,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, service_id, client_id, rating, comment, created_at \
         FROM reviews \
         WHERE service_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(service_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_service_examples(
    pool: &PgPool,
    service_id: i64,
) -> Result<Vec<WorkExampleRow>, DbError> {
    let rows = sqlx::query_as::<_, WorkExampleRow>(
        "SELECT id, service_id, image_url, description, created_at \
         FROM work_examples \
         WHERE service_id = $1 \
         ORDER BY id",
    )
    .bind(service_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
