//! Clients hiding companies from their results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::{expect_affected, DbError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BlacklistRow {
    pub id: i64,
    pub client_id: i64,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including a unique violation
/// when the company is already blacklisted.
pub async fn add_to_blacklist(
    pool: &PgPool,
    client_id: i64,
    company_id: i64,
) -> Result<BlacklistRow, DbError> {
    let row = sqlx::query_as::<_, BlacklistRow>(
        "INSERT INTO client_blacklist (client_id, company_id) \
         VALUES ($1, $2) \
         RETURNING id, client_id, company_id, created_at",
    )
    .bind(client_id)
    .bind(company_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the pair was not blacklisted, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn remove_from_blacklist(
    pool: &PgPool,
    client_id: i64,
    company_id: i64,
) -> Result<(), DbError> {
    let result =
        sqlx::query("DELETE FROM client_blacklist WHERE client_id = $1 AND company_id = $2")
            .bind(client_id)
            .bind(company_id)
            .execute(pool)
            .await?;
    expect_affected(&result)
}
