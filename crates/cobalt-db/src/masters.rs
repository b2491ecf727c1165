//! Database operations for the `masters` table (staff who perform services).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::{expect_affected, DbError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MasterRow {
    pub id: i64,
    pub company_id: i64,
    pub service_id: Option<i64>,
    pub name: String,
    pub photo: Option<String>,
    pub specialization: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewMaster<'a> {
    pub company_id: i64,
    pub service_id: Option<i64>,
    pub name: &'a str,
    pub photo: Option<&'a str>,
    pub specialization: Option<&'a str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MasterUpdate<'a> {
    pub service_id: Option<i64>,
    pub name: Option<&'a str>,
    pub photo: Option<&'a str>,
    pub specialization: Option<&'a str>,
}

const MASTER_COLUMNS: &str = "id, company_id, service_id, name, photo, specialization, created_at";

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_service_masters(
    pool: &PgPool,
    service_id: i64,
) -> Result<Vec<MasterRow>, DbError> {
    let rows = sqlx::query_as::<_, MasterRow>(&format!(
        "SELECT {MASTER_COLUMNS} FROM masters WHERE service_id = $1 ORDER BY id"
    ))
    .bind(service_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_company_masters(
    pool: &PgPool,
    company_id: i64,
) -> Result<Vec<MasterRow>, DbError> {
    let rows = sqlx::query_as::<_, MasterRow>(&format!(
        "SELECT {MASTER_COLUMNS} FROM masters WHERE company_id = $1 ORDER BY id"
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_master(pool: &PgPool, new: NewMaster<'_>) -> Result<MasterRow, DbError> {
    let row = sqlx::query_as::<_, MasterRow>(&format!(
        "INSERT INTO masters (company_id, service_id, name, photo, specialization) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {MASTER_COLUMNS}"
    ))
    .bind(new.company_id)
    .bind(new.service_id)
    .bind(new.name)
    .bind(new.photo)
    .bind(new.specialization)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the master does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_master(
    pool: &PgPool,
    master_id: i64,
    update: MasterUpdate<'_>,
) -> Result<MasterRow, DbError> {
    sqlx::query_as::<_, MasterRow>(&format!(
        "UPDATE masters \
         SET service_id     = COALESCE($2, service_id), \
             name           = COALESCE($3, name), \
             photo          = COALESCE($4, photo), \
             specialization = COALESCE($5, specialization) \
         WHERE id = $1 \
         RETURNING {MASTER_COLUMNS}"
    ))
    .bind(master_id)
    .bind(update.service_id)
    .bind(update.name)
    .bind(update.photo)
    .bind(update.specialization)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the master does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_master(pool: &PgPool, master_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM masters WHERE id = $1")
        .bind(master_id)
        .execute(pool)
        .await?;
    expect_affected(&result)
}
