//! Database operations for the `users` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: String,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-editable profile fields. `None` keeps the stored value.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserSettingsUpdate<'a> {
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
}

const USER_COLUMNS: &str =
    "id, email, password_hash, user_type, full_name, address, created_at, updated_at";

/// Inserts a new user and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including a unique violation
/// when the email is already registered.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    user_type: &str,
) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (email, password_hash, user_type) \
         VALUES ($1, $2, $3) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(password_hash)
    .bind(user_type)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Overlays the supplied profile fields onto the user row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no user has `user_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_user_settings(
    pool: &PgPool,
    user_id: i64,
    update: UserSettingsUpdate<'_>,
) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users \
         SET full_name  = COALESCE($2, full_name), \
             email      = COALESCE($3, email), \
             address    = COALESCE($4, address), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(update.full_name)
    .bind(update.email)
    .bind(update.address)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
