//! Database operations for the `companies` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `companies` table.
///
/// `settings` holds the company's booking policy (breaks, cancellation
/// rules, working hours, billing) as a free-form JSON object.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sparse company update. `settings` is merged key-by-key into the stored object.
#[derive(Debug, Default, Clone)]
pub struct CompanyUpdate<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub description: Option<&'a str>,
    pub settings: Option<serde_json::Value>,
}

const COMPANY_COLUMNS: &str =
    "id, user_id, name, email, phone, address, description, settings, created_at, updated_at";

/// Creates the company row that backs a newly registered company account.
///
/// The display name defaults to the local part of the email.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_company(
    pool: &PgPool,
    user_id: i64,
    email: &str,
) -> Result<CompanyRow, DbError> {
    let name = default_company_name(email);
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "INSERT INTO companies (user_id, name, email) \
         VALUES ($1, $2, $3) \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(user_id)
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_company_by_user_id(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_company(pool: &PgPool, company_id: i64) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
    ))
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Applies a sparse update to a company and returns the new row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the company does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_company_settings(
    pool: &PgPool,
    company_id: i64,
    update: CompanyUpdate<'_>,
) -> Result<CompanyRow, DbError> {
    sqlx::query_as::<_, CompanyRow>(&format!(
        "UPDATE companies \
         SET name        = COALESCE($2, name), \
             email       = COALESCE($3, email), \
             phone       = COALESCE($4, phone), \
             address     = COALESCE($5, address), \
             description = COALESCE($6, description), \
             settings    = settings || COALESCE($7, '{{}}'::jsonb), \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(company_id)
    .bind(update.name)
    .bind(update.email)
    .bind(update.phone)
    .bind(update.address)
    .bind(update.description)
    .bind(update.settings)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

fn default_company_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_company_name_uses_email_local_part() {
        assert_eq!(default_company_name("studio@example.com"), "studio");
        assert_eq!(default_company_name("+79123456789"), "+79123456789");
    }
}
