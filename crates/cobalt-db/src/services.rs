//! Database operations for the `services` catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::{expect_affected, DbError};

/// A row from the `services` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub duration_minutes: i32,
    pub image: Option<String>,
    pub rating: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog search hit joined with its company.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceSearchRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub image: Option<String>,
    pub rating: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub company_name: String,
    pub company_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewService<'a> {
    pub company_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub price: f64,
    pub duration_minutes: i32,
    pub image: Option<&'a str>,
}

/// Sparse service update. `None` keeps the stored value.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub price: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub image: Option<&'a str>,
}

const SERVICE_COLUMNS: &str = "id, company_id, name, description, category, price, \
     duration_minutes, image, rating, latitude, longitude, created_at, updated_at";

/// Searches the local catalog.
///
/// `text` matches case-insensitively as a substring of name or description;
/// `category` must match exactly. Either filter may be omitted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_services(
    pool: &PgPool,
    text: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<ServiceSearchRow>, DbError> {
    let pattern = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", escape_like(t)));

    let rows = sqlx::query_as::<_, ServiceSearchRow>(
        "SELECT s.id, s.name, s.description, s.category, s.price, s.image, s.rating, \
                s.latitude, s.longitude, c.name AS company_name, c.address AS company_address \
         FROM services s \
         JOIN companies c ON c.id = s.company_id \
         WHERE ($1::TEXT IS NULL OR s.name ILIKE $1 OR s.description ILIKE $1) \
           AND ($2::TEXT IS NULL OR s.category = $2) \
         ORDER BY s.id",
    )
    .bind(pattern)
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_service(pool: &PgPool, service_id: i64) -> Result<Option<ServiceRow>, DbError> {
    let row = sqlx::query_as::<_, ServiceRow>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
    ))
    .bind(service_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_company_services(
    pool: &PgPool,
    company_id: i64,
) -> Result<Vec<ServiceRow>, DbError> {
    let rows = sqlx::query_as::<_, ServiceRow>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE company_id = $1 ORDER BY id"
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including a foreign-key
/// violation for an unknown company.
pub async fn create_service(pool: &PgPool, new: &NewService<'_>) -> Result<ServiceRow, DbError> {
    let row = sqlx::query_as::<_, ServiceRow>(&format!(
        "INSERT INTO services (company_id, name, description, category, price, duration_minutes, image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(new.company_id)
    .bind(new.name)
    .bind(new.description)
    .bind(new.category)
    .bind(new.price)
    .bind(new.duration_minutes)
    .bind(new.image)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the service does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_service(
    pool: &PgPool,
    service_id: i64,
    update: ServiceUpdate<'_>,
) -> Result<ServiceRow, DbError> {
    sqlx::query_as::<_, ServiceRow>(&format!(
        "UPDATE services \
         SET name             = COALESCE($2, name), \
             description      = COALESCE($3, description), \
             category         = COALESCE($4, category), \
             price            = COALESCE($5, price), \
             duration_minutes = COALESCE($6, duration_minutes), \
             image            = COALESCE($7, image), \
             updated_at       = NOW() \
         WHERE id = $1 \
         RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(service_id)
    .bind(update.name)
    .bind(update.description)
    .bind(update.category)
    .bind(update.price)
    .bind(update.duration_minutes)
    .bind(update.image)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the service does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_service(pool: &PgPool, service_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(service_id)
        .execute(pool)
        .await?;
    expect_affected(&result)
}

/// Escapes `LIKE` metacharacters so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like("50% off_now"), "50\\% off\\_now");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("haircut"), "haircut");
    }
}
