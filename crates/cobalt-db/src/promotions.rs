//! Database operations for company promotions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::{expect_affected, DbError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PromotionRow {
    pub id: i64,
    pub company_id: i64,
    #[serde(rename = "type")]
    pub promo_type: String,
    pub description: Option<String>,
    pub discount: Option<f64>,
    pub conditions: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPromotion<'a> {
    pub company_id: i64,
    pub promo_type: &'a str,
    pub description: Option<&'a str>,
    pub discount: Option<f64>,
    pub conditions: serde_json::Value,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_company_promotions(
    pool: &PgPool,
    company_id: i64,
) -> Result<Vec<PromotionRow>, DbError> {
    let rows = sqlx::query_as::<_, PromotionRow>(
        "SELECT id, company_id, promo_type, description, discount, conditions, created_at \
         FROM promotions \
         WHERE company_id = $1 \
         ORDER BY id",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_promotion(
    pool: &PgPool,
    new: NewPromotion<'_>,
) -> Result<PromotionRow, DbError> {
    let row = sqlx::query_as::<_, PromotionRow>(
        "INSERT INTO promotions (company_id, promo_type, description, discount, conditions) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, company_id, promo_type, description, discount, conditions, created_at",
    )
    .bind(new.company_id)
    .bind(new.promo_type)
    .bind(new.description)
    .bind(new.discount)
    .bind(new.conditions)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the promotion does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_promotion(pool: &PgPool, promotion_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
        .bind(promotion_id)
        .execute(pool)
        .await?;
    expect_affected(&result)
}
