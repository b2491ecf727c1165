//! Database operations for the `bookings` table.
//!
//! A booking's lifecycle is a single `status` column; creating or
//! rescheduling always leaves it `pending`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::{expect_affected, DbError};

pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub client_id: i64,
    pub service_id: Option<i64>,
    pub master_id: Option<i64>,
    pub company_id: Option<i64>,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewBooking {
    pub client_id: i64,
    pub service_id: Option<i64>,
    pub master_id: Option<i64>,
    pub company_id: Option<i64>,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
}

const BOOKING_COLUMNS: &str = "id, client_id, service_id, master_id, company_id, booking_date, \
     booking_time, status, created_at, updated_at";

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including a foreign-key
/// violation for unknown client, service, master, or company ids.
pub async fn create_booking(pool: &PgPool, new: NewBooking) -> Result<BookingRow, DbError> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "INSERT INTO bookings \
           (client_id, service_id, master_id, company_id, booking_date, booking_time, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(new.client_id)
    .bind(new.service_id)
    .bind(new.master_id)
    .bind(new.company_id)
    .bind(new.booking_date)
    .bind(new.booking_time)
    .bind(STATUS_PENDING)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Returns a client's bookings, soonest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_client_bookings(
    pool: &PgPool,
    client_id: i64,
) -> Result<Vec<BookingRow>, DbError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings \
         WHERE client_id = $1 \
         ORDER BY booking_date, booking_time"
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Moves a booking to a new slot and puts it back into `pending`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the booking does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn reschedule_booking(
    pool: &PgPool,
    booking_id: i64,
    booking_date: NaiveDate,
    booking_time: NaiveTime,
) -> Result<BookingRow, DbError> {
    sqlx::query_as::<_, BookingRow>(&format!(
        "UPDATE bookings \
         SET booking_date = $2, booking_time = $3, status = $4, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(booking_id)
    .bind(booking_date)
    .bind(booking_time)
    .bind(STATUS_PENDING)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the booking does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_booking(pool: &PgPool, booking_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(booking_id)
        .execute(pool)
        .await?;
    expect_affected(&result)
}
