//! Booking routes. The client id travels in the request until sessions
//! carry identity.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use cobalt_db::{BookingRow, NewBooking};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{default_id, map_db_error, rows_or_empty, ApiError, AppState, MessageBody};

#[derive(Debug, Deserialize)]
pub(super) struct CreateBookingRequest {
    #[serde(default = "default_id")]
    user_id: i64,
    service_id: Option<i64>,
    master_id: Option<i64>,
    company_id: Option<i64>,
    date: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RescheduleRequest {
    date: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BookingsQuery {
    user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct BookingsBody {
    bookings: Vec<BookingRow>,
}

fn parse_date(rid: &str, raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(rid, "date must be YYYY-MM-DD"))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time(rid: &str, raw: Option<&str>) -> Result<NaiveTime, ApiError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ApiError::validation(rid, "time must be HH:MM"))
}

/// POST /api/bookings
pub(super) async fn create_booking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingRow>), ApiError> {
    let rid = &req_id.0;
    let new = NewBooking {
        client_id: body.user_id,
        service_id: body.service_id,
        master_id: body.master_id,
        company_id: body.company_id,
        booking_date: parse_date(rid, body.date.as_deref())?,
        booking_time: parse_time(rid, body.time.as_deref())?,
    };

    let booking = cobalt_db::create_booking(&state.pool, new)
        .await
        .map_err(|e| map_db_error(rid, &e))?;

    tracing::info!(booking_id = booking.id, client_id = booking.client_id, "booking created");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings?user_id=
pub(super) async fn list_bookings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<BookingsQuery>,
) -> Result<Json<BookingsBody>, ApiError> {
    let Some(user_id) = params.user_id else {
        return Err(ApiError::validation(&req_id.0, "user_id required"));
    };
    let bookings = rows_or_empty(
        cobalt_db::list_client_bookings(&state.pool, user_id).await,
        "client bookings",
    );
    Ok(Json(BookingsBody { bookings }))
}

/// PUT /api/bookings/{id}/reschedule
///
/// Moves the booking and puts it back to `pending`.
pub(super) async fn reschedule_booking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(booking_id): Path<i64>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<BookingRow>, ApiError> {
    let rid = &req_id.0;
    let date = parse_date(rid, body.date.as_deref())?;
    let time = parse_time(rid, body.time.as_deref())?;

    let booking = cobalt_db::reschedule_booking(&state.pool, booking_id, date, time)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    Ok(Json(booking))
}

/// DELETE /api/bookings/{id}
pub(super) async fn cancel_booking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(booking_id): Path<i64>,
) -> Result<Json<MessageBody>, ApiError> {
    cobalt_db::delete_booking(&state.pool, booking_id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(MessageBody {
        message: "Booking cancelled",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accepts_minutes_and_seconds() {
        let expected = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_time("r", Some("14:30")).unwrap(), expected);
        assert_eq!(parse_time("r", Some("14:30:00")).unwrap(), expected);
        assert!(parse_time("r", Some("2pm")).is_err());
        assert!(parse_time("r", None).is_err());
    }

    #[test]
    fn date_requires_iso_format() {
        assert_eq!(
            parse_date("r", Some("2025-03-14")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
        let err = parse_date("r", Some("14.03.2025")).unwrap_err();
        assert_eq!(err.code, "validation_error");
    }

    #[test]
    fn create_request_defaults_user_id() {
        let body: CreateBookingRequest =
            serde_json::from_value(serde_json::json!({"service_id": 3})).unwrap();
        assert_eq!(body.user_id, 1);
        assert_eq!(body.service_id, Some(3));
    }
}
