mod auth;
mod bookings;
mod clients;
mod companies;
mod favorites;
mod maps;
mod services;
mod voice;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use cobalt_ai::Transcriber;
use cobalt_discovery::DiscoveryAggregator;
use cobalt_maps::PlacesGateway;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

/// Whisper accepts uploads up to 25 MB.
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub discovery: Arc<DiscoveryAggregator>,
    pub maps: Arc<PlacesGateway>,
    pub transcriber: Arc<Transcriber>,
}

/// Error body shared by every route: `{"error", "code", "request_id"}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(rename = "error")]
    pub message: String,
    pub code: String,
    pub request_id: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            request_id: request_id.into(),
        }
    }

    pub fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", message)
    }

    pub fn not_found(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "not_found", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Body for a read that found nothing: serializes as `{}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum OrEmpty<T> {
    Found(T),
    Empty {},
}

impl<T> From<Option<T>> for OrEmpty<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(OrEmpty::Empty {}, OrEmpty::Found)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct MessageBody {
    pub message: &'static str,
}

/// Maps a write-path database failure onto an API error.
pub(super) fn map_db_error(request_id: &str, error: &cobalt_db::DbError) -> ApiError {
    if matches!(error, cobalt_db::DbError::NotFound) {
        return ApiError::not_found(request_id, "record not found");
    }
    if error.is_unique_violation() {
        return ApiError::new(request_id, "conflict", "record already exists");
    }
    if error.is_foreign_key_violation() {
        return ApiError::validation(request_id, "referenced record does not exist");
    }
    tracing::error!(error = %error, request_id, "database query failed");
    ApiError::new(request_id, "internal_error", format!("database error: {error}"))
}

/// Read-path database failures degrade to an empty list.
pub(super) fn rows_or_empty<T>(
    result: Result<Vec<T>, cobalt_db::DbError>,
    what: &'static str,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, what, "read failed; returning empty list");
        Vec::new()
    })
}

/// Identity fallback while requests carry their own user/company ids.
pub(super) fn default_id() -> i64 {
    1
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/services/search", post(services::search_services))
        .route("/api/services/create", post(services::create_service))
        .route(
            "/api/services/company/{company_id}",
            get(services::list_company_services),
        )
        .route(
            "/api/services/{service_id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/api/services/{service_id}/masters",
            get(services::list_service_masters),
        )
        .route(
            "/api/services/{service_id}/reviews",
            get(services::list_service_reviews),
        )
        .route(
            "/api/services/{service_id}/examples",
            get(services::list_service_examples),
        )
        .route(
            "/api/services/{service_id}/time-slots",
            get(services::list_time_slots),
        )
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/bookings/{booking_id}/reschedule",
            put(bookings::reschedule_booking),
        )
        .route("/api/bookings/{booking_id}", delete(bookings::cancel_booking))
        .route(
            "/api/clients/settings",
            get(clients::get_settings).put(clients::update_settings),
        )
        .route("/api/clients/blacklist", post(clients::add_to_blacklist))
        .route(
            "/api/clients/blacklist/{company_id}",
            delete(clients::remove_from_blacklist),
        )
        .route(
            "/api/companies/settings",
            get(companies::get_settings).put(companies::update_settings),
        )
        .route(
            "/api/companies/masters",
            get(companies::list_masters).post(companies::create_master),
        )
        .route(
            "/api/companies/masters/{master_id}",
            put(companies::update_master).delete(companies::delete_master),
        )
        .route(
            "/api/companies/promotions",
            get(companies::list_promotions).post(companies::create_promotion),
        )
        .route(
            "/api/companies/promotions/{promotion_id}",
            delete(companies::delete_promotion),
        )
        .route(
            "/api/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/api/favorites/{service_id}",
            delete(favorites::remove_favorite),
        )
        .route("/api/maps/search", post(maps::search_places))
        .route("/api/maps/geocode", post(maps::geocode))
        .route("/api/maps/reverse-geocode", post(maps::reverse_geocode))
        .route("/api/maps/place/{place_id}", get(maps::place_details))
        .route("/api/maps/distance", post(maps::distance))
        .route("/api/maps/directions", post(maps::directions))
        .route("/api/maps/status", get(maps::status))
        .route(
            "/api/voice/transcribe",
            post(voice::transcribe).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, cors_origins: &[String], rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(cors_origins))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match cobalt_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Cobalt API is running",
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "services": "/api/services",
            "bookings": "/api/bookings",
            "clients": "/api/clients",
            "companies": "/api/companies",
            "favorites": "/api/favorites",
            "maps": "/api/maps",
            "voice": "/api/voice/transcribe"
        }
    }))
}
