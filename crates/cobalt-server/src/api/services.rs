//! Service catalog routes, including the unified discovery search.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use cobalt_core::{
    GeoPoint, RecordSource, SearchFilters, SearchQuery, ServiceId, ServiceRecord,
};
use cobalt_db::{MasterRow, NewService, ReviewRow, ServiceRow, ServiceUpdate, WorkExampleRow};
use cobalt_discovery::{service_from_place, FALLBACK_CATEGORY};
use cobalt_maps::PlaceDetails;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, rows_or_empty, ApiError, AppState};

const PLACEHOLDER_NAME: &str = "Google Maps Service";
const PLACEHOLDER_DESCRIPTION: &str =
    "This service was found via Google Maps. Contact them directly for more information.";
const DEFAULT_DURATION_MINUTES: i32 = 60;
const FIRST_SLOT_HOUR: u32 = 9;
const LAST_SLOT_HOUR: u32 = 17;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    services: Vec<ServiceRecord>,
}

/// Reads a search request from a loosely-typed JSON body.
///
/// A missing body is an empty query. `user_location` is dropped when it is
/// not a `{lat, lng}` pair.
fn parse_search_body(body: &[u8]) -> Result<SearchQuery, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SearchQuery::new("", SearchFilters::default(), None));
    }
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let text = value
        .get("query")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    let origin = value
        .get("user_location")
        .filter(|v| !v.is_null())
        .and_then(|v| match GeoPoint::from_json(v) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed user_location");
                None
            }
        });
    let filters = if value.is_object() {
        serde_json::from_value(value.clone())?
    } else {
        SearchFilters::default()
    };
    Ok(SearchQuery::new(text, filters, origin))
}

/// POST /api/services/search
///
/// Always answers 200. A body that is not JSON yields an empty list with an
/// `error` field.
pub(super) async fn search_services(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Json<SearchResponse> {
    let query = match parse_search_body(&body) {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!(error = %e, request_id = %req_id.0, "unreadable search body");
            return Json(SearchResponse {
                error: Some(format!("invalid search request: {e}")),
                services: Vec::new(),
            });
        }
    };

    let services = state.discovery.search(&query).await;
    Json(SearchResponse {
        error: None,
        services,
    })
}

// ---------------------------------------------------------------------------
// Single service
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ExternalService {
    #[serde(flatten)]
    record: ServiceRecord,
    place_id: String,
    details: PlaceDetails,
}

#[derive(Debug, Serialize)]
struct PlaceholderService {
    id: ServiceId,
    name: &'static str,
    description: &'static str,
    source: RecordSource,
    place_id: String,
}

/// GET /api/services/{id}
///
/// `google_<placeId>` ids are looked up at the places provider; without it
/// (or when the lookup finds nothing) a placeholder record is returned.
pub(super) async fn get_service(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let Some(id) = ServiceId::parse(&raw_id) else {
        return Err(ApiError::validation(rid, "Invalid service ID"));
    };

    match id {
        ServiceId::Local(service_id) => {
            match cobalt_db::get_service(&state.pool, service_id).await {
                Ok(Some(row)) => Ok(Json(row).into_response()),
                Ok(None) => Err(ApiError::not_found(rid, "Service not found")),
                Err(e) => {
                    tracing::warn!(error = %e, service_id, "service lookup failed");
                    Err(ApiError::not_found(rid, "Service not found"))
                }
            }
        }
        ServiceId::External(place_id) => {
            if let Some(details) = state.maps.place_details(&place_id).await {
                let category = Some(details.place_type.as_str()).filter(|t| !t.is_empty());
                let record = service_from_place(&details.place, category);
                return Ok(Json(ExternalService {
                    record,
                    place_id,
                    details,
                })
                .into_response());
            }
            Ok(Json(PlaceholderService {
                id: ServiceId::External(place_id.clone()),
                name: PLACEHOLDER_NAME,
                description: PLACEHOLDER_DESCRIPTION,
                source: RecordSource::External,
                place_id,
            })
            .into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Service sub-resources
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct MastersBody {
    masters: Vec<MasterRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReviewsBody {
    reviews: Vec<ReviewRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct ExamplesBody {
    examples: Vec<WorkExampleRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct TimeSlotsBody {
    time_slots: Vec<String>,
}

/// GET /api/services/{id}/masters
pub(super) async fn list_service_masters(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Json<MastersBody> {
    let masters = rows_or_empty(
        cobalt_db::list_service_masters(&state.pool, service_id).await,
        "service masters",
    );
    Json(MastersBody { masters })
}

/// GET /api/services/{id}/reviews
pub(super) async fn list_service_reviews(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Json<ReviewsBody> {
    let reviews = rows_or_empty(
        cobalt_db::list_service_reviews(&state.pool, service_id).await,
        "service reviews",
    );
    Json(ReviewsBody { reviews })
}

/// GET /api/services/{id}/examples
pub(super) async fn list_service_examples(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Json<ExamplesBody> {
    let examples = rows_or_empty(
        cobalt_db::list_service_examples(&state.pool, service_id).await,
        "work examples",
    );
    Json(ExamplesBody { examples })
}

/// GET /api/services/{id}/time-slots
///
/// Slots are a fixed hourly grid; bookings are not checked against it.
pub(super) async fn list_time_slots(Path(_service_id): Path<i64>) -> Json<TimeSlotsBody> {
    Json(TimeSlotsBody {
        time_slots: hourly_slots(),
    })
}

fn hourly_slots() -> Vec<String> {
    (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
        .map(|hour| format!("{hour:02}:00"))
        .collect()
}

// ---------------------------------------------------------------------------
// Company service management
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct ServicesBody {
    services: Vec<ServiceRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct ServiceBody {
    service: ServiceRow,
}

#[derive(Debug, Serialize)]
pub(super) struct SuccessBody {
    success: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateServiceRequest {
    company_id: Option<i64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    category: Option<String>,
    #[serde(default)]
    price: f64,
    duration: Option<i32>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateServiceRequest {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    duration: Option<i32>,
    image: Option<String>,
}

/// GET /api/services/company/{company_id}
pub(super) async fn list_company_services(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
) -> Json<ServicesBody> {
    let services = rows_or_empty(
        cobalt_db::list_company_services(&state.pool, company_id).await,
        "company services",
    );
    Json(ServicesBody { services })
}

/// POST /api/services/create
pub(super) async fn create_service(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceBody>), ApiError> {
    let rid = &req_id.0;
    let Some(company_id) = body.company_id.filter(|id| *id != 0) else {
        return Err(ApiError::validation(rid, "Company ID is required"));
    };

    let new = NewService {
        company_id,
        name: &body.name,
        description: &body.description,
        category: body.category.as_deref().unwrap_or(FALLBACK_CATEGORY),
        price: body.price,
        duration_minutes: body.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
        image: body.image.as_deref(),
    };
    let service = cobalt_db::create_service(&state.pool, &new)
        .await
        .map_err(|e| map_db_error(rid, &e))?;

    tracing::info!(service_id = service.id, company_id, "service created");
    Ok((StatusCode::CREATED, Json(ServiceBody { service })))
}

/// PUT /api/services/{id}
pub(super) async fn update_service(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(service_id): Path<i64>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<SuccessBody>, ApiError> {
    let rid = &req_id.0;
    let update = ServiceUpdate {
        name: body.name.as_deref(),
        description: body.description.as_deref(),
        category: body.category.as_deref(),
        price: body.price,
        duration_minutes: body.duration,
        image: body.image.as_deref(),
    };
    cobalt_db::update_service(&state.pool, service_id, update)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    Ok(Json(SuccessBody { success: true }))
}

/// DELETE /api/services/{id}
pub(super) async fn delete_service(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(service_id): Path<i64>,
) -> Result<Json<SuccessBody>, ApiError> {
    let rid = &req_id.0;
    cobalt_db::delete_service(&state.pool, service_id)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    Ok(Json(SuccessBody { success: true }))
}
