//! Thin HTTP wrappers over the places gateway and distance math.
//!
//! Bodies are read leniently: anything that is not a JSON object is treated
//! as an empty object, so missing input surfaces as a 400 naming the field.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use cobalt_core::{distance_meters, format_distance, GeoPoint, PlaceRecord};
use cobalt_maps::{Directions, Endpoint, GeocodeResult, PlaceDetails};
use serde::Serialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const PROVIDER_NAME: &str = "SerpApi";

#[derive(Debug, Serialize)]
pub(super) struct PlacesBody {
    places: Vec<PlaceRecord>,
}

#[derive(Debug, Serialize)]
pub(super) struct DistanceBody {
    distance_meters: f64,
    distance_formatted: String,
}

#[derive(Debug, Serialize)]
pub(super) struct StatusBody {
    available: bool,
    provider: &'static str,
}

fn lenient_body(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(serde_json::Map::new()),
    }
}

fn non_blank_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn present<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    })
}

fn endpoint(value: &Value) -> Option<Endpoint> {
    match value {
        Value::String(address) => Some(Endpoint::Address(address.trim().to_string())),
        other => GeoPoint::from_json(other).ok().map(Endpoint::Coordinates),
    }
}

/// POST /api/maps/search
pub(super) async fn search_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<PlacesBody>, ApiError> {
    let body = lenient_body(&body);
    let Some(query) = non_blank_str(&body, "query") else {
        return Err(ApiError::validation(&req_id.0, "Query is required"));
    };
    let origin = present(&body, "location").and_then(|v| GeoPoint::from_json(v).ok());
    let place_type = non_blank_str(&body, "type");

    let places = state.maps.search_places(query, origin, place_type).await;
    Ok(Json(PlacesBody { places }))
}

/// POST /api/maps/geocode
pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<GeocodeResult>, ApiError> {
    let rid = &req_id.0;
    let body = lenient_body(&body);
    let Some(address) = non_blank_str(&body, "address") else {
        return Err(ApiError::validation(rid, "Address is required"));
    };

    state
        .maps
        .geocode(address)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(rid, "Could not geocode address"))
}

/// POST /api/maps/reverse-geocode
pub(super) async fn reverse_geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<GeocodeResult>, ApiError> {
    let rid = &req_id.0;
    let body = lenient_body(&body);
    let point = GeoPoint::from_json(&body)
        .map_err(|_| ApiError::validation(rid, "lat and lng are required"))?;

    state
        .maps
        .reverse_geocode(point)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(rid, "Could not reverse geocode"))
}

/// GET /api/maps/place/{place_id}
pub(super) async fn place_details(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(place_id): Path<String>,
) -> Result<Json<PlaceDetails>, ApiError> {
    state
        .maps
        .place_details(&place_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&req_id.0, "Place not found"))
}

/// POST /api/maps/distance
///
/// Pure computation; works without provider credentials.
pub(super) async fn distance(
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<DistanceBody>, ApiError> {
    let rid = &req_id.0;
    let body = lenient_body(&body);
    let (Some(origin), Some(destination)) =
        (present(&body, "origin"), present(&body, "destination"))
    else {
        return Err(ApiError::validation(rid, "origin and destination are required"));
    };

    let meters = GeoPoint::from_json(origin)
        .and_then(|o| GeoPoint::from_json(destination).map(|d| (o, d)))
        .and_then(|(o, d)| distance_meters(o, d))
        .map_err(|e| ApiError::validation(rid, format!("Could not calculate distance: {e}")))?;

    Ok(Json(DistanceBody {
        distance_meters: meters,
        distance_formatted: format_distance(meters),
    }))
}

/// POST /api/maps/directions
///
/// Each endpoint is either `{lat, lng}` or a free-text address.
pub(super) async fn directions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<Directions>, ApiError> {
    let rid = &req_id.0;
    let body = lenient_body(&body);
    let endpoints = present(&body, "origin")
        .and_then(endpoint)
        .zip(present(&body, "destination").and_then(endpoint));
    let Some((origin, destination)) = endpoints else {
        return Err(ApiError::validation(rid, "origin and destination are required"));
    };

    state
        .maps
        .directions(&origin, &destination)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(rid, "Could not get directions"))
}

/// GET /api/maps/status
pub(super) async fn status(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        available: state.maps.is_available(),
        provider: PROVIDER_NAME,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_body_replaces_non_objects() {
        assert_eq!(lenient_body(b"not json"), serde_json::json!({}));
        assert_eq!(lenient_body(b"[1,2]"), serde_json::json!({}));
        assert_eq!(lenient_body(br#"{"a":1}"#), serde_json::json!({"a": 1}));
    }

    #[test]
    fn endpoint_accepts_coordinates_or_address() {
        assert_eq!(
            endpoint(&serde_json::json!({"lat": 1.5, "lng": 2.5})),
            Some(Endpoint::Coordinates(GeoPoint::new(1.5, 2.5)))
        );
        assert_eq!(
            endpoint(&serde_json::json!(" Red Square ")),
            Some(Endpoint::Address("Red Square".to_string()))
        );
        assert_eq!(endpoint(&serde_json::json!({"lat": 1.5})), None);
    }

    #[test]
    fn blank_values_are_not_present() {
        let body = serde_json::json!({"origin": "", "destination": {}, "x": 0});
        assert!(present(&body, "origin").is_none());
        assert!(present(&body, "destination").is_none());
        assert!(present(&body, "x").is_some());
    }
}
