//! Places lookups with the availability state and degrade policy applied.
//!
//! Each public lookup has a `try_` form that returns a typed [`MapsError`]
//! and a plain form that logs the failure and degrades to empty / `None`.

use std::fmt;

use cobalt_core::{GeoPoint, PlaceRecord, ProviderState};
use serde::{Deserialize, Serialize};

use crate::client::SerpApiClient;
use crate::error::MapsError;
use crate::normalize::{place_from_local, place_from_result, to_geo_point};

/// Nominal search radius. `SerpApi` biases by zoom level instead, so it is
/// reported in logs only.
pub const SEARCH_RADIUS_M: u32 = 10_000;

/// Result of a forward or reverse geocode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// A place with the extra fields only a single-place lookup returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetails {
    #[serde(flatten)]
    pub place: PlaceRecord,
    pub reviews_count: u64,
    #[serde(rename = "type")]
    pub place_type: String,
    pub hours: serde_json::Value,
    pub photos: Vec<serde_json::Value>,
    /// Link to the provider's review page.
    pub reviews: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directions {
    pub routes: Vec<serde_json::Value>,
    pub distance: serde_json::Value,
    pub duration: serde_json::Value,
}

/// One end of a route: coordinates or a free-text address.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Coordinates(GeoPoint),
    Address(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Coordinates(p) => write!(f, "{},{}", p.lat, p.lng),
            Endpoint::Address(a) => f.write_str(a),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacesGateway {
    state: ProviderState<SerpApiClient>,
}

impl PlacesGateway {
    /// Builds the gateway from an optional API key.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if a key is present but the HTTP client
    /// cannot be constructed.
    pub fn from_api_key(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, MapsError> {
        let state = ProviderState::try_from_credential(api_key, |key| {
            SerpApiClient::new(key, timeout_secs)
        })?;
        Ok(Self { state })
    }

    #[must_use]
    pub fn with_client(client: SerpApiClient) -> Self {
        Self {
            state: ProviderState::Configured(client),
        }
    }

    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            state: ProviderState::Unconfigured,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    fn client(&self) -> Result<&SerpApiClient, MapsError> {
        self.state.handle().ok_or(MapsError::Unavailable)
    }

    /// Searches places matching `keyword`, prefixed by `place_type` when given.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Unavailable`] without credentials, otherwise any
    /// client error.
    pub async fn try_search_places(
        &self,
        keyword: &str,
        origin: Option<GeoPoint>,
        place_type: Option<&str>,
    ) -> Result<Vec<PlaceRecord>, MapsError> {
        let client = self.client()?;
        let query = compose_query(keyword, place_type);
        let near = origin.map(|p| (p.lat, p.lng));
        let response = client.maps_search(&query, near).await?;
        let places: Vec<PlaceRecord> = response
            .local_results
            .into_iter()
            .filter_map(place_from_local)
            .collect();
        tracing::debug!(
            query = %query,
            radius_m = SEARCH_RADIUS_M,
            near = origin.is_some(),
            found = places.len(),
            "place search finished"
        );
        Ok(places)
    }

    /// Like [`PlacesGateway::try_search_places`] but degrades to an empty list.
    pub async fn search_places(
        &self,
        keyword: &str,
        origin: Option<GeoPoint>,
        place_type: Option<&str>,
    ) -> Vec<PlaceRecord> {
        match self.try_search_places(keyword, origin, place_type).await {
            Ok(places) => places,
            Err(MapsError::Unavailable) => {
                tracing::debug!(keyword, "places provider unavailable; skipping search");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, keyword, "place search failed");
                Vec::new()
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`MapsError::Unavailable`] without credentials, otherwise any
    /// client error.
    pub async fn try_geocode(&self, address: &str) -> Result<Option<GeocodeResult>, MapsError> {
        let response = self.client()?.maps_search(address, None).await?;

        if let Some(place) = &response.place_results {
            if let Some(point) = to_geo_point(place.gps_coordinates) {
                return Ok(Some(GeocodeResult {
                    lat: point.lat,
                    lng: point.lng,
                    address: place.address.clone().unwrap_or_else(|| address.to_string()),
                }));
            }
        }

        Ok(response.local_results.into_iter().next().and_then(|first| {
            to_geo_point(first.gps_coordinates).map(|point| GeocodeResult {
                lat: point.lat,
                lng: point.lng,
                address: first.address.unwrap_or_else(|| address.to_string()),
            })
        }))
    }

    pub async fn geocode(&self, address: &str) -> Option<GeocodeResult> {
        self.try_geocode(address)
            .await
            .unwrap_or_else(|e| log_failure("geocode", &e))
    }

    /// Resolves coordinates to an address. When the provider has no place at
    /// that point the address is the `"lat,lng"` pair itself.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Unavailable`] without credentials, otherwise any
    /// client error.
    pub async fn try_reverse_geocode(&self, point: GeoPoint) -> Result<GeocodeResult, MapsError> {
        let query = format!("{},{}", point.lat, point.lng);
        let response = self.client()?.maps_search(&query, None).await?;
        let address = response
            .place_results
            .and_then(|p| p.address)
            .unwrap_or(query);
        Ok(GeocodeResult {
            lat: point.lat,
            lng: point.lng,
            address,
        })
    }

    pub async fn reverse_geocode(&self, point: GeoPoint) -> Option<GeocodeResult> {
        match self.try_reverse_geocode(point).await {
            Ok(result) => Some(result),
            Err(e) => log_failure("reverse geocode", &e),
        }
    }

    /// # Errors
    ///
    /// Returns [`MapsError::Unavailable`] without credentials, otherwise any
    /// client error.
    pub async fn try_place_details(
        &self,
        place_id: &str,
    ) -> Result<Option<PlaceDetails>, MapsError> {
        let response = self.client()?.place(place_id).await?;
        Ok(response.place_results.map(|raw| PlaceDetails {
            place: place_from_result(&raw, place_id),
            reviews_count: raw.reviews.unwrap_or(0),
            place_type: raw.place_type.unwrap_or_default(),
            hours: raw.hours,
            photos: raw.photos,
            reviews: raw.reviews_link.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
        }))
    }

    pub async fn place_details(&self, place_id: &str) -> Option<PlaceDetails> {
        self.try_place_details(place_id)
            .await
            .unwrap_or_else(|e| log_failure("place details", &e))
    }

    /// # Errors
    ///
    /// Returns [`MapsError::Unavailable`] without credentials, otherwise any
    /// client error.
    pub async fn try_directions(
        &self,
        origin: &Endpoint,
        destination: &Endpoint,
    ) -> Result<Option<Directions>, MapsError> {
        let response = self
            .client()?
            .directions(&origin.to_string(), &destination.to_string())
            .await?;
        if response.directions.is_empty() {
            return Ok(None);
        }
        Ok(Some(Directions {
            routes: response.directions,
            distance: response.distance,
            duration: response.duration,
        }))
    }

    pub async fn directions(&self, origin: &Endpoint, destination: &Endpoint) -> Option<Directions> {
        self.try_directions(origin, destination)
            .await
            .unwrap_or_else(|e| log_failure("directions", &e))
    }
}

fn compose_query(keyword: &str, place_type: Option<&str>) -> String {
    match place_type.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => format!("{t} {keyword}"),
        None => keyword.to_string(),
    }
}

fn log_failure<T>(operation: &str, error: &MapsError) -> Option<T> {
    if matches!(error, MapsError::Unavailable) {
        tracing::debug!(operation, "places provider unavailable");
    } else {
        tracing::warn!(error = %error, operation, "places lookup failed");
    }
    None
}
