//! `SerpApi` response types.
//!
//! Only the fields the gateway reads are modelled. Every field is optional
//! on the wire, so everything carries `#[serde(default)]`. Scalar fields go
//! through [`lenient`] and lists through [`lenient_list`]: a value of the
//! wrong type drops that value, never the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserializes an optional field, mapping a type mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserializes a list, skipping entries that do not fit `T`. Anything
/// other than an array yields an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Body returned by `engine=google_maps`.
///
/// A free-text query yields `local_results`; an exact match or a
/// `place_id` lookup yields `place_results`.
#[derive(Debug, Default, Deserialize)]
pub struct MapsResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub local_results: Vec<LocalResult>,
    #[serde(default, deserialize_with = "lenient")]
    pub place_results: Option<PlaceResult>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct GpsCoordinates {
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
}

/// One entry of `local_results`.
#[derive(Debug, Default, Deserialize)]
pub struct LocalResult {
    #[serde(default, deserialize_with = "lenient")]
    pub place_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub gps_coordinates: Option<GpsCoordinates>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub place_type: Option<String>,
}

/// The single `place_results` object.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceResult {
    #[serde(default, deserialize_with = "lenient")]
    pub place_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    /// Review count.
    #[serde(default, deserialize_with = "lenient")]
    pub reviews: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub gps_coordinates: Option<GpsCoordinates>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub place_type: Option<String>,
    /// Shape varies by locale (list of day objects or a map), kept opaque.
    #[serde(default)]
    pub hours: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_list")]
    pub photos: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub reviews_link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

/// Body returned by `engine=google_maps_directions`.
#[derive(Debug, Default, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub directions: Vec<serde_json::Value>,
    #[serde(default)]
    pub distance: serde_json::Value,
    #[serde(default)]
    pub duration: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_array_results_read_as_empty() {
        let response: MapsResponse = serde_json::from_value(serde_json::json!({
            "local_results": { "unexpected": true },
            "place_results": "nope"
        }))
        .expect("top-level object always parses");
        assert!(response.local_results.is_empty());
        assert!(response.place_results.is_none());
    }

    #[test]
    fn null_and_mistyped_scalars_become_none() {
        let entry: LocalResult = serde_json::from_value(serde_json::json!({
            "place_id": "p1",
            "title": null,
            "rating": "4,5",
            "gps_coordinates": { "latitude": "55.7", "longitude": 37.6 }
        }))
        .expect("entry parses");
        assert_eq!(entry.place_id.as_deref(), Some("p1"));
        assert!(entry.title.is_none());
        assert!(entry.rating.is_none());
        let gps = entry.gps_coordinates.expect("object kept");
        assert!(gps.latitude.is_none());
        assert_eq!(gps.longitude, Some(37.6));
    }
}
