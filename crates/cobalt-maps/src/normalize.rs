//! Maps `SerpApi` result types onto [`PlaceRecord`].

use cobalt_core::{GeoPoint, PlaceRecord};

use crate::types::{GpsCoordinates, LocalResult, PlaceResult};

/// Converts provider coordinates into a [`GeoPoint`], dropping partial or
/// non-finite pairs.
#[must_use]
pub fn to_geo_point(gps: Option<GpsCoordinates>) -> Option<GeoPoint> {
    let gps = gps?;
    match (gps.latitude, gps.longitude) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
            Some(GeoPoint::new(lat, lng))
        }
        _ => None,
    }
}

/// Normalizes one `local_results` entry.
///
/// Entries without a `place_id` cannot be addressed later and are skipped.
#[must_use]
pub fn place_from_local(raw: LocalResult) -> Option<PlaceRecord> {
    let place_id = non_blank(raw.place_id)?;
    Some(PlaceRecord {
        place_id,
        name: raw.title.unwrap_or_default(),
        address: raw.address.unwrap_or_default(),
        rating: normalize_rating(raw.rating),
        location: to_geo_point(raw.gps_coordinates),
        phone: raw.phone.unwrap_or_default(),
        website: raw.website.unwrap_or_default(),
        thumbnail: non_blank(raw.thumbnail),
    })
}

/// Normalizes a `place_results` object, using `fallback_id` when the
/// provider omits the id (it does for `place_id` lookups).
#[must_use]
pub fn place_from_result(raw: &PlaceResult, fallback_id: &str) -> PlaceRecord {
    PlaceRecord {
        place_id: non_blank(raw.place_id.clone()).unwrap_or_else(|| fallback_id.to_string()),
        name: raw.title.clone().unwrap_or_default(),
        address: raw.address.clone().unwrap_or_default(),
        rating: normalize_rating(raw.rating),
        location: to_geo_point(raw.gps_coordinates),
        phone: raw.phone.clone().unwrap_or_default(),
        website: raw.website.clone().unwrap_or_default(),
        thumbnail: non_blank(raw.thumbnail.clone()),
    }
}

/// Missing or out-of-range ratings collapse into `[0, 5]`.
fn normalize_rating(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() => r.clamp(0.0, 5.0),
        _ => 0.0,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gps(lat: f64, lng: f64) -> Option<GpsCoordinates> {
        Some(GpsCoordinates {
            latitude: Some(lat),
            longitude: Some(lng),
        })
    }

    #[test]
    fn local_result_maps_provider_fields() {
        let raw = LocalResult {
            place_id: Some("ChIJ123".to_string()),
            title: Some("Brew Lab".to_string()),
            address: Some("Arbat 10".to_string()),
            rating: Some(4.6),
            gps_coordinates: gps(55.75, 37.59),
            phone: Some("+7 495 000 00 00".to_string()),
            website: None,
            thumbnail: Some(String::new()),
            place_type: Some("Cafe".to_string()),
        };

        let place = place_from_local(raw).expect("has place id");
        assert_eq!(place.place_id, "ChIJ123");
        assert_eq!(place.name, "Brew Lab");
        assert_eq!(place.location, Some(GeoPoint::new(55.75, 37.59)));
        assert_eq!(place.website, "");
        assert!(place.thumbnail.is_none());
        assert!((place.rating - 4.6).abs() < f64::EPSILON);
    }

    #[test]
    fn local_result_without_place_id_is_skipped() {
        let raw = LocalResult {
            title: Some("Nameless".to_string()),
            ..Default::default()
        };
        assert!(place_from_local(raw).is_none());
    }

    #[test]
    fn partial_coordinates_are_dropped() {
        let half = Some(GpsCoordinates {
            latitude: Some(1.0),
            longitude: None,
        });
        assert!(to_geo_point(half).is_none());
        assert!(to_geo_point(None).is_none());
    }

    #[test]
    fn rating_is_clamped_and_defaults_to_zero() {
        assert!((normalize_rating(None) - 0.0).abs() < f64::EPSILON);
        assert!((normalize_rating(Some(7.0)) - 5.0).abs() < f64::EPSILON);
        assert!((normalize_rating(Some(f64::NAN)) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn place_result_uses_fallback_id() {
        let raw = PlaceResult {
            title: Some("Spa".to_string()),
            ..Default::default()
        };
        let place = place_from_result(&raw, "abc");
        assert_eq!(place.place_id, "abc");
        assert_eq!(place.name, "Spa");
    }
}
