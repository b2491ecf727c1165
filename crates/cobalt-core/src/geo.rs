//! Great-circle distance between two coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeoError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reads a `{lat, lng}` object from loosely-typed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] when the value is not an object
    /// or either field is missing or not a finite number.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, GeoError> {
        let field = |name: &str| -> Result<f64, GeoError> {
            value
                .get(name)
                .and_then(serde_json::Value::as_f64)
                .filter(|v| v.is_finite())
                .ok_or_else(|| GeoError::InvalidCoordinate(format!("'{name}' must be a number")))
        };
        Ok(Self {
            lat: field("lat")?,
            lng: field("lng")?,
        })
    }

    fn validate(self) -> Result<Self, GeoError> {
        if self.lat.is_finite() && self.lng.is_finite() {
            Ok(self)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({}, {}) is not a finite coordinate",
                self.lat, self.lng
            )))
        }
    }
}

/// Haversine distance in meters between `origin` and `destination`.
///
/// # Errors
///
/// Returns [`GeoError::InvalidCoordinate`] if either point holds a NaN or
/// infinite component.
pub fn distance_meters(origin: GeoPoint, destination: GeoPoint) -> Result<f64, GeoError> {
    let origin = origin.validate()?;
    let destination = destination.validate()?;

    let phi1 = origin.lat.to_radians();
    let phi2 = destination.lat.to_radians();
    let delta_phi = (destination.lat - origin.lat).to_radians();
    let delta_lambda = (destination.lng - origin.lng).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Ok(EARTH_RADIUS_M * c)
}

/// Human-readable distance: whole meters below 1 km, otherwise kilometers
/// with one decimal.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters.trunc())
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let p = GeoPoint::new(0.0, 0.0);
        assert_eq!(distance_meters(p, p).unwrap(), 0.0);
    }

    #[test]
    fn manhattan_reference_distance() {
        // Chelsea Market to the Empire State Building.
        let origin = GeoPoint::new(40.7455, -74.0083);
        let destination = GeoPoint::new(40.7484, -73.9857);
        let d = distance_meters(origin, destination).unwrap();
        let reference = 1_930.97;
        assert!(
            (d - reference).abs() / reference < 0.01,
            "expected ~{reference} m, got {d}"
        );
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)).unwrap();
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_non_negative() {
        let london = GeoPoint::new(51.5007, -0.1246);
        let new_york = GeoPoint::new(40.6892, -74.0445);
        let there = distance_meters(london, new_york).unwrap();
        let back = distance_meters(new_york, london).unwrap();
        assert!(there > 0.0);
        assert!((there - back).abs() < 1e-6);
        assert!((there - 5_574_840.0).abs() / 5_574_840.0 < 0.001);
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let err = distance_meters(GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, GeoError::InvalidCoordinate(_)));
    }

    #[test]
    fn from_json_requires_numeric_fields() {
        let ok = GeoPoint::from_json(&serde_json::json!({"lat": 1.5, "lng": -2})).unwrap();
        assert_eq!(ok, GeoPoint::new(1.5, -2.0));

        assert!(GeoPoint::from_json(&serde_json::json!({"lat": 1.5})).is_err());
        assert!(GeoPoint::from_json(&serde_json::json!({"lat": "1.5", "lng": 2})).is_err());
        assert!(GeoPoint::from_json(&serde_json::json!("40.1,-73.2")).is_err());
    }

    #[test]
    fn format_distance_boundaries() {
        assert_eq!(format_distance(999.0), "999 m");
        assert_eq!(format_distance(999.9), "999 m");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(1500.0), "1.5 km");
        assert_eq!(format_distance(0.0), "0 m");
    }
}
