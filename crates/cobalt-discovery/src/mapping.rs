//! Conversions into [`ServiceRecord`].

use cobalt_core::{GeoPoint, PlaceRecord, ServiceId, ServiceRecord};
use cobalt_db::ServiceSearchRow;

pub const EXTERNAL_DESCRIPTION: &str = "Found via Google Maps";
pub const FALLBACK_CATEGORY: &str = "other";

/// Synthesizes a service record from an external place.
///
/// The place name doubles as company name; external records carry no price.
#[must_use]
pub fn service_from_place(place: &PlaceRecord, category: Option<&str>) -> ServiceRecord {
    ServiceRecord {
        id: ServiceId::External(place.place_id.clone()),
        name: place.name.clone(),
        company_name: place.name.clone(),
        address: place.address.clone(),
        rating: clamp_rating(place.rating),
        category: category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string(),
        price: 0.0,
        image: place.thumbnail.clone(),
        description: EXTERNAL_DESCRIPTION.to_string(),
        location: place.location,
    }
}

#[must_use]
pub fn service_from_row(row: ServiceSearchRow) -> ServiceRecord {
    let location = match (row.latitude, row.longitude) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    };
    ServiceRecord {
        id: ServiceId::Local(row.id),
        name: row.name,
        company_name: row.company_name,
        address: row.company_address.unwrap_or_default(),
        rating: clamp_rating(row.rating),
        category: row.category,
        price: row.price,
        image: row.image,
        description: row.description,
        location,
    }
}

fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, 5.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_core::RecordSource;

    fn place() -> PlaceRecord {
        PlaceRecord {
            place_id: "ChIJcoffee".to_string(),
            name: "Coffee Point".to_string(),
            address: "Pokrovka 3".to_string(),
            rating: 4.2,
            location: Some(GeoPoint::new(55.76, 37.64)),
            phone: String::new(),
            website: String::new(),
            thumbnail: Some("https://img.example/c.jpg".to_string()),
        }
    }

    #[test]
    fn external_record_has_prefixed_id_and_no_price() {
        let record = service_from_place(&place(), Some("cafe"));

        assert_eq!(record.id.to_string(), "google_ChIJcoffee");
        assert_eq!(record.source(), RecordSource::External);
        assert!((record.price - 0.0).abs() < f64::EPSILON);
        assert_eq!(record.category, "cafe");
        assert_eq!(record.company_name, "Coffee Point");
        assert_eq!(record.description, EXTERNAL_DESCRIPTION);
    }

    #[test]
    fn missing_category_becomes_other() {
        assert_eq!(service_from_place(&place(), None).category, "other");
        assert_eq!(service_from_place(&place(), Some(" ")).category, "other");
    }

    #[test]
    fn mapping_is_idempotent() {
        let p = place();
        assert_eq!(
            service_from_place(&p, Some("cafe")),
            service_from_place(&p, Some("cafe"))
        );
    }

    #[test]
    fn local_row_keeps_numeric_id_and_location() {
        let row = ServiceSearchRow {
            id: 7,
            name: "Haircut".to_string(),
            description: "Classic cut".to_string(),
            category: "hair".to_string(),
            price: 1200.0,
            image: None,
            rating: 4.9,
            latitude: Some(55.7),
            longitude: Some(37.6),
            company_name: "Studio".to_string(),
            company_address: None,
        };

        let record = service_from_row(row);
        assert_eq!(record.id, ServiceId::Local(7));
        assert_eq!(record.source(), RecordSource::Local);
        assert_eq!(record.address, "");
        assert_eq!(record.location, Some(GeoPoint::new(55.7, 37.6)));
    }
}
