//! Search inputs and the canonical records discovery produces.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geo::GeoPoint;

/// Prefix marking a service id that came from the external places provider.
pub const EXTERNAL_ID_PREFIX: &str = "google_";

/// Optional narrowing applied to a search.
///
/// Values arrive from HTML form controls, so blank strings mean "not set"
/// and numbers are accepted alongside strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchFilters {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub distance: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: SearchFilters,
    pub origin: Option<GeoPoint>,
}

impl SearchQuery {
    /// Trims the query text; the aggregator treats an empty result as blank.
    #[must_use]
    pub fn new(text: &str, filters: SearchFilters, origin: Option<GeoPoint>) -> Self {
        Self {
            text: text.trim().to_string(),
            filters,
            origin,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Structured reading of a free-text query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIntent {
    pub business_type: Option<String>,
    pub keyword: String,
    pub location: Option<String>,
}

impl SearchIntent {
    /// The degraded intent: the raw query as keyword, nothing else.
    #[must_use]
    pub fn passthrough(query: &str) -> Self {
        Self {
            business_type: None,
            keyword: query.to_string(),
            location: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Local,
    External,
}

/// Identifier of a bookable service.
///
/// Local catalog rows serialize as their numeric id; external places
/// serialize as `google_<placeId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceId {
    Local(i64),
    External(String),
}

impl ServiceId {
    /// Parses a path segment into a service id.
    ///
    /// Returns `None` for strings that are neither prefixed nor an integer.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(place_id) = raw.strip_prefix(EXTERNAL_ID_PREFIX) {
            return Some(ServiceId::External(place_id.to_string()));
        }
        raw.parse::<i64>().ok().map(ServiceId::Local)
    }

    #[must_use]
    pub fn source(&self) -> RecordSource {
        match self {
            ServiceId::Local(_) => RecordSource::Local,
            ServiceId::External(_) => RecordSource::External,
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceId::Local(id) => write!(f, "{id}"),
            ServiceId::External(place_id) => write!(f, "{EXTERNAL_ID_PREFIX}{place_id}"),
        }
    }
}

impl Serialize for ServiceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ServiceId::Local(id) => serializer.serialize_i64(*id),
            ServiceId::External(_) => serializer.collect_str(self),
        }
    }
}

/// One entry in a search response, whatever its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub name: String,
    pub company_name: String,
    pub address: String,
    /// Average rating in `0.0..=5.0`.
    pub rating: f64,
    pub category: String,
    pub price: f64,
    pub image: Option<String>,
    pub description: String,
    pub location: Option<GeoPoint>,
}

impl ServiceRecord {
    /// Origin of the record, derived from its id.
    #[must_use]
    pub fn source(&self) -> RecordSource {
        self.id.source()
    }
}

impl Serialize for ServiceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            id: &'a ServiceId,
            name: &'a str,
            company_name: &'a str,
            address: &'a str,
            rating: f64,
            category: &'a str,
            price: f64,
            image: Option<&'a str>,
            description: &'a str,
            location: Option<GeoPoint>,
            source: RecordSource,
        }

        Wire {
            id: &self.id,
            name: &self.name,
            company_name: &self.company_name,
            address: &self.address,
            rating: self.rating,
            category: &self.category,
            price: self.price,
            image: self.image.as_deref(),
            description: &self.description,
            location: self.location,
            source: self.source(),
        }
        .serialize(serializer)
    }
}

/// A place returned by the external provider, normalized to one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub location: Option<GeoPoint>,
    pub phone: String,
    pub website: String,
    pub thumbnail: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: ServiceId) -> ServiceRecord {
        ServiceRecord {
            id,
            name: "Fade".to_string(),
            company_name: "Barber Co".to_string(),
            address: "1 Main St".to_string(),
            rating: 4.5,
            category: "hair".to_string(),
            price: 25.0,
            image: None,
            description: "Classic fade".to_string(),
            location: None,
        }
    }

    #[test]
    fn service_id_parse_distinguishes_sources() {
        assert_eq!(ServiceId::parse("42"), Some(ServiceId::Local(42)));
        assert_eq!(
            ServiceId::parse("google_ChIJabc"),
            Some(ServiceId::External("ChIJabc".to_string()))
        );
        assert_eq!(ServiceId::parse("abc"), None);
    }

    #[test]
    fn service_id_display_restores_prefix() {
        let id = ServiceId::External("ChIJabc".to_string());
        assert_eq!(id.to_string(), "google_ChIJabc");
        assert_eq!(ServiceId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn local_record_serializes_numeric_id_and_source() {
        let json = serde_json::to_value(record(ServiceId::Local(7))).unwrap();
        assert_eq!(json["id"], serde_json::json!(7));
        assert_eq!(json["source"], "local");
        assert_eq!(json["company_name"], "Barber Co");
        assert!(json["image"].is_null());
    }

    #[test]
    fn external_record_serializes_prefixed_id_and_source() {
        let json = serde_json::to_value(record(ServiceId::External("p1".to_string()))).unwrap();
        assert_eq!(json["id"], "google_p1");
        assert_eq!(json["source"], "external");
    }

    #[test]
    fn filters_treat_blank_strings_as_unset() {
        let filters: SearchFilters = serde_json::from_value(serde_json::json!({
            "category": "",
            "price": "  ",
            "rating": 4,
            "distance": "5"
        }))
        .unwrap();
        assert_eq!(filters.category, None);
        assert_eq!(filters.price, None);
        assert_eq!(filters.rating.as_deref(), Some("4"));
        assert_eq!(filters.distance.as_deref(), Some("5"));
    }

    #[test]
    fn search_query_trims_and_detects_blank() {
        let q = SearchQuery::new("   ", SearchFilters::default(), None);
        assert!(q.is_blank());
        let q = SearchQuery::new("  haircut ", SearchFilters::default(), None);
        assert_eq!(q.text, "haircut");
        assert!(!q.is_blank());
    }
}
