use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cobalt_core::{
    GeoPoint, PlaceRecord, RecordSource, SearchFilters, SearchIntent, SearchQuery, ServiceId,
    ServiceRecord,
};

use super::*;
use crate::sources::{CatalogSearch, FailureKind, IntentResolve, PlaceSearch, SourceFailure, Stage};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeCatalog {
    result: Result<Vec<ServiceRecord>, SourceFailure>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    fn returning(records: Vec<ServiceRecord>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(records),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err(SourceFailure::call(Stage::Catalog, "connection refused")),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    async fn search_local(
        &self,
        _text: &str,
        _filters: &SearchFilters,
    ) -> Result<Vec<ServiceRecord>, SourceFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

enum PlacesBehavior {
    Return(Vec<PlaceRecord>),
    Fail,
    Hang,
}

struct FakePlaces {
    available: bool,
    behavior: PlacesBehavior,
    calls: AtomicUsize,
    last_args: Mutex<Option<(String, Option<GeoPoint>, Option<String>)>>,
}

impl FakePlaces {
    fn new(available: bool, behavior: PlacesBehavior) -> Arc<Self> {
        Arc::new(Self {
            available,
            behavior,
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PlaceSearch for FakePlaces {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn search_places(
        &self,
        keyword: &str,
        origin: Option<GeoPoint>,
        place_type: Option<&str>,
    ) -> Result<Vec<PlaceRecord>, SourceFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().expect("lock") =
            Some((keyword.to_string(), origin, place_type.map(str::to_string)));
        match &self.behavior {
            PlacesBehavior::Return(places) => Ok(places.clone()),
            PlacesBehavior::Fail => Err(SourceFailure::call(Stage::Places, "HTTP 500")),
            PlacesBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

struct FakeIntents {
    intent: Option<SearchIntent>,
    calls: AtomicUsize,
}

impl FakeIntents {
    fn passthrough() -> Arc<Self> {
        Arc::new(Self {
            intent: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn fixed(intent: SearchIntent) -> Arc<Self> {
        Arc::new(Self {
            intent: Some(intent),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl IntentResolve for FakeIntents {
    async fn resolve(&self, query: &str) -> SearchIntent {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.intent
            .clone()
            .unwrap_or_else(|| SearchIntent::passthrough(query))
    }
}

fn local_record(id: i64, name: &str) -> ServiceRecord {
    ServiceRecord {
        id: ServiceId::Local(id),
        name: name.to_string(),
        company_name: "Studio".to_string(),
        address: "Tverskaya 1".to_string(),
        rating: 4.5,
        category: "hair".to_string(),
        price: 1500.0,
        image: None,
        description: String::new(),
        location: None,
    }
}

fn coffee_place(id: &str) -> PlaceRecord {
    PlaceRecord {
        place_id: id.to_string(),
        name: format!("Cafe {id}"),
        address: "Pokrovka 3".to_string(),
        rating: 4.1,
        location: Some(GeoPoint::new(55.76, 37.64)),
        phone: String::new(),
        website: String::new(),
        thumbnail: None,
    }
}

fn aggregator(
    catalog: Arc<FakeCatalog>,
    places: Arc<FakePlaces>,
    intents: Arc<FakeIntents>,
) -> DiscoveryAggregator {
    DiscoveryAggregator::new(catalog, places, intents, Duration::from_millis(200))
}

fn query(text: &str) -> SearchQuery {
    SearchQuery::new(text, SearchFilters::default(), None)
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_hits_short_circuit_external_search() {
    let catalog = FakeCatalog::returning(vec![local_record(1, "Haircut")]);
    let places = FakePlaces::new(true, PlacesBehavior::Return(vec![coffee_place("x")]));
    let intents = FakeIntents::passthrough();
    let agg = aggregator(catalog.clone(), places.clone(), intents.clone());

    let results = agg.search(&query("haircut")).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source(), RecordSource::Local);
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    assert_eq!(places.calls.load(Ordering::SeqCst), 0);
    assert_eq!(intents.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_catalog_falls_back_to_places_exactly_once() {
    let catalog = FakeCatalog::returning(Vec::new());
    let places = FakePlaces::new(
        true,
        PlacesBehavior::Return(vec![coffee_place("a"), coffee_place("b")]),
    );
    let agg = aggregator(catalog, places.clone(), FakeIntents::passthrough());

    let results = agg.search(&query("coffee")).await;

    assert_eq!(places.calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.len(), 2);
    for record in &results {
        assert!(record.id.to_string().starts_with("google_"));
        assert!((record.price - 0.0).abs() < f64::EPSILON);
        assert_eq!(record.source(), RecordSource::External);
        assert_eq!(record.category, "other");
    }
}

#[tokio::test]
async fn resolved_intent_drives_place_query_and_category() {
    let catalog = FakeCatalog::returning(Vec::new());
    let places = FakePlaces::new(true, PlacesBehavior::Return(vec![coffee_place("a")]));
    let intents = FakeIntents::fixed(SearchIntent {
        business_type: Some("cafe".to_string()),
        keyword: "espresso".to_string(),
        location: None,
    });
    let agg = aggregator(catalog, places.clone(), intents);
    let origin = GeoPoint::new(55.75, 37.61);

    let results = agg
        .search(&SearchQuery::new(
            "good espresso nearby",
            SearchFilters::default(),
            Some(origin),
        ))
        .await;

    let args = places.last_args.lock().expect("lock").clone();
    assert_eq!(
        args,
        Some((
            "espresso".to_string(),
            Some(origin),
            Some("cafe".to_string())
        ))
    );
    assert_eq!(results[0].category, "cafe");
}

#[tokio::test]
async fn blank_query_never_reaches_places() {
    let catalog = FakeCatalog::returning(Vec::new());
    let places = FakePlaces::new(true, PlacesBehavior::Return(vec![coffee_place("a")]));
    let intents = FakeIntents::passthrough();
    let agg = aggregator(catalog, places.clone(), intents.clone());

    assert!(agg.search(&query("")).await.is_empty());
    assert!(agg.search(&query("   ")).await.is_empty());
    assert_eq!(places.calls.load(Ordering::SeqCst), 0);
    assert_eq!(intents.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_places_skips_intent_resolution() {
    let places = FakePlaces::new(false, PlacesBehavior::Return(vec![coffee_place("a")]));
    let intents = FakeIntents::passthrough();
    let agg = aggregator(
        FakeCatalog::returning(Vec::new()),
        places.clone(),
        intents.clone(),
    );

    assert!(agg.search(&query("coffee")).await.is_empty());
    assert_eq!(places.calls.load(Ordering::SeqCst), 0);
    assert_eq!(intents.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Degradation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn places_failure_degrades_to_empty() {
    let agg = aggregator(
        FakeCatalog::returning(Vec::new()),
        FakePlaces::new(true, PlacesBehavior::Fail),
        FakeIntents::passthrough(),
    );

    assert!(agg.search(&query("coffee")).await.is_empty());

    let failure = agg
        .search_external(&query("coffee"))
        .await
        .expect_err("places failed");
    assert_eq!(failure.stage, Stage::Places);
    assert!(matches!(failure.kind, FailureKind::Call(_)));
}

#[tokio::test]
async fn catalog_failure_is_treated_as_no_local_results() {
    let places = FakePlaces::new(true, PlacesBehavior::Return(vec![coffee_place("a")]));
    let agg = aggregator(FakeCatalog::failing(), places.clone(), FakeIntents::passthrough());

    let results = agg.search(&query("coffee")).await;

    assert_eq!(results.len(), 1);
    assert_eq!(places.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn hung_places_call_times_out() {
    let agg = aggregator(
        FakeCatalog::returning(Vec::new()),
        FakePlaces::new(true, PlacesBehavior::Hang),
        FakeIntents::passthrough(),
    );

    let failure = agg
        .search_external(&query("coffee"))
        .await
        .expect_err("must time out");
    assert_eq!(failure, SourceFailure::new(Stage::Places, FailureKind::Timeout));

    assert!(agg.search(&query("coffee")).await.is_empty());
}

#[tokio::test]
async fn hung_intent_resolution_falls_back_to_raw_query() {
    struct HangingIntents;

    #[async_trait]
    impl IntentResolve for HangingIntents {
        async fn resolve(&self, _query: &str) -> SearchIntent {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            SearchIntent::passthrough("never")
        }
    }

    let places = FakePlaces::new(true, PlacesBehavior::Return(vec![coffee_place("a")]));
    let agg = DiscoveryAggregator::new(
        FakeCatalog::returning(Vec::new()),
        places.clone(),
        Arc::new(HangingIntents),
        Duration::from_millis(100),
    );

    let results = agg.search(&query("coffee")).await;

    assert_eq!(results.len(), 1);
    let args = places.last_args.lock().expect("lock").clone();
    assert_eq!(args.map(|(keyword, _, _)| keyword), Some("coffee".to_string()));
}
