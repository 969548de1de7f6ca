//! End-to-end discovery runs against the in-memory store.

use std::time::Duration;

use rstest::{fixture, rstest};

use tablescout_core::test_support::restaurant;
use tablescout_core::{Entity, StoreError};
use tablescout_query::{
    DiscoveryCoordinator, DiscoveryError, DiscoveryRequest, MemoryStore, PageRequest,
};

/// A cluster of restaurants around lower Manhattan plus one far-away
/// outlier, with varied facets to filter on.
#[fixture]
fn city() -> Vec<Entity> {
    let mut noodle = restaurant("noodle", 40.7128, -74.0060, 400);
    noodle.name = "Night Noodle Bar".into();
    noodle.price_level = 2;
    noodle.categories.insert("Japanese".into());
    noodle.ratings.insert("google".into(), 4.6);

    let mut trattoria = restaurant("trattoria", 40.7216, -74.0010, 300);
    trattoria.name = "Trattoria Nonna".into();
    trattoria.neighborhood = Some("SoHo".into());
    trattoria.price_level = 3;
    trattoria.categories.insert("Italian".into());
    trattoria.ratings.insert("google".into(), 4.1);
    trattoria.favorited = true;

    let mut diner = restaurant("diner", 40.7305, -73.9990, 200);
    diner.name = "Noonday Diner".into();
    diner.price_level = 1;
    diner.categories.insert("American".into());
    diner.ratings.insert("google".into(), 3.4);

    let mut berlin = restaurant("berlin", 52.5200, 13.4050, 100);
    berlin.name = "Noodlehaus Berlin".into();
    berlin.price_level = 2;
    berlin.categories.insert("Japanese".into());

    vec![noodle, trattoria, diner, berlin]
}

fn coordinator(entities: Vec<Entity>) -> DiscoveryCoordinator<MemoryStore> {
    DiscoveryCoordinator::new(MemoryStore::new(entities))
}

fn ids(entities: &[Entity]) -> Vec<&str> {
    entities.iter().map(|e| e.id.as_str()).collect()
}

#[rstest]
fn geo_discovery_excludes_entities_outside_the_radius(city: Vec<Entity>) {
    let request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    let mut found = ids(&response.entities);
    found.sort_unstable();
    assert_eq!(found, ["diner", "noodle", "trattoria"]);
    assert!(!response.page_has_more);
}

#[rstest]
fn blank_query_short_circuits_without_a_store_error(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.search_query = Some("  ".into());
    request.query_id = Some("q-42".into());
    // A zero budget would fail any store round-trip, proving the
    // short-circuit never reaches the store.
    request.timeout = Some(Duration::ZERO);

    let response = coordinator(city)
        .execute(&request)
        .expect("no store round-trip happens");
    assert!(response.entities.is_empty());
    assert!(!response.page_has_more);
    assert_eq!(response.query_id.as_deref(), Some("q-42"));
}

#[rstest]
fn text_queries_match_across_the_mapped_fields(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.search_query = Some("noo".into());
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    let mut found = ids(&response.entities);
    found.sort_unstable();
    // Text search is not bounded by the radius; the Berlin noodle bar
    // matches on name just like the local ones.
    assert_eq!(found, ["berlin", "diner", "noodle"]);
}

#[rstest]
fn neighbourhood_names_are_searchable(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.search_query = Some("soho".into());
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    assert_eq!(ids(&response.entities), ["trattoria"]);
}

#[rstest]
fn facet_filters_apply_to_the_store_round_trip(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.filters.min_ratings.insert("google".into(), 4.0);
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    let mut found = ids(&response.entities);
    found.sort_unstable();
    assert_eq!(found, ["noodle", "trattoria"]);
}

#[rstest]
fn favorites_rank_ahead_under_the_default_sort(city: Vec<Entity>) {
    let request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    assert_eq!(ids(&response.entities).first(), Some(&"trattoria"));
}

#[rstest]
fn closest_first_orders_by_distance_from_the_viewer(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.sort.favorites_first = false;
    request.sort.closest_first = true;
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    assert_eq!(ids(&response.entities), ["noodle", "trattoria", "diner"]);
}

#[rstest]
fn page_has_more_reflects_the_window(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.page = PageRequest { size: 2, index: 0 };
    let engine = coordinator(city);
    let response = engine.execute(&request).expect("store is reachable");
    assert_eq!(response.entities.len(), 2);
    assert!(response.page_has_more);

    request.page = PageRequest { size: 2, index: 1 };
    let last = engine.execute(&request).expect("store is reachable");
    assert_eq!(last.entities.len(), 1);
    assert!(!last.page_has_more);
}

#[rstest]
fn exhausted_time_budget_surfaces_as_a_store_timeout(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.timeout = Some(Duration::ZERO);
    let result = coordinator(city).execute(&request);
    assert!(matches!(
        result,
        Err(DiscoveryError::Store(StoreError::Timeout))
    ));
}

#[rstest]
fn query_id_round_trips_untouched(city: Vec<Entity>) {
    let mut request = DiscoveryRequest::centered(40.7128, -74.0060, 10.0);
    request.query_id = Some("attribution-token".into());
    let response = coordinator(city)
        .execute(&request)
        .expect("store is reachable");
    assert_eq!(response.query_id.as_deref(), Some("attribution-token"));
}
