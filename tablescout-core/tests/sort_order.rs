//! Tests for ranking, sort order, and score sanitisation.

use chrono::DateTime;
use geo::Coord;
use rstest::rstest;
use tablescout_core::{Entity, EntityKind, SortSpec, rank, sanitise_score};

fn entity(id: &str) -> Entity {
    Entity::new(id, EntityKind::Restaurant)
}

fn ids(entities: &[Entity]) -> Vec<&str> {
    entities.iter().map(|e| e.id.as_str()).collect()
}

fn viewer() -> Coord<f64> {
    Coord { x: -73.0, y: 40.0 }
}

// Distance ascending from the viewer orders the co-located entity
// first.
#[rstest]
fn distance_sort_orders_nearest_first() {
    let a = entity("a").at(40.0, -73.0);
    let b = entity("b").at(40.1, -73.1);
    let spec = SortSpec {
        closest_first: true,
        ..SortSpec::default()
    };
    let ranked = rank(vec![b, a], &spec, Some(viewer()));
    assert_eq!(ids(&ranked), ["a", "b"]);
}

#[rstest]
fn distance_sort_is_skipped_without_a_viewer() {
    let a = entity("a").at(40.1, -73.1);
    let b = entity("b").at(40.0, -73.0);
    let spec = SortSpec {
        favorites_first: false,
        closest_first: true,
        ..SortSpec::default()
    };
    // No substitute key: the input order survives untouched.
    let ranked = rank(vec![a, b], &spec, None);
    assert_eq!(ids(&ranked), ["a", "b"]);
}

#[rstest]
fn favorites_surface_first() {
    let mut a = entity("a");
    let mut b = entity("b");
    let mut c = entity("c");
    a.favorited = false;
    b.favorited = true;
    c.favorited = false;
    let ranked = rank(vec![a, b, c], &SortSpec::default(), None);
    assert_eq!(ids(&ranked), ["b", "a", "c"]);
}

// Later keys in the fixed priority order override earlier ones:
// percent-match has the final say, favourites only break its ties.
#[rstest]
fn percent_match_overrides_favorites() {
    let mut a = entity("a");
    let mut b = entity("b");
    let mut c = entity("c");
    a.favorited = true;
    a.percent_match = Some(40.0);
    b.percent_match = Some(90.0);
    c.favorited = true;
    c.percent_match = Some(90.0);
    let spec = SortSpec {
        by_percent_match: true,
        ..SortSpec::default()
    };
    let ranked = rank(vec![a, b, c], &spec, None);
    // c ties with b at 90 but is favourited, so the earlier stable
    // favourites pass keeps it ahead.
    assert_eq!(ids(&ranked), ["c", "b", "a"]);
}

#[rstest]
fn newest_first_uses_the_ranking_timestamp() {
    let mut a = entity("a");
    let mut b = entity("b");
    a.created_at = DateTime::from_timestamp(1_000, 0).expect("valid timestamp");
    b.created_at = DateTime::from_timestamp(500, 0).expect("valid timestamp");
    // b's imported source timestamp is newer than a's record.
    b.source_created_at = Some(DateTime::from_timestamp(2_000, 0).expect("valid timestamp"));
    let spec = SortSpec {
        newest_first: true,
        ..SortSpec::default()
    };
    let ranked = rank(vec![a, b], &spec, None);
    assert_eq!(ids(&ranked), ["b", "a"]);
}

#[rstest]
fn missing_and_nan_scores_rank_as_zero() {
    let mut a = entity("a");
    let mut b = entity("b");
    let mut c = entity("c");
    a.quality_score = Some(f64::NAN);
    b.quality_score = Some(10.0);
    c.quality_score = None;
    let spec = SortSpec {
        favorites_first: false,
        by_quality: true,
        ..SortSpec::default()
    };
    let ranked = rank(vec![a, b, c], &spec, None);
    // b leads; the NaN and missing scores tie at zero in input order.
    assert_eq!(ids(&ranked), ["b", "a", "c"]);
}

#[rstest]
#[case(Some(42.0), 42.0)]
#[case(Some(-3.0), 0.0)]
#[case(Some(f64::NAN), 0.0)]
#[case(Some(f64::INFINITY), 0.0)]
#[case(None, 0.0)]
fn sanitise_score_normalises(#[case] score: Option<f64>, #[case] expected: f64) {
    assert_eq!(sanitise_score(score), expected);
}

#[rstest]
fn entities_without_a_location_sort_ahead() {
    let a = entity("a").at(40.0, -73.0);
    let b = entity("b");
    let spec = SortSpec {
        favorites_first: false,
        closest_first: true,
        ..SortSpec::default()
    };
    let ranked = rank(vec![a, b], &spec, Some(viewer()));
    assert_eq!(ids(&ranked), ["b", "a"]);
}

// Re-ranking an already-ranked sequence yields the identical order.
#[rstest]
fn ranking_is_idempotent() {
    let mut a = entity("a").at(40.05, -73.05);
    let mut b = entity("b").at(40.0, -73.0);
    let mut c = entity("c").at(40.1, -73.1);
    a.favorited = true;
    a.percent_match = Some(60.0);
    b.quality_score = Some(80.0);
    c.percent_match = Some(60.0);
    c.quality_score = Some(80.0);
    let spec = SortSpec {
        favorites_first: true,
        newest_first: true,
        closest_first: true,
        by_quality: true,
        by_percent_match: true,
    };
    let once = rank(vec![a, b, c], &spec, Some(viewer()));
    let twice = rank(once.clone(), &spec, Some(viewer()));
    assert_eq!(ids(&once), ids(&twice));
}
