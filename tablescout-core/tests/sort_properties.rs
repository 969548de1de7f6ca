//! Property-based tests for the cascading sort.
//!
//! Every individual pass is stable and every comparator is
//! deterministic, so re-ranking an already-ranked sequence must yield
//! the identical order for any combination of enabled keys.

use chrono::DateTime;
use geo::Coord;
use proptest::prelude::*;
use tablescout_core::{Entity, EntityKind, SortSpec, rank};

type Seed = (bool, i64, Option<f64>, Option<f64>, Option<(f64, f64)>);

fn score_strategy() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(prop_oneof![Just(f64::NAN), 0.0f64..100.0])
}

fn seed_strategy() -> impl Strategy<Value = Seed> {
    (
        any::<bool>(),
        0i64..1_000_000,
        score_strategy(),
        score_strategy(),
        prop::option::of((-85.0f64..85.0, -180.0f64..180.0)),
    )
}

fn build(index: usize, (favorited, seq, quality, percent, location): Seed) -> Entity {
    let mut entity = Entity::new(format!("entity-{index:02}"), EntityKind::Restaurant);
    entity.favorited = favorited;
    entity.created_at = DateTime::from_timestamp(seq, 0).unwrap_or(DateTime::UNIX_EPOCH);
    entity.quality_score = quality;
    entity.percent_match = percent;
    if let Some((lat, lng)) = location {
        entity.set_location(lat, lng);
    }
    entity
}

fn ids(entities: &[Entity]) -> Vec<&str> {
    entities.iter().map(|e| e.id.as_str()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ranking_is_idempotent_for_any_toggle_combination(
        seeds in prop::collection::vec(seed_strategy(), 0..12),
        toggles in (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()),
        with_viewer in any::<bool>(),
    ) {
        let spec = SortSpec {
            favorites_first: toggles.0,
            newest_first: toggles.1,
            closest_first: toggles.2,
            by_quality: toggles.3,
            by_percent_match: toggles.4,
        };
        let entities: Vec<Entity> = seeds
            .into_iter()
            .enumerate()
            .map(|(index, seed)| build(index, seed))
            .collect();
        let viewer = with_viewer.then_some(Coord { x: -73.0, y: 40.0 });

        let once = rank(entities, &spec, viewer);
        let twice = rank(once.clone(), &spec, viewer);
        prop_assert_eq!(ids(&once), ids(&twice));
    }
}
