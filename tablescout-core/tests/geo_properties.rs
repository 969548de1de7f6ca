//! Property-based tests for the spherical geometry module.
//!
//! # Invariants tested
//!
//! - **Symmetry:** `distance_km(a, b) == distance_km(b, a)`.
//! - **Identity:** the distance from any point to itself is zero.
//! - **Inverse projection:** `search_area_diameter_m` undoes
//!   `zoom_level_for_diameter` within floating tolerance.
//! - **Centroid containment:** a cluster centroid is never farther from
//!   any member than the cluster diameter.

#![expect(
    clippy::float_arithmetic,
    reason = "property assertions compare floating-point results within tolerances"
)]

use geo::Coord;
use proptest::prelude::*;
use tablescout_core::geo::{
    centroid, cluster_diameter_km, distance_km, search_area_diameter_m, zoom_level_for_diameter,
};

fn coord_strategy() -> impl Strategy<Value = Coord<f64>> {
    (-85.0f64..85.0, -180.0f64..180.0).prop_map(|(lat, lng)| Coord { x: lng, y: lat })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn distance_is_symmetric(a in coord_strategy(), b in coord_strategy()) {
        prop_assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero(a in coord_strategy()) {
        prop_assert_eq!(distance_km(a, a), 0.0);
    }

    #[test]
    fn zoom_and_search_diameter_are_inverses(
        center in coord_strategy(),
        diameter in 10.0f64..10_000_000.0,
    ) {
        let zoom = zoom_level_for_diameter(center, diameter);
        let recovered = search_area_diameter_m(center, zoom);
        prop_assert!((recovered - diameter).abs() <= diameter * 1e-9);
    }

    #[test]
    fn centroid_stays_within_the_cluster(
        points in prop::collection::vec(coord_strategy(), 1..8),
    ) {
        let center = centroid(&points).expect("non-empty cluster");
        let diameter = cluster_diameter_km(&points).expect("non-empty cluster");
        for point in &points {
            // Allow slack for degenerate clusters and rounding.
            prop_assert!(distance_km(center, *point) <= diameter.max(1e-6) * 1.5 + 1e-6);
        }
    }
}
