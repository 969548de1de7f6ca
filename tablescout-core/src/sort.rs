//! Cascading multi-key ordering of candidate entities.
//!
//! The chain is a fixed priority list applied as successive stable
//! sorts: favourites first, then creation date, distance to the
//! viewer, quality score, and percent-match score. Each enabled key
//! re-sorts the whole sequence, so later keys take priority and earlier
//! keys survive only as tie-breaks.

use std::cmp::Ordering;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::Entity;
use crate::geo::distance_km;

/// Toggleable sort keys, applied in a fixed priority order regardless
/// of field order here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortSpec {
    /// Viewer-saved entities surface first. Lowest priority.
    pub favorites_first: bool,
    /// Most recently created entities surface first.
    pub newest_first: bool,
    /// Entities nearest the viewer surface first. Skipped entirely when
    /// no viewer coordinate is supplied.
    pub closest_first: bool,
    /// Highest quality score first.
    pub by_quality: bool,
    /// Highest percent-match score first. Highest priority: applied
    /// last, so it has the final say.
    pub by_percent_match: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            favorites_first: true,
            newest_first: false,
            closest_first: false,
            by_quality: false,
            by_percent_match: false,
        }
    }
}

/// Normalises an optional score for comparison: missing, NaN, and
/// negative values all rank as zero, keeping the comparator a strict
/// weak ordering.
#[must_use]
pub fn sanitise_score(score: Option<f64>) -> f64 {
    score
        .filter(|value| value.is_finite())
        .map_or(0.0, |value| value.max(0.0))
}

/// Compares two entities by distance to `viewer`, nearest first.
/// Entities without a position sort ahead of positioned ones, matching
/// the gallery's treatment of posts that lack restaurant data.
fn compare_distance(a: &Entity, b: &Entity, viewer: Coord<f64>) -> Ordering {
    match (a.location, b.location) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(loc_a), Some(loc_b)) => {
            distance_km(loc_a, viewer).total_cmp(&distance_km(loc_b, viewer))
        }
    }
}

/// Orders `entities` by the enabled keys of `spec`.
///
/// Pure: consumes the input and returns a new ordering rather than
/// mutating shared state. Every individual sort is stable, so the
/// result is deterministic and re-ranking an already-ranked sequence is
/// a no-op.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tablescout_core::{Entity, EntityKind, SortSpec, rank};
///
/// let a = Entity::new("a", EntityKind::Restaurant).at(40.0, -73.0);
/// let b = Entity::new("b", EntityKind::Restaurant).at(40.1, -73.1);
/// let spec = SortSpec {
///     closest_first: true,
///     ..SortSpec::default()
/// };
/// let viewer = Coord { x: -73.0, y: 40.0 };
/// let ranked = rank(vec![b, a], &spec, Some(viewer));
/// let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
/// assert_eq!(ids, ["a", "b"]);
/// ```
#[must_use]
pub fn rank(mut entities: Vec<Entity>, spec: &SortSpec, viewer: Option<Coord<f64>>) -> Vec<Entity> {
    if spec.favorites_first {
        entities.sort_by_key(|entity| !entity.favorited);
    }
    if spec.newest_first {
        entities.sort_by_key(|entity| std::cmp::Reverse(entity.ranking_timestamp()));
    }
    if spec.closest_first {
        if let Some(viewer) = viewer {
            entities.sort_by(|a, b| compare_distance(a, b, viewer));
        }
    }
    if spec.by_quality {
        entities.sort_by(|a, b| {
            sanitise_score(b.quality_score).total_cmp(&sanitise_score(a.quality_score))
        });
    }
    if spec.by_percent_match {
        entities.sort_by(|a, b| {
            sanitise_score(b.percent_match).total_cmp(&sanitise_score(a.percent_match))
        });
    }
    entities
}
