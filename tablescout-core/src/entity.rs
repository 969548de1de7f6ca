//! The ranked and filtered unit of the discovery engine.
//!
//! An [`Entity`] is either a restaurant record or a user post about
//! one. Both carry the same ranking-relevant attributes, so the filter
//! evaluator and the sort comparator treat them uniformly.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::geo::clamp_coordinate;

/// Highest price level an entity can carry (`0..=4`).
pub const MAX_PRICE_LEVEL: u8 = 4;

/// Discriminates the two entity flavours handled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    /// A restaurant record.
    Restaurant,
    /// A user post associated with a restaurant.
    Post,
}

/// A candidate for ranking: one restaurant or post with every attribute
/// the filter evaluator and sort comparator consult.
///
/// Construct with [`Entity::new`] and fill in the remaining fields with
/// struct update syntax:
///
/// ```
/// use tablescout_core::{Entity, EntityKind};
///
/// let entity = Entity {
///     price_level: 2,
///     ..Entity::new("a", EntityKind::Restaurant)
/// };
/// assert_eq!(entity.price_level, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entity {
    /// Unique identifier.
    pub id: String,
    /// Restaurant or post.
    pub kind: EntityKind,
    /// Display name; one of the text-search field paths.
    pub name: String,
    /// Neighbourhood label; one of the text-search field paths.
    pub neighborhood: Option<String>,
    /// Geospatial position in degrees (`x` longitude, `y` latitude).
    /// Posts imported without restaurant data may lack one.
    pub location: Option<Coord<f64>>,
    /// When the record was created in the store.
    pub created_at: DateTime<Utc>,
    /// Creation time at the original source, when the entity was
    /// imported. Imported posts can predate their own record, so date
    /// filtering prefers this timestamp.
    pub source_created_at: Option<DateTime<Utc>>,
    /// Whether the viewer saved or favourited this entity.
    pub favorited: bool,
    /// Price level from `0` (unknown) to [`MAX_PRICE_LEVEL`].
    pub price_level: u8,
    /// Cuisine and meal-type categories.
    pub categories: BTreeSet<String>,
    /// Free-form tags applied by creators.
    pub custom_tags: BTreeSet<String>,
    /// Identifiers of creators with posts about this entity.
    pub creator_ids: BTreeSet<String>,
    /// Publications that covered this entity.
    pub publications: BTreeSet<String>,
    /// Organisations that granted this entity an award.
    pub awards: BTreeSet<String>,
    /// Ratings keyed by rating source name.
    pub ratings: BTreeMap<String, f64>,
    /// Externally computed quality score in `0..=100`.
    pub quality_score: Option<f64>,
    /// Externally computed, viewer-dependent match score in `0..=100`.
    pub percent_match: Option<f64>,
    /// Whether reservations are currently available.
    pub reservable: bool,
    /// Whether the venue is open right now. `None` when no UTC offset
    /// is known for the venue, in which case an open-now filter always
    /// fails.
    pub open_now: Option<bool>,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new("", EntityKind::Restaurant)
    }
}

impl Entity {
    /// Creates an entity with the given identity and every other
    /// attribute empty or unset.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
            neighborhood: None,
            location: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            source_created_at: None,
            favorited: false,
            price_level: 0,
            categories: BTreeSet::new(),
            custom_tags: BTreeSet::new(),
            creator_ids: BTreeSet::new(),
            publications: BTreeSet::new(),
            awards: BTreeSet::new(),
            ratings: BTreeMap::new(),
            quality_score: None,
            percent_match: None,
            reservable: false,
            open_now: None,
        }
    }

    /// Sets the entity's position, clamping latitude and longitude into
    /// their valid ranges.
    pub fn set_location(&mut self, lat: f64, lng: f64) {
        self.location = Some(clamp_coordinate(lat, lng));
    }

    /// Sets the entity's position and returns it, for struct-update
    /// style construction.
    #[must_use]
    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.set_location(lat, lng);
        self
    }

    /// The timestamp date filters and recency sorts operate on: the
    /// original-source creation time when present, otherwise the
    /// record's own creation time.
    #[must_use]
    pub fn ranking_timestamp(&self) -> DateTime<Utc> {
        self.source_created_at.unwrap_or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(95.0, 10.0, 90.0, 10.0)]
    #[case(-95.0, 10.0, -90.0, 10.0)]
    #[case(10.0, 200.0, 10.0, 180.0)]
    #[case(10.0, -200.0, 10.0, -180.0)]
    #[case(40.0, -73.0, 40.0, -73.0)]
    fn set_location_clamps(
        #[case] lat: f64,
        #[case] lng: f64,
        #[case] expected_lat: f64,
        #[case] expected_lng: f64,
    ) {
        let entity = Entity::new("a", EntityKind::Restaurant).at(lat, lng);
        let location = entity.location.expect("location was set");
        assert_eq!(location.y, expected_lat);
        assert_eq!(location.x, expected_lng);
    }

    #[rstest]
    fn ranking_timestamp_prefers_source_creation() {
        let record = DateTime::from_timestamp(2_000, 0).unwrap();
        let source = DateTime::from_timestamp(1_000, 0).unwrap();
        let mut entity = Entity::new("a", EntityKind::Post);
        entity.created_at = record;
        assert_eq!(entity.ranking_timestamp(), record);

        entity.source_created_at = Some(source);
        assert_eq!(entity.ranking_timestamp(), source);
    }
}
