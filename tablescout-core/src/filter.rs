//! Multi-facet filter predicates over candidate entities.
//!
//! [`FilterSpec`] is evaluated in exactly one place:
//! [`FilterSpec::passes`]. The store-facing query layer translates the
//! same facets into native match syntax rather than re-implementing
//! them, so the pushed-down and in-memory paths cannot drift apart.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Entity;

/// An inclusive creation-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Earliest admitted timestamp.
    pub min: DateTime<Utc>,
    /// Latest admitted timestamp.
    pub max: DateTime<Utc>,
}

impl DateRange {
    /// Whether `instant` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.min && instant <= self.max
    }
}

/// An immutable set of named, optional filter facets.
///
/// Facets are conjunctive across one another and disjunctive within a
/// facet's value set: an entity passes a facet once any of its values
/// matches any selected value, and an empty facet never excludes
/// anything.
///
/// ```
/// use tablescout_core::{Entity, EntityKind, FilterSpec};
///
/// let entity = Entity {
///     price_level: 2,
///     ..Entity::new("a", EntityKind::Restaurant)
/// };
/// let filters = FilterSpec {
///     price_levels: [2].into(),
///     ..FilterSpec::default()
/// };
/// assert!(filters.passes(&entity));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Admitted price levels.
    pub price_levels: BTreeSet<u8>,
    /// Admitted cuisine categories, matched against entity categories.
    pub cuisines: BTreeSet<String>,
    /// Admitted meal-type categories, matched against entity categories.
    pub meal_types: BTreeSet<String>,
    /// Admitted creator identifiers.
    pub creator_ids: BTreeSet<String>,
    /// Admitted publications. Jointly with [`Self::awards`] this forms
    /// the "recognised" facet: selecting either set requires a match in
    /// either set.
    pub publications: BTreeSet<String>,
    /// Admitted award organisations; see [`Self::publications`].
    pub awards: BTreeSet<String>,
    /// Admitted custom tags.
    pub custom_tags: BTreeSet<String>,
    /// Minimum rating per rating source. Thresholds of zero or below
    /// are inert.
    pub min_ratings: BTreeMap<String, f64>,
    /// Inclusive creation-date window on the entity's ranking
    /// timestamp.
    pub date_range: Option<DateRange>,
    /// Admit only entities with reservations available.
    pub reservable_only: bool,
    /// Admit only entities known to be open right now. Entities with no
    /// computable open state fail this facet.
    pub open_now_only: bool,
    /// Admit only entities the viewer favourited.
    pub favorites_only: bool,
}

/// True when the facet is unset or shares at least one value with the
/// entity's set. Intersection, not subset.
fn set_facet_fulfilled(selected: &BTreeSet<String>, entity_values: &BTreeSet<String>) -> bool {
    selected.is_empty() || !selected.is_disjoint(entity_values)
}

impl FilterSpec {
    /// Whether any facet is actually selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluates every facet against `entity` and returns the
    /// conjunction.
    ///
    /// Pure and side-effect free; invoked both before a store query
    /// (translated to native match syntax) and after it, to re-apply
    /// facets over denormalised fields the store cannot index.
    #[must_use]
    pub fn passes(&self, entity: &Entity) -> bool {
        let price_fulfilled =
            self.price_levels.is_empty() || self.price_levels.contains(&entity.price_level);
        let cuisine_fulfilled = set_facet_fulfilled(&self.cuisines, &entity.categories);
        let meal_type_fulfilled = set_facet_fulfilled(&self.meal_types, &entity.categories);
        let creator_fulfilled = set_facet_fulfilled(&self.creator_ids, &entity.creator_ids);
        let tag_fulfilled = set_facet_fulfilled(&self.custom_tags, &entity.custom_tags);

        // Publications and awards form one facet: selecting either set
        // admits entities recognised by either.
        let recognised_fulfilled = (self.publications.is_empty() && self.awards.is_empty())
            || !self.publications.is_disjoint(&entity.publications)
            || !self.awards.is_disjoint(&entity.awards);

        let ratings_fulfilled = self.min_ratings.iter().all(|(source, threshold)| {
            *threshold <= 0.0
                || entity.ratings.get(source).copied().unwrap_or(0.0) >= *threshold
        });

        let date_fulfilled = self
            .date_range
            .is_none_or(|range| range.contains(entity.ranking_timestamp()));

        let reservable_fulfilled = !self.reservable_only || entity.reservable;
        // An unknown open state fails the facet: without a UTC offset
        // the claim "open now" cannot be made.
        let open_now_fulfilled = !self.open_now_only || entity.open_now == Some(true);
        let favorites_fulfilled = !self.favorites_only || entity.favorited;

        price_fulfilled
            && cuisine_fulfilled
            && meal_type_fulfilled
            && creator_fulfilled
            && tag_fulfilled
            && recognised_fulfilled
            && ratings_fulfilled
            && date_fulfilled
            && reservable_fulfilled
            && open_now_fulfilled
            && favorites_fulfilled
    }
}
