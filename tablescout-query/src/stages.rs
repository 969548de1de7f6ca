//! Assembly of ordered pipeline stage lists.
//!
//! The builder owns the protocol ordering rules: a search stage must
//! come first, matching happens before joins and expansions, sorting
//! happens after the candidate set has shrunk, and projections go
//! last. Callers describe what they want in a [`PipelinePlan`] and get
//! back a stage list that is valid by construction.

use serde_json::{Value, json};

use tablescout_core::{FilterSpec, SortKey, SortOrder, Stage};

/// Field used to break sort ties deterministically. Stores do not
/// guarantee stable order otherwise, and unstable order under
/// skip/limit silently duplicates or drops results across pages.
pub const ID_FIELD: &str = "id";

/// Declarative description of one pipeline, turned into an ordered
/// stage list by [`PipelinePlan::build`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelinePlan {
    /// Full-text or geospatial search document; always emitted as the
    /// first stage when present.
    pub search: Option<Value>,
    /// Facet match document; [`match_document`] translates a
    /// [`FilterSpec`] into one.
    pub match_document: Option<Value>,
    /// Caller-supplied stages spliced around the match stage.
    pub extra_stages: Vec<Stage>,
    /// Splice the extra stages ahead of the match stage. Needed when an
    /// extra stage must itself precede matching, e.g. a
    /// provider-specific ranking stage. Ignored when a search stage is
    /// present, since that must occupy the first slot.
    pub extra_stages_first: bool,
    /// Store-side sort keys, in priority order.
    pub sort: Vec<SortKey>,
    /// Documents to skip ahead of the page window.
    pub skip: u64,
    /// Page limit; `None` or zero emits no limit stage.
    pub limit: Option<u64>,
    /// Field projection, always placed last.
    pub projection: Option<Value>,
}

impl PipelinePlan {
    /// Assembles the ordered stage list.
    ///
    /// Ordering invariants, in sequence: search first when present,
    /// otherwise match first (extra stages may be spliced ahead of it);
    /// sort after all filtering, with an ascending [`ID_FIELD`]
    /// tie-break prepended whenever the sort follows a search stage;
    /// skip, then limit when positive; projection last.
    #[must_use]
    pub fn build(self) -> Vec<Stage> {
        let mut stages = Vec::new();
        let searched = self.search.is_some();
        let match_document = self.match_document.unwrap_or_else(|| json!({}));

        if let Some(search) = self.search {
            stages.push(Stage::Search(search));
            // Narrow the searched candidates before any extra stages.
            stages.push(Stage::Match(match_document));
            stages.extend(self.extra_stages);
        } else if self.extra_stages_first {
            stages.extend(self.extra_stages);
            stages.push(Stage::Match(match_document));
        } else {
            // Match first to reduce the workload of any joins or
            // large-scope computations in the extra stages.
            stages.push(Stage::Match(match_document));
            stages.extend(self.extra_stages);
        }

        if !self.sort.is_empty() {
            let mut keys = self.sort;
            if searched && !keys.iter().any(|key| key.field == ID_FIELD) {
                keys.insert(0, SortKey::new(ID_FIELD, SortOrder::Ascending));
            }
            stages.push(Stage::Sort(keys));
        }

        stages.push(Stage::Skip(self.skip));
        if let Some(limit) = self.limit {
            if limit > 0 {
                stages.push(Stage::Limit(limit));
            }
        }
        if let Some(projection) = self.projection {
            stages.push(Stage::Project(projection));
        }
        stages
    }
}

/// Translates the store-indexable facets of a [`FilterSpec`] into a
/// native match document.
///
/// This is a translation of [`FilterSpec::passes`], not a second
/// implementation: every clause mirrors one facet's semantics exactly,
/// so the pushed-down and in-memory paths agree on any entity both can
/// evaluate. Facets over denormalised edges (creators, publications,
/// awards) or computed state (open-now, the date fallback to the
/// source creation time) stay client-side and are re-applied after the
/// round-trip.
#[must_use]
pub fn match_document(filters: &FilterSpec) -> Value {
    let mut clauses: Vec<Value> = Vec::new();

    if !filters.price_levels.is_empty() {
        let levels: Vec<u64> = filters.price_levels.iter().map(|l| u64::from(*l)).collect();
        clauses.push(json!({ "priceLevel": { "$in": levels } }));
    }
    if !filters.cuisines.is_empty() {
        clauses.push(json!({ "categories": { "$in": filters.cuisines } }));
    }
    if !filters.meal_types.is_empty() {
        clauses.push(json!({ "categories": { "$in": filters.meal_types } }));
    }
    if !filters.custom_tags.is_empty() {
        clauses.push(json!({ "customTags": { "$in": filters.custom_tags } }));
    }
    for (source, threshold) in &filters.min_ratings {
        if *threshold > 0.0 {
            let mut clause = serde_json::Map::new();
            clause.insert(format!("ratings.{source}"), json!({ "$gte": threshold }));
            clauses.push(Value::Object(clause));
        }
    }
    if filters.reservable_only {
        clauses.push(json!({ "reservable": true }));
    }
    if filters.favorites_only {
        clauses.push(json!({ "favorited": true }));
    }

    match clauses.len() {
        0 => json!({}),
        1 => clauses.pop().unwrap_or_else(|| json!({})),
        _ => json!({ "$and": clauses }),
    }
}
