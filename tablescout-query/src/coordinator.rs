//! Orchestration of one discovery request end to end.
//!
//! The coordinator combines the stage builder, the text clause
//! compiler, and the pagination clamp into one executable pipeline,
//! runs it against an injected [`EntityStore`], re-applies the facets
//! the store cannot index, and ranks the returned page. It holds no
//! global state: independent requests may run in parallel, and the
//! caller's time budget travels with the request.

use std::time::Duration;

use geo::Coord;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use tablescout_core::{
    Entity, EntityStore, FilterSpec, SortKey, SortOrder, Stage, geo::clamp_coordinate, rank,
};

use crate::error::DiscoveryError;
use crate::page::PageRequest;
use crate::stages::{ID_FIELD, PipelinePlan, match_document};
use crate::text::search_stage;

/// Name of the text-search index the compiled search stage targets.
pub const SEARCH_INDEX: &str = "entity-search";

/// Field paths the autocomplete clause fans out over. A match on any
/// one of them is sufficient for relevance.
pub const SEARCH_FIELD_PATHS: [&str; 3] = ["name", "neighborhood", "categories"];

/// A viewer position or map centre in degrees, shaped like the wire
/// format (`{lat, lng}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Converts to a workspace coordinate, clamping out-of-range input.
    #[must_use]
    pub fn coord(self) -> Coord<f64> {
        clamp_coordinate(self.lat, self.lng)
    }
}

/// One discovery request as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    /// Map centre and viewer position.
    pub coordinates: GeoPoint,
    /// Search radius around the centre in kilometres.
    pub radius_km: f64,
    /// Optional text query. A present-but-blank query yields an empty
    /// result set by design.
    #[serde(default)]
    pub search_query: Option<String>,
    /// Facet filters.
    #[serde(default)]
    pub filters: FilterSpec,
    /// Sort key toggles.
    #[serde(default)]
    pub sort: tablescout_core::SortSpec,
    /// Page window.
    #[serde(default)]
    pub page: PageRequest,
    /// Opaque analytics attribution token, echoed back untouched.
    #[serde(default)]
    pub query_id: Option<String>,
    /// Remaining time budget for the store round-trip, propagated from
    /// the caller's request context.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl DiscoveryRequest {
    /// A request centred on `(lat, lng)` with the given radius and
    /// every optional field unset.
    #[must_use]
    pub fn centered(lat: f64, lng: f64, radius_km: f64) -> Self {
        Self {
            coordinates: GeoPoint { lat, lng },
            radius_km,
            search_query: None,
            filters: FilterSpec::default(),
            sort: tablescout_core::SortSpec::default(),
            page: PageRequest::default(),
            query_id: None,
            timeout: None,
        }
    }
}

/// One page of discovery results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    /// The filtered, ranked page.
    pub entities: Vec<Entity>,
    /// Whether another page window follows this one.
    pub page_has_more: bool,
    /// Attribution token from the request, not interpreted here.
    pub query_id: Option<String>,
}

/// Geospatial search document constraining candidates to a radius
/// around the map centre. Emitted when no text query is present, so
/// the first-stage protocol rule covers the geospatial case too.
fn geo_search_document(center: GeoPoint, radius_km: f64) -> Value {
    let clamped = center.coord();
    json!({
        "geoWithin": {
            "center": { "lat": clamped.y, "lng": clamped.x },
            "radiusKm": radius_km.max(0.0),
        }
    })
}

/// Store-side sort keys for a request: recency when enabled, then the
/// entity id so window boundaries stay deterministic under skip/limit.
fn store_sort_keys(sort: tablescout_core::SortSpec) -> Vec<SortKey> {
    let mut keys = Vec::new();
    if sort.newest_first {
        keys.push(SortKey::new("createdAt", SortOrder::Descending));
    }
    keys.push(SortKey::new(ID_FIELD, SortOrder::Ascending));
    keys
}

/// Builds the executable stage list for a request, or `None` when the
/// request carries a blank search query and must short-circuit to an
/// empty result without a store round-trip.
#[must_use]
pub fn plan(request: &DiscoveryRequest) -> Option<Vec<Stage>> {
    let search = match &request.search_query {
        Some(query) => Some(search_stage(SEARCH_INDEX, query, &SEARCH_FIELD_PATHS)?),
        None => Some(geo_search_document(request.coordinates, request.radius_km)),
    };

    let page = request.page.clamped();
    // Fetch one document beyond the window to learn whether another
    // page follows.
    let limit = (!page.is_unlimited()).then(|| page.size.saturating_add(1));

    Some(
        PipelinePlan {
            search,
            match_document: Some(match_document(&request.filters)),
            sort: store_sort_keys(request.sort),
            skip: page.skip(),
            limit,
            ..PipelinePlan::default()
        }
        .build(),
    )
}

/// Runs discovery requests against an injected store.
///
/// The store dependency is explicit; there is no process-wide
/// connection singleton. Connection pooling is the store client's
/// concern.
#[derive(Debug)]
pub struct DiscoveryCoordinator<S> {
    store: S,
}

impl<S: EntityStore> DiscoveryCoordinator<S> {
    /// Creates a coordinator over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Executes one discovery request end to end.
    ///
    /// A blank search query returns an empty successful response
    /// without touching the store. Returned candidates are re-filtered
    /// in memory for the facets the store cannot evaluate, then ranked
    /// with the viewer's position.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`](tablescout_core::StoreError) values
    /// unmodified; the coordinator neither retries nor coerces them
    /// into empty results.
    pub fn execute(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<DiscoveryResponse, DiscoveryError> {
        let Some(pipeline) = plan(request) else {
            log::debug!("blank search query; short-circuiting to an empty result");
            return Ok(DiscoveryResponse {
                entities: Vec::new(),
                page_has_more: false,
                query_id: request.query_id.clone(),
            });
        };

        log::debug!("resolving discovery pipeline with {} stages", pipeline.len());
        let mut candidates = self
            .store
            .run_pipeline(&pipeline, request.timeout)
            .inspect_err(|err| log::warn!("discovery pipeline failed: {err}"))?;

        let page = request.page.clamped();
        let window = usize::try_from(page.size).unwrap_or(usize::MAX);
        let page_has_more = !page.is_unlimited() && candidates.len() > window;
        if page_has_more {
            candidates.truncate(window);
        }

        // Re-apply every facet in memory: denormalised and computed
        // facets were not pushed down, and re-running the pushed ones
        // is a no-op by construction.
        candidates.retain(|entity| request.filters.passes(entity));

        let viewer = Some(request.coordinates.coord());
        let entities = rank(candidates, &request.sort, viewer);

        Ok(DiscoveryResponse {
            entities,
            page_has_more,
            query_id: request.query_id.clone(),
        })
    }
}
