//! Facade crate for the discovery ranking engine.
//!
//! This crate re-exports the core domain types and the query
//! coordinator, and exposes the in-memory store behind a feature flag.

#![forbid(unsafe_code)]

pub use tablescout_core::geo;
pub use tablescout_core::{
    DateRange, Entity, EntityKind, EntityStore, FilterSpec, GeoCluster, GeoError, MAX_PRICE_LEVEL,
    SortKey, SortOrder, SortSpec, Stage, StoreError, rank,
};

pub use tablescout_query::{
    DiscoveryCoordinator, DiscoveryError, DiscoveryRequest, DiscoveryResponse, GeoPoint,
    PageRequest, PipelinePlan,
};

#[cfg(feature = "store-memory")]
pub use tablescout_query::MemoryStore;
