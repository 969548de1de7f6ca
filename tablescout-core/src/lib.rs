//! Core domain types and pure algorithms for the Tablescout discovery
//! ranking engine.
//!
//! This crate holds everything that is stateless and side-effect free:
//! the [`Entity`] model, the multi-facet [`FilterSpec`] predicate
//! evaluator, the cascading multi-key sort in [`rank`], the spherical
//! geometry in [`geo`], and the [`EntityStore`] seam the query layer
//! drives. Constructors validate or clamp their input so downstream
//! components stay honest.

#![forbid(unsafe_code)]

pub mod entity;
pub mod filter;
pub mod geo;
pub mod sort;
pub mod store;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use entity::{Entity, EntityKind, MAX_PRICE_LEVEL};
pub use filter::{DateRange, FilterSpec};
pub use geo::{GeoCluster, GeoError};
pub use sort::{SortSpec, rank, sanitise_score};
pub use store::{EntityStore, SortKey, SortOrder, Stage, StoreError};
