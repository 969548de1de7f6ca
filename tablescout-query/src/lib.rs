//! Query planning and execution for the discovery engine.
//!
//! This crate turns a [`DiscoveryRequest`] into an ordered store
//! pipeline and runs it end to end:
//!
//! - [`stages`] assembles stage lists that honour the store protocol's
//!   ordering rules,
//! - [`text`] compiles free-text queries into compound autocomplete
//!   clauses,
//! - [`page`] clamps page windows to safe bounds,
//! - [`DiscoveryCoordinator`] orchestrates the round-trip against an
//!   injected [`EntityStore`](tablescout_core::EntityStore), then
//!   re-filters and ranks the returned candidates.
//!
//! The `store-memory` feature (enabled by default) provides
//! [`MemoryStore`], an in-process interpreter of the emitted stage
//! vocabulary used by tests and the command-line tool.

#![forbid(unsafe_code)]

pub mod coordinator;
pub mod error;
#[cfg(feature = "store-memory")]
pub mod memory;
pub mod page;
pub mod stages;
pub mod text;

pub use coordinator::{
    DiscoveryCoordinator, DiscoveryRequest, DiscoveryResponse, GeoPoint, SEARCH_FIELD_PATHS,
    SEARCH_INDEX, plan,
};
pub use error::DiscoveryError;
#[cfg(feature = "store-memory")]
pub use memory::MemoryStore;
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_INDEX, MAX_PAGE_SIZE, PageRequest};
pub use stages::{ID_FIELD, PipelinePlan, match_document};
