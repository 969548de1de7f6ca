//! Helpers for building fixture entities in tests and benchmarks.
//!
//! Enabled via the `test-support` feature so production builds do not
//! carry fixture code.

use chrono::DateTime;

use crate::{Entity, EntityKind};

/// A restaurant at the given position with a deterministic creation
/// time derived from `seq`.
///
/// # Panics
///
/// Never panics for reasonable `seq` values; the timestamp offset is
/// seconds from the Unix epoch.
#[must_use]
pub fn restaurant(id: &str, lat: f64, lng: f64, seq: u32) -> Entity {
    let mut entity = Entity::new(id, EntityKind::Restaurant).at(lat, lng);
    entity.name = format!("Restaurant {id}");
    entity.created_at =
        DateTime::from_timestamp(i64::from(seq), 0).unwrap_or(DateTime::UNIX_EPOCH);
    entity
}

/// A post entity with no location, favourited when `favorited` is set.
#[must_use]
pub fn post(id: &str, favorited: bool) -> Entity {
    let mut entity = Entity::new(id, EntityKind::Post);
    entity.name = format!("Post {id}");
    entity.favorited = favorited;
    entity
}
