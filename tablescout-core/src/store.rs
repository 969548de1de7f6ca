//! The document-store seam.
//!
//! The engine never issues raw queries. It emits an ordered list of
//! abstract [`Stage`] descriptors and hands them to an [`EntityStore`]
//! implementation, which translates each stage 1:1 into the store's
//! native aggregation syntax and returns decoded entities or a
//! store-native error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Entity;

/// Direction of one sort key within a store-side sort stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Smallest values first.
    Ascending,
    /// Largest values first.
    Descending,
}

/// One field of a store-side sort stage. Field order is significant:
/// earlier keys are primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    /// Document field path, e.g. `createdAt` or `ratings.google`.
    pub field: String,
    /// Sort direction for this field.
    pub order: SortOrder,
}

impl SortKey {
    /// Convenience constructor.
    #[must_use]
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// One abstract pipeline stage.
///
/// Stage documents are JSON-shaped [`Value`]s; the adapter for a
/// concrete store maps them onto its native operators without
/// reinterpreting their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Full-text or geospatial search. Stores require this to be the
    /// first stage of a pipeline; the builder guarantees it.
    Search(Value),
    /// Facet match document narrowing the candidate set.
    Match(Value),
    /// Store-side ordering over the listed keys.
    Sort(Vec<SortKey>),
    /// Skip the first `n` documents.
    Skip(u64),
    /// Return at most `n` documents.
    Limit(u64),
    /// Field projection; always the final stage when present.
    Project(Value),
}

/// Errors surfaced by a store round-trip.
///
/// The engine neither retries nor swallows these; an unreachable store
/// must remain distinguishable from "no matches".
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the connection.
    #[error("document store unavailable: {reason}")]
    Unavailable {
        /// Driver-reported cause.
        reason: String,
    },
    /// The caller's time budget lapsed before the store answered.
    #[error("document store timed out")]
    Timeout,
    /// The store answered but a document could not be decoded into an
    /// [`Entity`].
    #[error("could not decode store response: {reason}")]
    Decode {
        /// Decoder-reported cause.
        reason: String,
    },
    /// The store rejected the pipeline, e.g. a stage document it cannot
    /// translate.
    #[error("store rejected pipeline: {reason}")]
    RejectedPipeline {
        /// Store-reported cause.
        reason: String,
    },
}

/// Executes abstract pipelines against a document store.
///
/// Implementations must be `Send + Sync`; the engine holds no global
/// state and independent requests may run in parallel. The `timeout` is
/// the caller's remaining budget for the round-trip: implementations
/// must give up and return [`StoreError::Timeout`] rather than block a
/// worker indefinitely. Connection pooling, retries, and backoff are
/// the implementation's or the caller's concern, never the engine's.
pub trait EntityStore: Send + Sync {
    /// Runs `pipeline` and returns the decoded candidate entities.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing the failed round-trip;
    /// errors propagate to the caller unmodified.
    fn run_pipeline(
        &self,
        pipeline: &[Stage],
        timeout: Option<Duration>,
    ) -> Result<Vec<Entity>, StoreError>;
}
