//! Error types raised while coordinating discovery requests.

use thiserror::Error;

use tablescout_core::StoreError;

/// Errors surfaced by [`DiscoveryCoordinator::execute`].
///
/// Store failures pass through unmodified so callers can distinguish an
/// unreachable store from an empty result set.
///
/// [`DiscoveryCoordinator::execute`]: crate::DiscoveryCoordinator::execute
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The document store round-trip failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
