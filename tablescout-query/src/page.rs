//! Pagination clamping and window derivation.

use serde::{Deserialize, Serialize};

/// Largest admitted page size. The store imposes no limit of its own,
/// so a local memory-safety bound is applied here.
pub const MAX_PAGE_SIZE: u64 = 2000;

/// Largest admitted page index.
pub const MAX_PAGE_INDEX: u64 = 100;

/// Page size used when callers do not specify one.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// One page window, recomputed per request and never persisted.
///
/// A size of zero means "no limit", which is only sensible for small
/// collections.
///
/// ```
/// use tablescout_query::PageRequest;
///
/// let page = PageRequest { size: 50, index: 3 }.clamped();
/// assert_eq!(page.skip(), 150);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    /// Maximum documents per page, clamped to `0..=`[`MAX_PAGE_SIZE`].
    pub size: u64,
    /// Zero-based page offset, clamped to `0..=`[`MAX_PAGE_INDEX`].
    pub index: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            index: 0,
        }
    }
}

impl PageRequest {
    /// Returns a copy with both fields forced into their valid ranges.
    /// Out-of-range input is corrected rather than rejected.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            size: self.size.min(MAX_PAGE_SIZE),
            index: self.index.min(MAX_PAGE_INDEX),
        }
    }

    /// Number of documents to skip to reach this page.
    #[must_use]
    pub fn skip(self) -> u64 {
        let clamped = self.clamped();
        clamped.size.saturating_mul(clamped.index)
    }

    /// Whether this request disables the page limit entirely.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        self.size == 0
    }
}
