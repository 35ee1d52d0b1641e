//! Index paths for addressing items in sectioned models.
//!
//! An `IndexPath` is a `(section, item)` pair. Paths are only meaningful
//! relative to one model instance: after a transition the same path may name a
//! different item.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The position of an item within a [`DataModel`](super::DataModel).
///
/// Paths order by section first, then by item, matching the order in which
/// the container lays items out.
///
/// # Example
///
/// ```
/// use cellobject::model::IndexPath;
///
/// let path = IndexPath::new(1, 4);
/// assert_eq!(path.section(), 1);
/// assert_eq!(path.item(), 4);
/// assert!(IndexPath::new(0, 9) < path);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPath {
    section: usize,
    item: usize,
}

impl IndexPath {
    /// Creates a path for `item` within `section`.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Returns the section index.
    #[inline]
    pub const fn section(&self) -> usize {
        self.section
    }

    /// Returns the item index within the section.
    #[inline]
    pub const fn item(&self) -> usize {
        self.item
    }

    /// Returns a path in the same section at a different item.
    #[inline]
    pub const fn with_item(&self, item: usize) -> Self {
        Self::new(self.section, item)
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexPath({}, {})", self.section, self.item)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}
