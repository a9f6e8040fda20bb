//! Cross-wiki search capabilities.
//!
//! A [`CrossSearchStrategy`] tells which kinds of fan-out a search request may
//! perform besides searching the host wiki:
//!
//! - cross-project: sibling projects in the same language
//! - cross-language: the same project in other languages
//! - extra indices: auxiliary indices attached to the host wiki
//!
//! Strategies are combined with [`CrossSearchStrategy::intersect`]. Every
//! strategy returned by an intersection is a `'static` interned value, so the
//! two canonical strategies keep their identity:
//!
//! ```
//! use cirrus_query::CrossSearchStrategy;
//!
//! let all = CrossSearchStrategy::all_wikis();
//! let host = CrossSearchStrategy::host_wiki_only();
//! assert!(std::ptr::eq(all.intersect(host), host));
//! ```

use serde::Serialize;

/// Which cross-wiki searches a request is allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CrossSearchStrategy {
    cross_project: bool,
    cross_language: bool,
    extra_indices: bool,
}

/// Interned strategies, indexed by [`CrossSearchStrategy::index`]
static INTERNED: [CrossSearchStrategy; 8] = [
    CrossSearchStrategy::new(false, false, false),
    CrossSearchStrategy::new(false, false, true),
    CrossSearchStrategy::new(false, true, false),
    CrossSearchStrategy::new(false, true, true),
    CrossSearchStrategy::new(true, false, false),
    CrossSearchStrategy::new(true, false, true),
    CrossSearchStrategy::new(true, true, false),
    CrossSearchStrategy::new(true, true, true),
];

impl CrossSearchStrategy {
    pub const fn new(cross_project: bool, cross_language: bool, extra_indices: bool) -> Self {
        Self {
            cross_project,
            cross_language,
            extra_indices,
        }
    }

    /// No fan-out of any kind: only the host wiki is searched
    pub fn host_wiki_only() -> &'static CrossSearchStrategy {
        &INTERNED[0]
    }

    /// Every kind of fan-out is allowed
    pub fn all_wikis() -> &'static CrossSearchStrategy {
        &INTERNED[7]
    }

    /// Get the interned instance equal to the given combination
    pub fn interned(
        cross_project: bool,
        cross_language: bool,
        extra_indices: bool,
    ) -> &'static CrossSearchStrategy {
        Self::new(cross_project, cross_language, extra_indices).canonical()
    }

    /// Get the interned instance equal to `self`
    pub fn canonical(&self) -> &'static CrossSearchStrategy {
        &INTERNED[self.index()]
    }

    pub fn is_cross_project_search_supported(&self) -> bool {
        self.cross_project
    }

    pub fn is_cross_language_search_supported(&self) -> bool {
        self.cross_language
    }

    pub fn is_extra_indices_search_supported(&self) -> bool {
        self.extra_indices
    }

    /// Field-wise AND of both strategies.
    ///
    /// All-false results are [`Self::host_wiki_only`] and all-true results are
    /// [`Self::all_wikis`], by identity.
    pub fn intersect(&self, other: &CrossSearchStrategy) -> &'static CrossSearchStrategy {
        Self::interned(
            self.cross_project && other.cross_project,
            self.cross_language && other.cross_language,
            self.extra_indices && other.extra_indices,
        )
    }

    fn index(&self) -> usize {
        (usize::from(self.cross_project) << 2)
            | (usize::from(self.cross_language) << 1)
            | usize::from(self.extra_indices)
    }
}
