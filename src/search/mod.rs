//! Search query model.
//!
//! - [`builder`] - builds queries and derives cross-wiki and rewritten ones
//! - [`query`] - the immutable, resolved [`SearchQuery`]
//! - [`context`] - mutable per-request state derived from a query
//! - [`filters`] - contextual filters and the filter queries they produce
//! - [`fallback`] - fallback methods selected by profile
//! - [`debug`] - debugging flags

pub mod builder;
pub mod context;
pub mod debug;
pub mod fallback;
pub mod filters;
pub mod query;

pub use builder::{DEFAULT_LIMIT, DEFAULT_OFFSET, DEFAULT_SORT, SearchQueryBuilder};
pub use context::{FULL_TEXT, SearchContext, SearchWarning};
pub use debug::DebugOptions;
pub use fallback::{FallbackKind, FallbackMethod, FallbackRunner};
pub use filters::{ContextualFilter, ContextualFilters, FilterBuilder, FilterQuery, PrefixFilter};
pub use query::{QueryExplanation, SEARCH_TEXT, SearchQuery};
