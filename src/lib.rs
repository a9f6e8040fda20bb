//! # cirrus-query - Search query model for wiki full-text search
//!
//! Decides, for every search request, *what* is searched (namespaces),
//! *where* it may be searched (the host wiki only, or also sister projects,
//! other languages and extra indices) and how much of the caller's intent
//! survives when a query is derived for a secondary search.
//!
//! ## Architecture
//!
//! - [`strategy`] - cross-wiki capabilities and their intersection
//! - [`parser`] - full-text query parser producing a [`ParsedQuery`]
//! - [`config`] - per-wiki configuration and named profiles
//! - [`namespace`] - namespace ids and namespace prefix parsing
//! - [`search`] - query builder, resolved queries and search contexts
//! - [`utils`] - application data directory
//!
//! ## Quick Start
//!
//! ```
//! use cirrus_query::{DefaultNamespacePrefixParser, SearchConfig, SearchQueryBuilder};
//! use std::sync::Arc;
//!
//! let config = Arc::new(SearchConfig {
//!     enable_cross_project_search: true,
//!     ..SearchConfig::default()
//! });
//! let ns_parser = DefaultNamespacePrefixParser::new();
//!
//! let query = SearchQueryBuilder::new_ft_search_query_builder(config, "local:foo", &ns_parser)?
//!     .build();
//!
//! // `local:` keeps the search on the host wiki
//! assert!(!query.cross_search_strategy().is_cross_project_search_supported());
//! # Ok::<(), cirrus_query::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod namespace;
pub mod parser;
pub mod search;
pub mod strategy;
pub mod utils;

pub use config::{ProfileService, ProfileType, SearchConfig};
pub use error::{Error, Result};
pub use namespace::{DefaultNamespacePrefixParser, Namespace, NamespacePrefixParser};
pub use parser::{ParsedQuery, QueryStringParser};
pub use search::{SearchContext, SearchQuery, SearchQueryBuilder};
pub use strategy::CrossSearchStrategy;
