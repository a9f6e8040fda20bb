//! Immutable, fully resolved search requests.

use crate::config::{ProfileType, SearchConfig};
use crate::namespace::Namespace;
use crate::parser::ParsedQuery;
use crate::search::debug::DebugOptions;
use crate::search::filters::{ContextualFilter, ContextualFilters};
use crate::strategy::CrossSearchStrategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entry point of regular full-text searches
pub const SEARCH_TEXT: &str = "searchText";

/// A fully resolved search request.
///
/// Built with [`SearchQueryBuilder`](super::SearchQueryBuilder); the resolved
/// namespaces and cross-search strategy are computed once at build time
/// while the `initial_*` values keep what the caller asked for.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub(crate) parsed_query: Arc<ParsedQuery>,
    pub(crate) initial_namespaces: Vec<Namespace>,
    pub(crate) namespaces: Vec<Namespace>,
    pub(crate) initial_cross_search_strategy: &'static CrossSearchStrategy,
    pub(crate) cross_search_strategy: &'static CrossSearchStrategy,
    pub(crate) contextual_filters: ContextualFilters,
    pub(crate) search_engine_entry_point: String,
    pub(crate) sort: String,
    pub(crate) forced_profiles: BTreeMap<ProfileType, String>,
    pub(crate) profile_context_parameters: BTreeMap<String, String>,
    pub(crate) offset: usize,
    pub(crate) limit: usize,
    pub(crate) debug_options: DebugOptions,
    pub(crate) search_config: Arc<SearchConfig>,
    pub(crate) with_dym_suggestion: bool,
    pub(crate) allow_rewrite: bool,
}

impl SearchQuery {
    pub fn parsed_query(&self) -> &ParsedQuery {
        &self.parsed_query
    }

    /// Namespaces requested by the caller, empty for all
    pub fn initial_namespaces(&self) -> &[Namespace] {
        &self.initial_namespaces
    }

    /// Namespaces to search, empty for all
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Strategy requested by the caller
    pub fn initial_cross_search_strategy(&self) -> &'static CrossSearchStrategy {
        self.initial_cross_search_strategy
    }

    /// Strategy allowed once config, syntax and filters are accounted for
    pub fn cross_search_strategy(&self) -> &'static CrossSearchStrategy {
        self.cross_search_strategy
    }

    pub fn contextual_filters(&self) -> &ContextualFilters {
        &self.contextual_filters
    }

    pub fn contextual_filter(&self, name: &str) -> Option<&Arc<dyn ContextualFilter>> {
        self.contextual_filters.get(name)
    }

    pub fn search_engine_entry_point(&self) -> &str {
        &self.search_engine_entry_point
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn forced_profiles(&self) -> &BTreeMap<ProfileType, String> {
        &self.forced_profiles
    }

    pub fn forced_profile(&self, profile_type: ProfileType) -> Option<&str> {
        self.forced_profiles.get(&profile_type).map(String::as_str)
    }

    pub fn profile_context_parameters(&self) -> &BTreeMap<String, String> {
        &self.profile_context_parameters
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn debug_options(&self) -> &DebugOptions {
        &self.debug_options
    }

    pub fn search_config(&self) -> &Arc<SearchConfig> {
        &self.search_config
    }

    pub fn is_with_dym_suggestion(&self) -> bool {
        self.with_dym_suggestion
    }

    pub fn is_allow_rewrite(&self) -> bool {
        self.allow_rewrite
    }

    /// Serializable summary of the request
    pub fn explain(&self) -> QueryExplanation<'_> {
        QueryExplanation {
            wiki: self.search_config.wiki_id(),
            raw_query: self.parsed_query.raw_query(),
            query: self.parsed_query.query(),
            initial_namespaces: &self.initial_namespaces,
            namespaces: &self.namespaces,
            initial_cross_search_strategy: self.initial_cross_search_strategy,
            cross_search_strategy: self.cross_search_strategy,
            contextual_filters: self.contextual_filters.names().collect(),
            forced_profiles: &self.forced_profiles,
            profile_context_parameters: &self.profile_context_parameters,
            search_engine_entry_point: &self.search_engine_entry_point,
            sort: &self.sort,
            offset: self.offset,
            limit: self.limit,
            with_dym_suggestion: self.with_dym_suggestion,
            allow_rewrite: self.allow_rewrite,
            debug_options: &self.debug_options,
            parsed_query: &self.parsed_query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryExplanation<'a> {
    pub wiki: &'a str,
    pub raw_query: &'a str,
    pub query: &'a str,
    pub initial_namespaces: &'a [Namespace],
    pub namespaces: &'a [Namespace],
    pub initial_cross_search_strategy: &'a CrossSearchStrategy,
    pub cross_search_strategy: &'a CrossSearchStrategy,
    pub contextual_filters: Vec<&'a str>,
    pub forced_profiles: &'a BTreeMap<ProfileType, String>,
    pub profile_context_parameters: &'a BTreeMap<String, String>,
    pub search_engine_entry_point: &'a str,
    pub sort: &'a str,
    pub offset: usize,
    pub limit: usize,
    pub with_dym_suggestion: bool,
    pub allow_rewrite: bool,
    pub debug_options: &'a DebugOptions,
    pub parsed_query: &'a ParsedQuery,
}
