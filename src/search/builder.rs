//! Building, and deriving, search queries.
//!
//! A [`SearchQueryBuilder`] accumulates the caller's intent and resolves it in
//! [`SearchQueryBuilder::build`]:
//!
//! - namespaces: the initial namespaces, the namespace header and required
//!   namespaces of the parsed query and the needs of every contextual filter
//! - cross-search strategy: what the caller asked for, narrowed by the wiki
//!   config, by the query syntax and by the contextual filters
//!
//! Queries built for sister wikis ([`SearchQueryBuilder::for_cross_project_search`],
//! [`SearchQueryBuilder::for_cross_language_search`]) and rewritten queries
//! ([`SearchQueryBuilder::for_rewritten_query`]) are derived from a built
//! query and cannot be derived again.

use crate::config::{ProfileType, SearchConfig};
use crate::error::{Error, Result};
use crate::namespace::{Namespace, NamespacePrefixParser, PrefixNamespace, NS_MAIN, is_core_namespace};
use crate::parser::{ParsedQuery, QueryStringParser, RequiredNamespaces};
use crate::search::debug::DebugOptions;
use crate::search::filters::{ContextualFilter, ContextualFilters};
use crate::search::query::{SearchQuery, SEARCH_TEXT};
use crate::strategy::CrossSearchStrategy;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Number of results per page
pub const DEFAULT_LIMIT: usize = 10;

pub const DEFAULT_OFFSET: usize = 0;

pub const DEFAULT_SORT: &str = "relevance";

/// Accumulates the parameters of a [`SearchQuery`]
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    search_config: Arc<SearchConfig>,
    parsed_query: Arc<ParsedQuery>,
    initial_namespaces: Vec<Namespace>,
    cross_project_search: bool,
    cross_language_search: bool,
    extra_indices_search: bool,
    contextual_filters: ContextualFilters,
    search_engine_entry_point: String,
    sort: String,
    forced_profiles: BTreeMap<ProfileType, String>,
    profile_context_parameters: BTreeMap<String, String>,
    offset: usize,
    limit: usize,
    debug_options: DebugOptions,
    with_dym_suggestion: bool,
    allow_rewrite: bool,
}

impl SearchQueryBuilder {
    fn with_parsed_query(search_config: Arc<SearchConfig>, parsed_query: Arc<ParsedQuery>) -> Self {
        Self {
            search_config,
            parsed_query,
            initial_namespaces: vec![NS_MAIN],
            cross_project_search: true,
            cross_language_search: true,
            extra_indices_search: true,
            contextual_filters: ContextualFilters::new(),
            search_engine_entry_point: SEARCH_TEXT.to_string(),
            sort: DEFAULT_SORT.to_string(),
            forced_profiles: BTreeMap::new(),
            profile_context_parameters: BTreeMap::new(),
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            debug_options: DebugOptions::default_options(),
            with_dym_suggestion: true,
            allow_rewrite: false,
        }
    }

    /// Start a full-text search for a user query
    pub fn new_ft_search_query_builder(
        config: Arc<SearchConfig>,
        raw_query: &str,
        namespace_prefix_parser: &dyn NamespacePrefixParser,
    ) -> Result<Self> {
        let parser = QueryStringParser::new(&config, namespace_prefix_parser)?;
        let parsed_query = parser.parse(raw_query)?;
        Ok(Self::with_parsed_query(config, Arc::new(parsed_query)))
    }

    /// Derive a query to run on a sister project in the same language.
    ///
    /// The derived query starts on the first page, its size comes from the
    /// source config's number of cross-project results.
    pub fn for_cross_project_search(target_config: Arc<SearchConfig>, source: &SearchQuery) -> Result<Self> {
        if !source.cross_search_strategy().is_cross_project_search_supported() {
            return Err(Error::invalid_argument(
                "Trying to build a query for a cross-project search but the original query does not support such searches",
            ));
        }

        let mut builder = Self::copy_for_cross_search(target_config, source)?;
        builder.offset = 0;
        builder.limit = source
            .search_config()
            .num_cross_project_search_results()
            .unwrap_or(DEFAULT_LIMIT);
        Ok(builder)
    }

    /// Derive a query to run on the same project in another language
    pub fn for_cross_language_search(target_config: Arc<SearchConfig>, source: &SearchQuery) -> Result<Self> {
        if !source.cross_search_strategy().is_cross_language_search_supported() {
            return Err(Error::invalid_argument(
                "Trying to build a query for a cross-language search but the original query does not support such searches",
            ));
        }

        let mut builder = Self::copy_for_cross_search(target_config, source)?;
        builder.offset = source.offset();
        builder.limit = source.limit();
        Ok(builder)
    }

    fn copy_for_cross_search(target_config: Arc<SearchConfig>, source: &SearchQuery) -> Result<Self> {
        if target_config.is_local_wiki() {
            return Err(Error::invalid_argument(
                "target config must not be the local wiki config",
            ));
        }

        let mut builder = Self::with_parsed_query(Arc::clone(&target_config), Arc::clone(&source.parsed_query));

        // Only core namespaces are known to exist on every wiki
        builder.initial_namespaces = source
            .initial_namespaces()
            .iter()
            .copied()
            .filter(|ns| is_core_namespace(*ns))
            .collect();

        let profiles = target_config.profile_service();
        for (profile_type, name) in source.forced_profiles() {
            if profiles.has_profile(*profile_type, name) {
                builder.forced_profiles.insert(*profile_type, name.clone());
            } else {
                tracing::debug!(
                    wiki = target_config.wiki_id(),
                    profile_type = %profile_type,
                    "Dropping forced profile {} missing on target wiki",
                    name
                );
            }
        }

        builder.search_engine_entry_point = source.search_engine_entry_point().to_string();
        builder.sort = source.sort().to_string();
        builder.debug_options = source.debug_options().clone();
        builder.profile_context_parameters = source.profile_context_parameters().clone();
        builder.cross_project_search = false;
        builder.cross_language_search = false;
        builder.extra_indices_search = false;
        builder.with_dym_suggestion = false;
        builder.allow_rewrite = false;
        Ok(builder)
    }

    /// Derive a query searching for `new_raw_query` instead, e.g. a spelling
    /// suggestion.
    ///
    /// The new query is parsed without question mark stripping, it was
    /// already applied to the source query.
    pub fn for_rewritten_query(
        source: &SearchQuery,
        new_raw_query: &str,
        namespace_prefix_parser: &dyn NamespacePrefixParser,
    ) -> Result<Self> {
        if !source.is_allow_rewrite() {
            return Err(Error::invalid_argument("The original query must allow rewrites"));
        }

        let config = source.search_config().without_question_mark_stripping();
        let mut builder = Self::new_ft_search_query_builder(config, new_raw_query, namespace_prefix_parser)?;

        builder.contextual_filters = source.contextual_filters().clone();
        builder.forced_profiles = source.forced_profiles().clone();
        builder.profile_context_parameters = source.profile_context_parameters().clone();
        builder.initial_namespaces = source.initial_namespaces().to_vec();
        builder.search_engine_entry_point = source.search_engine_entry_point().to_string();
        builder.sort = source.sort().to_string();
        builder.debug_options = source.debug_options().clone();
        builder.limit = source.limit();
        builder.offset = source.offset();
        builder.cross_project_search = false;
        builder.cross_language_search = false;
        builder.extra_indices_search = source
            .initial_cross_search_strategy()
            .is_extra_indices_search_supported();
        builder.with_dym_suggestion = false;
        builder.allow_rewrite = false;
        Ok(builder)
    }

    /// Freeze the builder into a query
    pub fn build(&self) -> SearchQuery {
        let namespaces = self.resolve_namespaces();
        let initial_cross_search_strategy = CrossSearchStrategy::interned(
            self.cross_project_search,
            self.cross_language_search,
            self.extra_indices_search,
        );
        let cross_search_strategy = self.resolve_cross_search_strategy(initial_cross_search_strategy);

        tracing::debug!(
            wiki = self.search_config.wiki_id(),
            initial = ?initial_cross_search_strategy,
            resolved = ?cross_search_strategy,
            namespaces = ?namespaces,
            "Built search query"
        );

        SearchQuery {
            parsed_query: Arc::clone(&self.parsed_query),
            initial_namespaces: self.initial_namespaces.clone(),
            namespaces,
            initial_cross_search_strategy,
            cross_search_strategy,
            contextual_filters: self.contextual_filters.clone(),
            search_engine_entry_point: self.search_engine_entry_point.clone(),
            sort: self.sort.clone(),
            forced_profiles: self.forced_profiles.clone(),
            profile_context_parameters: self.profile_context_parameters.clone(),
            offset: self.offset,
            limit: self.limit,
            debug_options: self.debug_options.clone(),
            search_config: Arc::clone(&self.search_config),
            with_dym_suggestion: self.with_dym_suggestion,
            allow_rewrite: self.allow_rewrite,
        }
    }

    /// Namespaces to search, empty when every namespace is
    fn resolve_namespaces(&self) -> Vec<Namespace> {
        let required = match self.parsed_query.required_namespaces() {
            RequiredNamespaces::All => return Vec::new(),
            RequiredNamespaces::List(namespaces) => namespaces,
        };

        let mut from_filters = Vec::new();
        for filter in self.contextual_filters.filters() {
            match filter.required_namespaces() {
                Some(namespaces) if namespaces.is_empty() => return Vec::new(),
                Some(namespaces) => from_filters.extend(namespaces),
                None => {}
            }
        }

        let base = match self.parsed_query.namespace_header() {
            Some(PrefixNamespace::All) => return Vec::new(),
            Some(PrefixNamespace::Namespace(ns)) => vec![ns],
            None if self.initial_namespaces.is_empty() => return Vec::new(),
            None => self.initial_namespaces.clone(),
        };

        let mut namespaces: Vec<Namespace> = Vec::with_capacity(base.len() + required.len() + from_filters.len());
        for ns in base.into_iter().chain(required.iter().copied()).chain(from_filters) {
            if !namespaces.contains(&ns) {
                namespaces.push(ns);
            }
        }
        namespaces
    }

    fn resolve_cross_search_strategy(
        &self,
        initial: &'static CrossSearchStrategy,
    ) -> &'static CrossSearchStrategy {
        // Extra indices are not a config toggle
        let from_config = CrossSearchStrategy::interned(
            self.search_config.is_cross_project_search_enabled(),
            self.search_config.is_cross_language_search_enabled(),
            true,
        );

        let mut strategy = initial
            .intersect(from_config)
            .intersect(self.parsed_query.cross_search_strategy());

        for filter in self.contextual_filters.filters() {
            if filter.restricts_cross_search() {
                strategy = strategy.intersect(CrossSearchStrategy::host_wiki_only());
            }
        }
        strategy
    }

    /// Namespaces to search, empty for all
    pub fn set_initial_namespaces(&mut self, namespaces: Vec<Namespace>) -> &mut Self {
        self.initial_namespaces = namespaces;
        self
    }

    /// Attach a named contextual filter, names must be unique
    pub fn add_contextual_filter(&mut self, name: &str, filter: Arc<dyn ContextualFilter>) -> Result<&mut Self> {
        self.contextual_filters.insert(name, filter)?;
        Ok(self)
    }

    pub fn set_cross_project_search(&mut self, enabled: bool) -> &mut Self {
        self.cross_project_search = enabled;
        self
    }

    pub fn set_cross_language_search(&mut self, enabled: bool) -> &mut Self {
        self.cross_language_search = enabled;
        self
    }

    pub fn set_extra_indices_search(&mut self, enabled: bool) -> &mut Self {
        self.extra_indices_search = enabled;
        self
    }

    /// Force a profile instead of letting the profile service choose
    pub fn add_forced_profile(&mut self, profile_type: ProfileType, name: &str) -> &mut Self {
        self.forced_profiles.insert(profile_type, name.to_string());
        self
    }

    pub fn add_profile_context_parameter(&mut self, key: &str, value: &str) -> &mut Self {
        self.profile_context_parameters
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_offset(&mut self, offset: usize) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn set_sort(&mut self, sort: &str) -> &mut Self {
        self.sort = sort.to_string();
        self
    }

    pub fn set_debug_options(&mut self, debug_options: DebugOptions) -> &mut Self {
        self.debug_options = debug_options;
        self
    }

    pub fn set_with_dym_suggestion(&mut self, enabled: bool) -> &mut Self {
        self.with_dym_suggestion = enabled;
        self
    }

    pub fn set_allow_rewrite(&mut self, allowed: bool) -> &mut Self {
        self.allow_rewrite = allowed;
        self
    }

    pub fn set_search_engine_entry_point(&mut self, entry_point: &str) -> &mut Self {
        self.search_engine_entry_point = entry_point.to_string();
        self
    }

    pub fn parsed_query(&self) -> &ParsedQuery {
        &self.parsed_query
    }

    pub fn search_config(&self) -> &Arc<SearchConfig> {
        &self.search_config
    }
}
