//! Per-request search state.

use crate::config::{ProfileType, SearchConfig, CONTEXT_DEFAULT};
use crate::error::Result;
use crate::namespace::Namespace;
use crate::parser::QueryClass;
use crate::search::debug::DebugOptions;
use crate::search::fallback::FallbackRunner;
use crate::search::filters::{FilterBuilder, FilterQuery};
use crate::search::query::SearchQuery;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Search type reported when no syntax was recorded
pub const FULL_TEXT: &str = "full_text";

/// Syntax names that are not special keywords
const NON_SPECIAL_SYNTAX: [&str; 6] = [
    FULL_TEXT,
    "full_text_simple_match",
    "full_text_querystring",
    "simple_bag_of_words",
    "simple_phrase",
    "bag_of_words_with_phrase",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct SyntaxEntry {
    name: String,
    weight: u32,
    /// Order of the last add, later adds win weight ties
    seq: u64,
}

/// A user facing warning, a message key and its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchWarning {
    pub message: String,
    pub params: Vec<String>,
}

/// Mutable state of a search request while it is turned into a backend query
#[derive(Debug)]
pub struct SearchContext {
    config: Arc<SearchConfig>,
    namespaces: Vec<Namespace>,
    debug_options: DebugOptions,
    fallback_runner: Arc<FallbackRunner>,
    limit_search_to_local_wiki: bool,
    filters: Vec<FilterQuery>,
    not_filters: Vec<FilterQuery>,
    rescore_profile: Option<String>,
    fulltext_query_builder_profile: Option<String>,
    profile_context: String,
    profile_context_params: BTreeMap<String, String>,
    original_search_term: String,
    cleaned_search_term: Option<String>,
    syntax_used: Vec<SyntaxEntry>,
    next_seq: u64,
    warnings: Vec<SearchWarning>,
    results_possible: bool,
    cache_ttl: u64,
    dirty: bool,
}

impl SearchContext {
    pub fn new(
        config: Arc<SearchConfig>,
        namespaces: Vec<Namespace>,
        debug_options: Option<DebugOptions>,
        fallback_runner: Option<Arc<FallbackRunner>>,
    ) -> Self {
        Self {
            config,
            namespaces,
            debug_options: debug_options.unwrap_or_default(),
            fallback_runner: fallback_runner.unwrap_or_else(FallbackRunner::noop_runner),
            limit_search_to_local_wiki: false,
            filters: Vec::new(),
            not_filters: Vec::new(),
            rescore_profile: None,
            fulltext_query_builder_profile: None,
            profile_context: CONTEXT_DEFAULT.to_string(),
            profile_context_params: BTreeMap::new(),
            original_search_term: String::new(),
            cleaned_search_term: None,
            syntax_used: Vec::new(),
            next_seq: 0,
            warnings: Vec::new(),
            results_possible: true,
            cache_ttl: 0,
            dirty: false,
        }
    }

    /// Build the context of a search query.
    ///
    /// Fails when the profile service has no default rescore or full-text
    /// query builder profile and none is forced by the query.
    pub fn from_search_query(query: &SearchQuery, fallback_runner: Option<Arc<FallbackRunner>>) -> Result<Self> {
        let mut context = Self::new(
            Arc::clone(query.search_config()),
            query.namespaces().to_vec(),
            Some(query.debug_options().clone()),
            fallback_runner,
        );
        context.limit_search_to_local_wiki = !query.cross_search_strategy().is_extra_indices_search_supported();
        context.profile_context_params = query.profile_context_parameters().clone();

        let profiles = context.config.profile_service();
        let rescore = match query.forced_profile(ProfileType::Rescore) {
            Some(name) => name.to_string(),
            None => profiles.get_profile_name(ProfileType::Rescore, &context.profile_context, &context.profile_context_params)?,
        };
        let fulltext = match query.forced_profile(ProfileType::FtQueryBuilder) {
            Some(name) => name.to_string(),
            None => profiles.get_profile_name(
                ProfileType::FtQueryBuilder,
                &context.profile_context,
                &context.profile_context_params,
            )?,
        };
        context.rescore_profile = Some(rescore);
        context.fulltext_query_builder_profile = Some(fulltext);

        let parsed = query.parsed_query();
        for class in QueryClass::ALL {
            if parsed.is_query_of_class(class) {
                context.record_syntax(class.as_str(), 1);
            }
        }

        for filter in query.contextual_filters().filters() {
            filter.populate(&mut context);
        }

        context.original_search_term = parsed.raw_query().to_string();
        Ok(context)
    }

    pub fn config(&self) -> &Arc<SearchConfig> {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Namespaces to search, empty for all
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn set_namespaces(&mut self, namespaces: Vec<Namespace>) {
        self.dirty = true;
        self.namespaces = namespaces;
    }

    pub fn profile_context(&self) -> &str {
        &self.profile_context
    }

    pub fn profile_context_params(&self) -> &BTreeMap<String, String> {
        &self.profile_context_params
    }

    pub fn set_profile_context(&mut self, context: &str, params: BTreeMap<String, String>) {
        self.dirty = self.dirty || self.profile_context != context || self.profile_context_params != params;
        self.profile_context = context.to_string();
        self.profile_context_params = params;
    }

    pub fn rescore_profile(&self) -> Option<&str> {
        self.rescore_profile.as_deref()
    }

    pub fn set_rescore_profile(&mut self, profile: &str) {
        self.dirty = true;
        self.rescore_profile = Some(profile.to_string());
    }

    pub fn fulltext_query_builder_profile(&self) -> Option<&str> {
        self.fulltext_query_builder_profile.as_deref()
    }

    pub fn set_fulltext_query_builder_profile(&mut self, profile: &str) {
        self.dirty = true;
        self.fulltext_query_builder_profile = Some(profile.to_string());
    }

    pub fn are_results_possible(&self) -> bool {
        self.results_possible
    }

    pub fn set_results_possible(&mut self, possible: bool) {
        self.dirty = true;
        self.results_possible = possible;
    }

    /// With `None`, whether any syntax besides plain full text was recorded
    pub fn is_syntax_used(&self, syntax: Option<&str>) -> bool {
        match syntax {
            Some(name) => self.syntax_used.iter().any(|e| e.name == name),
            None => self.syntax_used.iter().any(|e| e.name != FULL_TEXT),
        }
    }

    /// Whether a keyword or special syntax was recorded
    pub fn is_special_keyword_used(&self) -> bool {
        self.syntax_used
            .iter()
            .any(|e| !NON_SPECIAL_SYNTAX.contains(&e.name.as_str()))
    }

    /// Recorded syntax names, in order of first use
    pub fn syntax_used(&self) -> Vec<&str> {
        self.syntax_used.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn syntax_description(&self) -> String {
        self.syntax_used().join(",")
    }

    /// Record a syntax feature. Without a weight the config's syntax weight
    /// table is used.
    pub fn add_syntax_used(&mut self, syntax: &str, weight: Option<u32>) {
        self.dirty = true;
        let weight = weight.unwrap_or_else(|| self.config.syntax_weight(syntax));
        self.record_syntax(syntax, weight);
    }

    fn record_syntax(&mut self, syntax: &str, weight: u32) {
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.syntax_used.iter_mut().find(|e| e.name == syntax) {
            // A lighter re-add never demotes an entry
            Some(entry) if weight >= entry.weight => {
                entry.weight = weight;
                entry.seq = seq;
            }
            Some(_) => {}
            None => self.syntax_used.push(SyntaxEntry {
                name: syntax.to_string(),
                weight,
                seq,
            }),
        }
    }

    /// Heaviest syntax used, e.g. `full_text`, `prefix` or `regex`
    pub fn search_type(&self) -> &str {
        self.syntax_used
            .iter()
            .max_by_key(|e| (e.weight, e.seq))
            .map(|e| e.name.as_str())
            .unwrap_or(FULL_TEXT)
    }

    pub fn add_filter(&mut self, filter: FilterQuery) {
        self.dirty = true;
        self.filters.push(filter);
    }

    pub fn add_not_filter(&mut self, filter: FilterQuery) {
        self.dirty = true;
        self.not_filters.push(filter);
    }

    pub fn filters(&self) -> &[FilterQuery] {
        &self.filters
    }

    pub fn not_filters(&self) -> &[FilterQuery] {
        &self.not_filters
    }

    pub fn limit_search_to_local_wiki(&self) -> bool {
        self.limit_search_to_local_wiki
    }

    pub fn set_limit_search_to_local_wiki(&mut self, local_only: bool) {
        if local_only != self.limit_search_to_local_wiki {
            self.dirty = true;
            self.limit_search_to_local_wiki = local_only;
        }
    }

    /// Seconds to cache results for
    pub fn cache_ttl(&self) -> u64 {
        self.cache_ttl
    }

    pub fn set_cache_ttl(&mut self, ttl: u64) {
        self.dirty = true;
        self.cache_ttl = ttl;
    }

    pub fn original_search_term(&self) -> &str {
        &self.original_search_term
    }

    /// Only used for logging, does not dirty the context
    pub fn set_original_search_term(&mut self, term: &str) {
        self.original_search_term = term.to_string();
    }

    /// Search term with keywords removed
    pub fn cleaned_search_term(&self) -> Option<&str> {
        self.cleaned_search_term.as_deref()
    }

    pub fn set_cleaned_search_term(&mut self, term: &str) {
        self.dirty = true;
        self.cleaned_search_term = Some(term.to_string());
    }

    pub fn add_warning(&mut self, message: &str, params: &[&str]) {
        self.dirty = true;
        self.warnings.push(SearchWarning {
            message: message.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
    }

    pub fn warnings(&self) -> &[SearchWarning] {
        &self.warnings
    }

    pub fn debug_options(&self) -> &DebugOptions {
        &self.debug_options
    }

    pub fn fallback_runner(&self) -> &Arc<FallbackRunner> {
        &self.fallback_runner
    }

    /// Extra indices to query along the wiki index for the searched
    /// namespaces. Empty when limited to the local wiki or when searching
    /// every namespace.
    pub fn extra_indices(&self) -> Vec<String> {
        if self.limit_search_to_local_wiki || self.namespaces.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<String> = Vec::new();
        for ns in &self.namespaces {
            for index in self.config.extra_indices_for(*ns) {
                if !indices.contains(index) {
                    indices.push(index.clone());
                }
            }
        }
        indices
    }
}

impl FilterBuilder for SearchContext {
    fn must(&mut self, query: FilterQuery) {
        self.add_filter(query);
    }

    fn must_not(&mut self, query: FilterQuery) {
        self.add_not_filter(query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{DefaultNamespacePrefixParser, NS_FILE, NS_MAIN};
    use crate::search::builder::SearchQueryBuilder;
    use crate::search::filters::PrefixFilter;

    fn query_for(config: SearchConfig, text: &str) -> SearchQueryBuilder {
        SearchQueryBuilder::new_ft_search_query_builder(
            Arc::new(config),
            text,
            &DefaultNamespacePrefixParser::new(),
        )
        .unwrap()
    }

    fn context() -> SearchContext {
        SearchContext::new(Arc::new(SearchConfig::default()), vec![NS_MAIN], None, None)
    }

    #[test]
    fn test_search_type_by_weight() {
        let mut ctx = context();
        assert_eq!(ctx.search_type(), FULL_TEXT);

        ctx.add_syntax_used("full_text", None);
        ctx.add_syntax_used("prefix", None);
        assert_eq!(ctx.search_type(), "full_text");

        ctx.add_syntax_used("regex", None);
        ctx.add_syntax_used("more_like", None);
        assert_eq!(ctx.search_type(), "regex");
        assert_eq!(ctx.syntax_description(), "full_text,prefix,regex,more_like");
    }

    #[test]
    fn test_search_type_ties_go_to_latest() {
        let mut ctx = context();
        ctx.add_syntax_used("foo", Some(5));
        ctx.add_syntax_used("bar", Some(5));
        assert_eq!(ctx.search_type(), "bar");
        ctx.add_syntax_used("foo", Some(5));
        assert_eq!(ctx.search_type(), "foo");
        // re-adding keeps the original position
        assert_eq!(ctx.syntax_used(), ["foo", "bar"]);
    }

    #[test]
    fn test_search_type_heavier_later_syntax_wins() {
        let mut ctx = context();
        ctx.add_syntax_used(FULL_TEXT, None);
        assert_eq!(ctx.search_type(), FULL_TEXT);

        ctx.add_syntax_used("more_like", None);
        assert_eq!(ctx.search_type(), "more_like");

        ctx.add_syntax_used("custom", Some(1000));
        assert_eq!(ctx.search_type(), "custom");

        // Lighter later syntax does not take the lead
        ctx.add_syntax_used("lower", Some(5));
        assert_eq!(ctx.search_type(), "custom");
    }

    #[test]
    fn test_lighter_re_add_keeps_leader() {
        let mut ctx = context();
        ctx.add_syntax_used("more_like", None);
        ctx.add_syntax_used("custom", Some(1000));
        ctx.add_syntax_used("custom", Some(5));
        assert_eq!(ctx.search_type(), "custom");
        assert_eq!(ctx.syntax_used(), ["more_like", "custom"]);
    }

    #[test]
    fn test_syntax_used() {
        let mut ctx = context();
        assert!(!ctx.is_syntax_used(None));
        ctx.add_syntax_used(FULL_TEXT, None);
        assert!(!ctx.is_syntax_used(None));
        assert!(ctx.is_syntax_used(Some(FULL_TEXT)));
        assert!(!ctx.is_special_keyword_used());

        ctx.add_syntax_used("intitle", None);
        assert!(ctx.is_syntax_used(None));
        assert!(ctx.is_special_keyword_used());
        assert!(ctx.is_dirty());
    }

    #[test]
    fn test_from_search_query_defaults() {
        let query = query_for(SearchConfig::default(), "foo bar").build();
        let ctx = SearchContext::from_search_query(&query, None).unwrap();

        assert_eq!(ctx.namespaces(), [NS_MAIN]);
        assert_eq!(ctx.rescore_profile(), Some("classic"));
        assert_eq!(ctx.fulltext_query_builder_profile(), Some("default"));
        assert_eq!(ctx.profile_context(), CONTEXT_DEFAULT);
        assert_eq!(ctx.original_search_term(), "foo bar");
        assert_eq!(ctx.syntax_used(), ["simple_bag_of_words"]);
        assert!(!ctx.is_special_keyword_used());
        assert!(!ctx.limit_search_to_local_wiki());
        assert!(ctx.fallback_runner().is_noop());
        assert!(!ctx.is_dirty());
    }

    #[test]
    fn test_from_search_query_forced_profiles() {
        let mut b = query_for(SearchConfig::default(), "foo");
        b.add_forced_profile(ProfileType::Rescore, "empty")
            .add_forced_profile(ProfileType::FtQueryBuilder, "perfield_builder");
        let ctx = SearchContext::from_search_query(&b.build(), None).unwrap();
        assert_eq!(ctx.rescore_profile(), Some("empty"));
        assert_eq!(ctx.fulltext_query_builder_profile(), Some("perfield_builder"));
    }

    #[test]
    fn test_from_search_query_missing_default_profile() {
        let mut config = SearchConfig::default();
        config.profiles.defaults.clear();
        let query = query_for(config, "foo").build();
        assert!(matches!(
            SearchContext::from_search_query(&query, None),
            Err(crate::error::Error::Profile(_))
        ));
    }

    #[test]
    fn test_from_search_query_populates_filters() {
        let ns_parser = DefaultNamespacePrefixParser::new();
        let mut b = query_for(SearchConfig::default(), "foo");
        b.add_contextual_filter("prefix", Arc::new(PrefixFilter::new("Bar", &ns_parser)))
            .unwrap();
        let query = b.build();
        let ctx = SearchContext::from_search_query(&query, None).unwrap();

        assert_eq!(ctx.filters().len(), 1);
        assert!(ctx.not_filters().is_empty());
        // prefix filters keep the search on the host wiki
        assert!(ctx.limit_search_to_local_wiki());
    }

    #[test]
    fn test_extra_indices() {
        let mut config = SearchConfig::default();
        config
            .extra_indices
            .insert(NS_FILE, vec!["commonswiki_file".to_string()]);

        let mut b = query_for(config.clone(), "foo");
        b.set_initial_namespaces(vec![NS_MAIN, NS_FILE]);
        let ctx = SearchContext::from_search_query(&b.build(), None).unwrap();
        assert_eq!(ctx.extra_indices(), ["commonswiki_file".to_string()]);

        // all namespaces
        b.set_initial_namespaces(vec![]);
        let ctx = SearchContext::from_search_query(&b.build(), None).unwrap();
        assert!(ctx.extra_indices().is_empty());

        // caller disabled extra indices
        b.set_initial_namespaces(vec![NS_FILE]).set_extra_indices_search(false);
        let ctx = SearchContext::from_search_query(&b.build(), None).unwrap();
        assert!(ctx.limit_search_to_local_wiki());
        assert!(ctx.extra_indices().is_empty());
    }

    #[test]
    fn test_set_profile_context_dirty_only_on_change() {
        let mut ctx = context();
        ctx.set_profile_context(CONTEXT_DEFAULT, BTreeMap::new());
        assert!(!ctx.is_dirty());
        ctx.set_profile_context("prefixsearch", BTreeMap::new());
        assert!(ctx.is_dirty());
    }

    #[test]
    fn test_warnings_and_setters() {
        let mut ctx = context();
        ctx.set_original_search_term("foo");
        assert!(!ctx.is_dirty());

        ctx.add_warning("cirrussearch-regex-too-busy-error", &[]);
        ctx.set_cache_ttl(600);
        ctx.set_results_possible(false);
        ctx.set_cleaned_search_term("foo");
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.cache_ttl(), 600);
        assert!(!ctx.are_results_possible());
        assert_eq!(ctx.cleaned_search_term(), Some("foo"));
        assert!(ctx.is_dirty());
    }
}
