//! Shared helpers for integration tests
#![allow(dead_code)]

use cirrus_query::search::{ContextualFilter, FilterBuilder};
use cirrus_query::{DefaultNamespacePrefixParser, Namespace, SearchConfig, SearchQueryBuilder};
use serde_json::json;
use std::sync::Arc;

pub fn ns_parser() -> DefaultNamespacePrefixParser {
    DefaultNamespacePrefixParser::new()
}

/// Host wiki config with the given cross-search toggles
pub fn host_config(cross_project: bool, alt_language: bool) -> SearchConfig {
    SearchConfig {
        enable_cross_project_search: cross_project,
        enable_alt_language: alt_language,
        ..SearchConfig::default()
    }
}

/// Register rescore profiles (all empty) on a config
pub fn with_rescore_profiles(mut config: SearchConfig, names: &[&str]) -> SearchConfig {
    for name in names {
        config
            .profiles
            .register_profile(cirrus_query::ProfileType::Rescore, name, json!({}));
    }
    config
}

/// Config of a sister wiki only knowing the `common` rescore profile
pub fn target_config() -> Arc<SearchConfig> {
    let mut config = SearchConfig::for_wiki("target");
    config.profiles = Default::default();
    Arc::new(with_rescore_profiles(config, &["common"]))
}

pub fn builder(config: SearchConfig, query: &str) -> SearchQueryBuilder {
    SearchQueryBuilder::new_ft_search_query_builder(Arc::new(config), query, &ns_parser())
        .expect("query should parse")
}

/// Contextual filter that only reports namespaces
#[derive(Debug)]
pub struct NamespacesFilter(pub Option<Vec<Namespace>>);

impl ContextualFilter for NamespacesFilter {
    fn required_namespaces(&self) -> Option<Vec<Namespace>> {
        self.0.clone()
    }

    fn restricts_cross_search(&self) -> bool {
        false
    }

    fn populate(&self, _builder: &mut dyn FilterBuilder) {
        panic!("namespaces filter must not be populated");
    }
}

pub fn namespaces_filter(namespaces: Option<Vec<Namespace>>) -> Arc<dyn ContextualFilter> {
    Arc::new(NamespacesFilter(namespaces))
}
