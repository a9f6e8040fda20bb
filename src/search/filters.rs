//! Contextual filters: structural constraints attached to a query by the
//! caller rather than typed by the user.

use crate::error::{Error, Result};
use crate::namespace::{Namespace, NamespacePrefixParser, PrefixNamespace, NS_MAIN};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Structural filter queries understood by the search backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterQuery {
    /// Page lives in this namespace
    Namespace { namespace: Namespace },
    /// Title starts with the prefix
    TitlePrefix { prefix: String },
    /// Every clause must match
    All { clauses: Vec<FilterQuery> },
}

/// Receives filter queries from contextual filters
pub trait FilterBuilder {
    /// Results must match the query
    fn must(&mut self, query: FilterQuery);

    /// Results must not match the query
    fn must_not(&mut self, query: FilterQuery);
}

/// A named constraint contributed to a search request
pub trait ContextualFilter: fmt::Debug + Send + Sync {
    /// Namespaces this filter needs.
    ///
    /// `None` means no opinion, an empty list means every namespace.
    fn required_namespaces(&self) -> Option<Vec<Namespace>>;

    /// True when the filter only makes sense on the host wiki
    fn restricts_cross_search(&self) -> bool;

    /// Add the filter's queries to the builder
    fn populate(&self, builder: &mut dyn FilterBuilder);
}

/// Restrict results to titles starting with a prefix, e.g. `Help:Cont`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFilter {
    prefix: Option<String>,
    namespace: Option<Namespace>,
}

impl PrefixFilter {
    /// Build the filter from a user prefix. A leading namespace selects the
    /// namespace (`all:` matches every namespace), the main namespace is used
    /// otherwise.
    pub fn new(prefix: &str, namespace_prefix_parser: &dyn NamespacePrefixParser) -> Self {
        let mut value = trim_quotes(prefix).to_string();
        let mut namespace = Some(NS_MAIN);

        if let Some(parsed) = namespace_prefix_parser.parse(&value) {
            namespace = match parsed.namespace {
                PrefixNamespace::All => None,
                PrefixNamespace::Namespace(ns) => Some(ns),
            };
            value = trim_quotes(&parsed.rest).to_string();
        }

        let value = value.trim();
        Self {
            prefix: (!value.is_empty()).then(|| value.to_string()),
            namespace,
        }
    }

    /// Title prefix, `None` matches every title of the namespace
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Namespace, `None` when every namespace is searched
    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }

    fn query(&self) -> Option<FilterQuery> {
        let prefix = self.prefix.as_ref().map(|p| FilterQuery::TitlePrefix { prefix: p.clone() });
        let namespace = self.namespace.map(|ns| FilterQuery::Namespace { namespace: ns });

        match (prefix, namespace) {
            (Some(p), Some(ns)) => Some(FilterQuery::All { clauses: vec![p, ns] }),
            (p, ns) => p.or(ns),
        }
    }
}

impl ContextualFilter for PrefixFilter {
    fn required_namespaces(&self) -> Option<Vec<Namespace>> {
        Some(self.namespace.into_iter().collect())
    }

    fn restricts_cross_search(&self) -> bool {
        true
    }

    fn populate(&self, builder: &mut dyn FilterBuilder) {
        if let Some(query) = self.query() {
            builder.must(query);
        }
    }
}

fn trim_quotes(value: &str) -> &str {
    let trimmed = value.trim_end();
    trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|v| !v.contains('"'))
        .unwrap_or(value)
}

/// Named contextual filters in insertion order
#[derive(Debug, Clone, Default)]
pub struct ContextualFilters {
    entries: Vec<(String, Arc<dyn ContextualFilter>)>,
}

impl ContextualFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, names must be unique
    pub fn insert(&mut self, name: &str, filter: Arc<dyn ContextualFilter>) -> Result<()> {
        if self.contains(name) {
            return Err(Error::invalid_argument(format!(
                "context filter {} already set",
                name
            )));
        }
        self.entries.push((name.to_string(), filter));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ContextualFilter>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, filter)| filter)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ContextualFilter>)> {
        self.entries.iter().map(|(name, filter)| (name.as_str(), filter))
    }

    pub fn filters(&self) -> impl Iterator<Item = &Arc<dyn ContextualFilter>> {
        self.entries.iter().map(|(_, filter)| filter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
