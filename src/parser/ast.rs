//! Parsed query representation.

use super::classifier::QueryClass;
use super::cleanup::QueryCleanup;
use super::keywords::KeywordNode;
use crate::namespace::{Namespace, PrefixNamespace};
use crate::strategy::CrossSearchStrategy;
use serde::Serialize;
use std::collections::BTreeSet;

/// Query AST node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryNode {
    Word { text: String },
    /// Word containing `*` or `?`
    Wildcard { text: String },
    /// `foo~` or `foo~2`
    Fuzzy { text: String, distance: Option<u8> },
    /// Quoted phrase, `"foo bar"~2` sets the slop
    Phrase { text: String, slop: Option<u32> },
    Keyword(KeywordNode),
    And { children: Vec<QueryNode> },
    Or { children: Vec<QueryNode> },
    Not { child: Box<QueryNode> },
    /// Text the parser could not make sense of
    Unclassified { text: String },
    Empty,
}

impl QueryNode {
    pub(crate) fn word(text: impl Into<String>) -> Self {
        QueryNode::Word { text: text.into() }
    }

    /// Keywords of the tree in query order, with their negation
    pub fn keywords(&self) -> Vec<(&KeywordNode, bool)> {
        let mut out = Vec::new();
        collect_keywords(self, false, &mut out);
        out
    }
}

fn collect_keywords<'a>(node: &'a QueryNode, negated: bool, out: &mut Vec<(&'a KeywordNode, bool)>) {
    match node {
        QueryNode::Keyword(kw) => out.push((kw, negated)),
        QueryNode::And { children } | QueryNode::Or { children } => {
            for child in children {
                collect_keywords(child, negated, out);
            }
        }
        QueryNode::Not { child } => collect_keywords(child, !negated, out),
        _ => {}
    }
}

/// Namespaces the query syntax asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredNamespaces {
    /// Every namespace must be searched
    All,
    /// These namespaces must be searched; empty when the syntax has no opinion
    List(Vec<Namespace>),
}

impl RequiredNamespaces {
    pub fn none() -> Self {
        RequiredNamespaces::List(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub message: String,
    /// Byte offset in the parsed text
    pub offset: usize,
}

/// Output of the full-text query parser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub(crate) root: QueryNode,
    pub(crate) query: String,
    pub(crate) raw_query: String,
    pub(crate) cleanups: BTreeSet<QueryCleanup>,
    pub(crate) namespace_header: Option<PrefixNamespace>,
    pub(crate) required_namespaces: RequiredNamespaces,
    pub(crate) warnings: Vec<ParseWarning>,
    pub(crate) cross_search_strategy: &'static CrossSearchStrategy,
    pub(crate) classes: BTreeSet<QueryClass>,
    pub(crate) features_used: Vec<String>,
}

impl ParsedQuery {
    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    /// Query after cleanups, namespace header included
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query as given by the user
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn has_cleanup(&self, cleanup: QueryCleanup) -> bool {
        self.cleanups.contains(&cleanup)
    }

    pub fn namespace_header(&self) -> Option<PrefixNamespace> {
        self.namespace_header
    }

    pub fn required_namespaces(&self) -> &RequiredNamespaces {
        &self.required_namespaces
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Cross-wiki capabilities left by the query syntax
    pub fn cross_search_strategy(&self) -> &'static CrossSearchStrategy {
        self.cross_search_strategy
    }

    pub fn is_query_of_class(&self, class: QueryClass) -> bool {
        self.classes.contains(&class)
    }

    pub fn classes(&self) -> impl Iterator<Item = QueryClass> + '_ {
        self.classes.iter().copied()
    }

    /// Syntax features found in the query, in order of appearance
    pub fn features_used(&self) -> &[String] {
        &self.features_used
    }
}
