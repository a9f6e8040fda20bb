//! Wiki namespaces and namespace prefix parsing.
//!
//! A list of namespaces is a `Vec<Namespace>`; the empty list means
//! "all namespaces".

use serde::Serialize;
use std::collections::HashMap;

/// Namespace id
pub type Namespace = i32;

pub const NS_MAIN: Namespace = 0;
pub const NS_TALK: Namespace = 1;
pub const NS_USER: Namespace = 2;
pub const NS_USER_TALK: Namespace = 3;
pub const NS_PROJECT: Namespace = 4;
pub const NS_PROJECT_TALK: Namespace = 5;
pub const NS_FILE: Namespace = 6;
pub const NS_FILE_TALK: Namespace = 7;
pub const NS_MEDIAWIKI: Namespace = 8;
pub const NS_MEDIAWIKI_TALK: Namespace = 9;
pub const NS_TEMPLATE: Namespace = 10;
pub const NS_TEMPLATE_TALK: Namespace = 11;
pub const NS_HELP: Namespace = 12;
pub const NS_HELP_TALK: Namespace = 13;
pub const NS_CATEGORY: Namespace = 14;
pub const NS_CATEGORY_TALK: Namespace = 15;

/// Namespaces every wiki is guaranteed to have
pub fn is_core_namespace(ns: Namespace) -> bool {
    (NS_MAIN..=NS_CATEGORY_TALK).contains(&ns)
}

/// Namespace selected by a `name:` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixNamespace {
    /// `all:` selects every namespace
    All,
    Namespace(Namespace),
}

/// Result of splitting a namespace prefix off a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePrefix {
    /// Text following the prefix, leading whitespace removed
    pub rest: String,
    pub namespace: PrefixNamespace,
}

/// Recognizes a leading `namespace:` in a query string
pub trait NamespacePrefixParser: Send + Sync {
    /// Returns `None` when the query does not start with a known namespace
    fn parse(&self, query: &str) -> Option<NamespacePrefix>;
}

/// Namespace prefix parser backed by a name table
#[derive(Debug, Clone)]
pub struct DefaultNamespacePrefixParser {
    names: HashMap<String, Namespace>,
}

impl Default for DefaultNamespacePrefixParser {
    fn default() -> Self {
        let mut names = HashMap::new();
        for (name, ns) in [
            ("talk", NS_TALK),
            ("user", NS_USER),
            ("user_talk", NS_USER_TALK),
            ("project", NS_PROJECT),
            ("project_talk", NS_PROJECT_TALK),
            ("file", NS_FILE),
            ("image", NS_FILE),
            ("file_talk", NS_FILE_TALK),
            ("mediawiki", NS_MEDIAWIKI),
            ("mediawiki_talk", NS_MEDIAWIKI_TALK),
            ("template", NS_TEMPLATE),
            ("template_talk", NS_TEMPLATE_TALK),
            ("help", NS_HELP),
            ("help_talk", NS_HELP_TALK),
            ("category", NS_CATEGORY),
            ("category_talk", NS_CATEGORY_TALK),
        ] {
            names.insert(name.to_string(), ns);
        }
        Self { names }
    }
}

impl DefaultNamespacePrefixParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extra (site specific) namespace name
    pub fn with_namespace(mut self, name: &str, ns: Namespace) -> Self {
        self.names.insert(normalize_name(name), ns);
        self
    }

    /// Look up a namespace by its (case and space insensitive) name
    pub fn lookup(&self, name: &str) -> Option<Namespace> {
        self.names.get(&normalize_name(name)).copied()
    }
}

impl NamespacePrefixParser for DefaultNamespacePrefixParser {
    fn parse(&self, query: &str) -> Option<NamespacePrefix> {
        let (name, rest) = query.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let namespace = if name.eq_ignore_ascii_case("all") {
            PrefixNamespace::All
        } else {
            PrefixNamespace::Namespace(self.lookup(name)?)
        };

        Some(NamespacePrefix {
            rest: rest.trim_start().to_string(),
            namespace,
        })
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
