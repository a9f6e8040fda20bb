//! Keywords understood by the full-text parser.

use crate::namespace::{PrefixNamespace, is_core_namespace};
use crate::strategy::CrossSearchStrategy;
use serde::Serialize;

/// A `key:value` search keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    /// `local:` restricts the search to the host wiki
    Local,
    InTitle,
    InSource,
    /// `prefix:` title prefix search, consumes the rest of the query
    Prefix,
    /// `morelike:` similar pages, consumes the rest of the query
    MoreLike,
    InCategory,
    HasTemplate,
    InLanguage,
    DeepCategory,
    SubPageOf,
}

impl Keyword {
    /// Look up a keyword by its (case-insensitive) key
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "local" => Some(Keyword::Local),
            "intitle" => Some(Keyword::InTitle),
            "insource" => Some(Keyword::InSource),
            "prefix" => Some(Keyword::Prefix),
            "morelike" => Some(Keyword::MoreLike),
            "incategory" => Some(Keyword::InCategory),
            "hastemplate" => Some(Keyword::HasTemplate),
            "inlanguage" => Some(Keyword::InLanguage),
            "deepcat" | "deepcategory" => Some(Keyword::DeepCategory),
            "subpageof" => Some(Keyword::SubPageOf),
            _ => None,
        }
    }

    /// Feature name reported in [`ParsedQuery::features_used`](super::ParsedQuery::features_used)
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Local => "local",
            Keyword::InTitle => "intitle",
            Keyword::InSource => "insource",
            Keyword::Prefix => "prefix",
            Keyword::MoreLike => "more_like",
            Keyword::InCategory => "incategory",
            Keyword::HasTemplate => "hastemplate",
            Keyword::InLanguage => "inlanguage",
            Keyword::DeepCategory => "deepcategory",
            Keyword::SubPageOf => "subpageof",
        }
    }

    /// Greedy keywords take the remainder of the query as their value
    pub fn is_greedy(&self) -> bool {
        matches!(self, Keyword::Prefix | Keyword::MoreLike)
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, Keyword::Local)
    }

    /// Whether `/regex/` values are accepted
    pub fn allows_regex(&self) -> bool {
        matches!(self, Keyword::InTitle | Keyword::InSource)
    }
}

/// A keyword occurrence in a parsed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordNode {
    pub keyword: Keyword,
    /// Key as typed by the user
    pub key: String,
    pub value: String,
    /// `"` for quoted values, `/` for regexes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Namespace given in a `prefix:` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<PrefixNamespace>,
}

impl KeywordNode {
    pub fn is_regex(&self) -> bool {
        self.delimiter == Some('/')
    }

    /// Cross-wiki capabilities this keyword leaves to the request
    pub fn cross_search_strategy(&self) -> &'static CrossSearchStrategy {
        match self.keyword {
            Keyword::InTitle | Keyword::InSource if !self.is_regex() => CrossSearchStrategy::all_wikis(),
            // Namespaces beyond the core ones are not guaranteed to exist elsewhere
            Keyword::Prefix => match self.namespace {
                Some(PrefixNamespace::Namespace(ns)) if !is_core_namespace(ns) => {
                    CrossSearchStrategy::host_wiki_only()
                }
                _ => CrossSearchStrategy::all_wikis(),
            },
            _ => CrossSearchStrategy::host_wiki_only(),
        }
    }
}
