//! Full-text query string parser.
//!
//! Grammar (loosely):
//!
//! ```text
//! query   := [cleanups] [namespace ':'] or
//! or      := and (('OR' | '||') and)*
//! and     := unary (('AND' | '&&')? unary)*
//! unary   := ('-' | '!' | 'NOT') primary | primary
//! primary := phrase | keyword | word
//! ```

use super::ast::{ParseWarning, ParsedQuery, QueryNode, RequiredNamespaces};
use super::classifier::classify;
use super::cleanup::{QueryCleanup, QuestionMarkStripLevel, strip_question_marks};
use super::keywords::{Keyword, KeywordNode};
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::namespace::{NS_MAIN, NamespacePrefixParser, PrefixNamespace};
use crate::strategy::CrossSearchStrategy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Queries longer than this (in characters) are rejected
pub const QUERY_LEN_HARD_LIMIT: usize = 2048;

/// Feature name reported when the query starts with a namespace
pub const NAMESPACE_HEADER_FEATURE: &str = "namespace_header";

/// Parser for the full-text search syntax
pub struct QueryStringParser<'a> {
    strip_level: QuestionMarkStripLevel,
    namespace_prefix_parser: &'a dyn NamespacePrefixParser,
}

impl<'a> QueryStringParser<'a> {
    /// Build the full-text parser configured for a wiki
    pub fn new(config: &SearchConfig, namespace_prefix_parser: &'a dyn NamespacePrefixParser) -> Result<Self> {
        if config.language_code().trim().is_empty() {
            return Err(Error::Config(format!(
                "Cannot build a query parser for {}: no language code",
                config.wiki_id()
            )));
        }
        Ok(Self {
            strip_level: config.question_mark_strip_level(),
            namespace_prefix_parser,
        })
    }

    /// Parse a user query. Malformed syntax is reported through warnings and
    /// unclassified nodes, only oversized queries fail.
    pub fn parse(&self, raw_query: &str) -> Result<ParsedQuery> {
        let length = raw_query.chars().count();
        if length > QUERY_LEN_HARD_LIMIT {
            return Err(Error::QueryTooLong {
                length,
                limit: QUERY_LEN_HARD_LIMIT,
            });
        }

        let mut cleanups = BTreeSet::new();
        let mut query = strip_question_marks(raw_query, self.strip_level);
        if query != raw_query {
            cleanups.insert(QueryCleanup::QuestionMarkStripping);
        }
        let without_tilde = query.trim_start().strip_prefix('~').map(str::to_string);
        if let Some(rest) = without_tilde {
            query = rest;
            cleanups.insert(QueryCleanup::TildeHeader);
        }

        let (namespace_header, body) = match self.namespace_prefix_parser.parse(&query) {
            Some(prefix) => (Some(prefix.namespace), prefix.rest),
            None => (None, query.clone()),
        };

        let mut parser = QueryParser::new(&body, self.namespace_prefix_parser);
        let root = parser.parse();
        let classes = classify(&root, parser.explicit_operators);

        let mut cross_search_strategy = CrossSearchStrategy::all_wikis();
        let mut required_namespaces = RequiredNamespaces::none();
        let mut features_used = Vec::new();
        if namespace_header.is_some() {
            features_used.push(NAMESPACE_HEADER_FEATURE.to_string());
        }

        for (kw, negated) in root.keywords() {
            cross_search_strategy = cross_search_strategy.intersect(kw.cross_search_strategy());
            push_feature(&mut features_used, kw.keyword.name());
            if kw.is_regex() {
                push_feature(&mut features_used, "regex");
            }
            if kw.keyword == Keyword::Prefix && !negated {
                required_namespaces = match kw.namespace {
                    Some(PrefixNamespace::All) => RequiredNamespaces::All,
                    Some(PrefixNamespace::Namespace(ns)) => RequiredNamespaces::List(vec![ns]),
                    None => RequiredNamespaces::List(vec![NS_MAIN]),
                };
            }
        }

        for warning in &parser.warnings {
            tracing::debug!(offset = warning.offset, "Query parse warning: {}", warning.message);
        }

        Ok(ParsedQuery {
            root,
            query,
            raw_query: raw_query.to_string(),
            cleanups,
            namespace_header,
            required_namespaces,
            warnings: parser.warnings,
            cross_search_strategy,
            classes,
            features_used,
        })
    }
}

fn push_feature(features: &mut Vec<String>, name: &str) {
    if !features.iter().any(|f| f == name) {
        features.push(name.to_string());
    }
}

fn fuzzy_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?)~([0-2])?$").expect("valid fuzzy regex"))
}

/// Recursive descent over the query body
struct QueryParser<'a> {
    input: &'a str,
    pos: usize,
    namespace_prefix_parser: &'a dyn NamespacePrefixParser,
    warnings: Vec<ParseWarning>,
    explicit_operators: bool,
}

impl<'a> QueryParser<'a> {
    fn new(input: &'a str, namespace_prefix_parser: &'a dyn NamespacePrefixParser) -> Self {
        Self {
            input,
            pos: 0,
            namespace_prefix_parser,
            warnings: Vec::new(),
            explicit_operators: false,
        }
    }

    fn parse(&mut self) -> QueryNode {
        self.parse_or()
    }

    fn parse_or(&mut self) -> QueryNode {
        let mut nodes = vec![self.parse_and()];

        while self.consume_operator(&["OR", "||"]) {
            self.explicit_operators = true;
            nodes.push(self.parse_and());
        }

        nodes.retain(|n| *n != QueryNode::Empty);
        match nodes.len() {
            0 => QueryNode::Empty,
            1 => nodes.remove(0),
            _ => QueryNode::Or { children: nodes },
        }
    }

    fn parse_and(&mut self) -> QueryNode {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_eof() || self.at_operator(&["OR", "||"]) {
                break;
            }
            if self.consume_operator(&["AND", "&&"]) {
                self.explicit_operators = true;
                continue;
            }

            let node = self.parse_unary();
            if node != QueryNode::Empty {
                nodes.push(node);
            }
        }

        match nodes.len() {
            0 => QueryNode::Empty,
            1 => nodes.remove(0),
            _ => QueryNode::And { children: nodes },
        }
    }

    fn parse_unary(&mut self) -> QueryNode {
        self.skip_whitespace();

        if self.consume_operator(&["NOT"]) {
            self.skip_whitespace();
            if self.is_eof() {
                return QueryNode::word("NOT");
            }
            self.explicit_operators = true;
            let inner = self.parse_primary();
            return QueryNode::Not { child: Box::new(inner) };
        }

        if matches!(self.peek_char(), Some('-') | Some('!')) && self.negation_applies() {
            self.advance();
            let inner = self.parse_primary();
            return QueryNode::Not { child: Box::new(inner) };
        }

        self.parse_primary()
    }

    /// A negation sign only counts when directly followed by a term
    fn negation_applies(&self) -> bool {
        let mut chars = self.remaining().chars();
        chars.next();
        chars.next().is_some_and(|c| !c.is_whitespace())
    }

    fn parse_primary(&mut self) -> QueryNode {
        self.skip_whitespace();

        if self.peek_char() == Some('"') {
            return self.parse_phrase();
        }

        self.parse_term()
    }

    fn parse_phrase(&mut self) -> QueryNode {
        let start = self.pos;
        let Some(text) = self.read_delimited('"') else {
            return self.unbalanced(start, '"');
        };

        let mut slop = None;
        if self.consume_char('~') {
            let digits_start = self.pos;
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            slop = self.input[digits_start..self.pos].parse().ok();
        }

        QueryNode::Phrase { text, slop }
    }

    fn parse_term(&mut self) -> QueryNode {
        let start = self.pos;

        while self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.advance();
        }

        if self.pos > start && self.peek_char() == Some(':') {
            let input = self.input;
            let key = &input[start..self.pos];
            if let Some(keyword) = Keyword::from_key(key) {
                self.advance(); // consume ':'
                return self.parse_keyword(keyword, key, start);
            }
        }

        // Unknown field, treat as word
        self.pos = start;
        self.parse_word()
    }

    fn parse_keyword(&mut self, keyword: Keyword, key: &'a str, start: usize) -> QueryNode {
        let mut node = KeywordNode {
            keyword,
            key: key.to_string(),
            value: String::new(),
            delimiter: None,
            namespace: None,
        };

        if !keyword.takes_value() {
            return QueryNode::Keyword(node);
        }

        if keyword.is_greedy() {
            let input = self.input;
            let value = input[self.pos..].trim();
            self.pos = input.len();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            if value.is_empty() {
                return QueryNode::word(format!("{}:", key));
            }

            node.value = value.to_string();
            if keyword == Keyword::Prefix {
                if let Some(prefix) = self.namespace_prefix_parser.parse(value) {
                    node.namespace = Some(prefix.namespace);
                    node.value = prefix.rest;
                }
            }
            return QueryNode::Keyword(node);
        }

        match self.peek_char() {
            Some(delim @ ('/' | '"')) if delim == '"' || keyword.allows_regex() => {
                let Some(value) = self.read_delimited(delim) else {
                    return self.unbalanced(start, delim);
                };
                if delim == '/' {
                    // case-insensitive flag
                    self.consume_char('i');
                }
                node.value = value;
                node.delimiter = Some(delim);
            }
            _ => {
                let value_start = self.pos;
                while self.peek_char().is_some_and(|c| !c.is_whitespace()) {
                    self.advance();
                }
                node.value = self.input[value_start..self.pos].to_string();
            }
        }

        if node.value.is_empty() {
            return QueryNode::word(format!("{}:", key));
        }
        QueryNode::Keyword(node)
    }

    fn parse_word(&mut self) -> QueryNode {
        let start = self.pos;
        while self.peek_char().is_some_and(|c| !c.is_whitespace()) {
            self.advance();
        }
        let text = &self.input[start..self.pos];

        if text.is_empty() {
            return QueryNode::Empty;
        }
        if has_unescaped_wildcard(text) {
            return QueryNode::Wildcard { text: text.to_string() };
        }
        if let Some(caps) = fuzzy_word().captures(text) {
            return QueryNode::Fuzzy {
                text: caps[1].to_string(),
                distance: caps.get(2).and_then(|d| d.as_str().parse().ok()),
            };
        }
        QueryNode::word(text)
    }

    /// Read up to the closing delimiter, positioned on the opening one.
    /// Leaves the cursor untouched and returns `None` when unbalanced.
    fn read_delimited(&mut self, delim: char) -> Option<String> {
        let open = self.pos;
        self.advance();
        let content_start = self.pos;
        let mut escaped = false;

        while let Some(ch) = self.peek_char() {
            if ch == delim && !escaped {
                let content = self.input[content_start..self.pos].to_string();
                self.advance();
                return Some(content);
            }
            escaped = ch == '\\' && !escaped;
            self.advance();
        }

        self.pos = open;
        None
    }

    fn unbalanced(&mut self, start: usize, delim: char) -> QueryNode {
        self.warnings.push(ParseWarning {
            message: format!("Unbalanced {} in query", delim),
            offset: start,
        });
        let text = self.input[start..].to_string();
        self.pos = self.input.len();
        QueryNode::Unclassified { text }
    }

    fn at_operator(&self, ops: &[&str]) -> bool {
        let rest = self.remaining();
        ops.iter().any(|op| {
            rest.strip_prefix(*op)
                .is_some_and(|after| after.is_empty() || after.starts_with(char::is_whitespace))
        })
    }

    fn consume_operator(&mut self, ops: &[&str]) -> bool {
        self.skip_whitespace();
        for op in ops {
            if self.at_operator(&[*op]) {
                self.pos += op.len();
                return true;
            }
        }
        false
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn remaining(&self) -> &str {
        &self.input[self.pos..]
    }
}

fn has_unescaped_wildcard(text: &str) -> bool {
    let mut escaped = false;
    for ch in text.chars() {
        if (ch == '*' || ch == '?') && !escaped {
            return true;
        }
        escaped = ch == '\\' && !escaped;
    }
    false
}
