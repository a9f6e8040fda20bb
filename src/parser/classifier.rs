//! Coarse classification of parsed queries.

use super::ast::QueryNode;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Basic shape of a full-text query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    /// Only plain words
    SimpleBagOfWords,
    /// A single phrase
    SimplePhrase,
    /// Plain words and phrases
    BagOfWordsWithPhrase,
    /// Anything else
    ComplexQuery,
}

impl QueryClass {
    pub const ALL: [QueryClass; 4] = [
        QueryClass::SimpleBagOfWords,
        QueryClass::SimplePhrase,
        QueryClass::BagOfWordsWithPhrase,
        QueryClass::ComplexQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryClass::SimpleBagOfWords => "simple_bag_of_words",
            QueryClass::SimplePhrase => "simple_phrase",
            QueryClass::BagOfWordsWithPhrase => "bag_of_words_with_phrase",
            QueryClass::ComplexQuery => "complex_query",
        }
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a query tree. Empty queries have no class.
pub fn classify(root: &QueryNode, explicit_operators: bool) -> BTreeSet<QueryClass> {
    let mut classes = BTreeSet::new();

    let leaves: Vec<&QueryNode> = match root {
        QueryNode::Empty => return classes,
        QueryNode::And { children } if !explicit_operators => children.iter().collect(),
        other => vec![other],
    };

    let words = leaves
        .iter()
        .filter(|n| matches!(n, QueryNode::Word { .. }))
        .count();
    let phrases = leaves
        .iter()
        .filter(|n| matches!(n, QueryNode::Phrase { slop: None, .. }))
        .count();

    let class = if explicit_operators || words + phrases != leaves.len() {
        QueryClass::ComplexQuery
    } else if phrases == 0 {
        QueryClass::SimpleBagOfWords
    } else if words == 0 && phrases == 1 {
        QueryClass::SimplePhrase
    } else {
        QueryClass::BagOfWordsWithPhrase
    };
    classes.insert(class);
    classes
}
