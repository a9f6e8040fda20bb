//! Full-text query parsing.
//!
//! - [`cleanup`] - question mark stripping applied before parsing
//! - [`parser`] - recursive descent parser producing a [`ParsedQuery`]
//! - [`keywords`] - `key:value` keywords and their cross-wiki restrictions
//! - [`classifier`] - basic query classes

pub mod ast;
pub mod classifier;
pub mod cleanup;
pub mod keywords;
#[allow(clippy::module_inception)]
pub mod parser;

pub use ast::{ParseWarning, ParsedQuery, QueryNode, RequiredNamespaces};
pub use classifier::QueryClass;
pub use cleanup::{QueryCleanup, QuestionMarkStripLevel, strip_question_marks};
pub use keywords::{Keyword, KeywordNode};
pub use parser::{QUERY_LEN_HARD_LIMIT, QueryStringParser};
