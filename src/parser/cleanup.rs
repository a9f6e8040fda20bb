//! Cleanups applied to the raw query before it is parsed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How aggressively question marks are removed from queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMarkStripLevel {
    /// Keep every question mark
    No,
    /// Strip only query-final question marks
    Final,
    /// Strip question marks at word boundaries
    #[default]
    Break,
    /// Strip every unescaped question mark
    All,
}

/// Cleanup that altered the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCleanup {
    #[serde(rename = "stripped_qmark")]
    QuestionMarkStripping,
    TildeHeader,
}

fn punctuation_only() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[[:punct:]]|\s|¿)+$").expect("valid punctuation regex"))
}

/// Strip question marks according to the level.
///
/// Queries using regex keywords and queries made only of punctuation are left
/// untouched. Escaped question marks (`\?`) are never stripped but are
/// unescaped.
pub fn strip_question_marks(term: &str, level: QuestionMarkStripLevel) -> String {
    if level == QuestionMarkStripLevel::No
        || term.contains("insource:/")
        || term.contains("intitle:/")
        || punctuation_only().is_match(term)
    {
        return term.to_string();
    }

    let stripped = match level {
        QuestionMarkStripLevel::No => return term.to_string(),
        QuestionMarkStripLevel::Final => strip_final(term),
        QuestionMarkStripLevel::Break => strip_at_breaks(term),
        QuestionMarkStripLevel::All => strip_all(term),
    };
    stripped.replace("\\?", "?")
}

fn strip_final(term: &str) -> String {
    let chars: Vec<char> = term.chars().collect();
    let mut end = chars.len();
    while end > 0 {
        let ch = chars[end - 1];
        let escaped = end >= 2 && chars[end - 2] == '\\';
        if ch.is_whitespace() || (ch == '?' && !escaped) {
            end -= 1;
        } else {
            break;
        }
    }
    chars[..end].iter().collect()
}

fn strip_at_breaks(term: &str) -> String {
    let chars: Vec<char> = term.chars().collect();
    let mut out = String::with_capacity(term.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '?' && (i == 0 || chars[i - 1] != '\\') {
            let run_start = i;
            while i < chars.len() && chars[i] == '?' {
                i += 1;
            }
            // Keep the run when a letter follows it
            if chars.get(i).is_some_and(|c| c.is_alphabetic()) {
                out.extend(&chars[run_start..i]);
            }
            continue;
        }
        out.push(ch);
        i += 1;
    }
    out
}

fn strip_all(term: &str) -> String {
    let chars: Vec<char> = term.chars().collect();
    let mut out = String::with_capacity(term.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '?' && (i == 0 || chars[i - 1] != '\\') {
            while i < chars.len() && chars[i] == '?' {
                i += 1;
            }
            out.push(' ');
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_stripping() {
        assert_eq!(strip_question_marks("foo?", QuestionMarkStripLevel::No), "foo?");
        assert_eq!(strip_question_marks("fooba\\?", QuestionMarkStripLevel::No), "fooba\\?");
    }

    #[test]
    fn test_break_strips_at_word_boundaries() {
        assert_eq!(strip_question_marks("what is this?", QuestionMarkStripLevel::Break), "what is this");
        assert_eq!(strip_question_marks("foo?? bar", QuestionMarkStripLevel::Break), "foo bar");
        // followed by a letter: kept
        assert_eq!(strip_question_marks("fo?o", QuestionMarkStripLevel::Break), "fo?o");
    }

    #[test]
    fn test_escaped_question_mark_is_unescaped() {
        assert_eq!(strip_question_marks("fooba\\?", QuestionMarkStripLevel::Break), "fooba?");
        assert_eq!(strip_question_marks("fooba\\?", QuestionMarkStripLevel::All), "fooba?");
    }

    #[test]
    fn test_final_only_strips_trailing() {
        assert_eq!(strip_question_marks("why? because?  ", QuestionMarkStripLevel::Final), "why? because");
        assert_eq!(strip_question_marks("tail\\?", QuestionMarkStripLevel::Final), "tail?");
    }

    #[test]
    fn test_all_replaces_with_space() {
        assert_eq!(strip_question_marks("a?b", QuestionMarkStripLevel::All), "a b");
    }

    #[test]
    fn test_regex_queries_untouched() {
        let q = "insource:/fo?o/ bar?";
        assert_eq!(strip_question_marks(q, QuestionMarkStripLevel::All), q);
    }

    #[test]
    fn test_punctuation_only_untouched() {
        assert_eq!(strip_question_marks("???", QuestionMarkStripLevel::Break), "???");
        assert_eq!(strip_question_marks("¿?", QuestionMarkStripLevel::All), "¿?");
    }
}
