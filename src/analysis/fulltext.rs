//! Free-text query parsing.
//!
//! A raw query such as `report -draft "annual budget" OR memo*` becomes an
//! OR of AND-groups of words and phrases. Words prefixed with `-` are
//! negated; an AND-group made only of negated words is dropped since it
//! cannot positively select a document.

use std::fmt;
use crate::core::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulltextQuery {
    Or(Vec<FulltextQuery>),
    And(Vec<FulltextQuery>),
    /// A word, a prefix (`*` or `%` suffix) or a space-separated phrase.
    Word(String),
    NotWord(String),
}

impl FulltextQuery {
    pub fn word(&self) -> Option<&str> {
        match self {
            FulltextQuery::Word(w) | FulltextQuery::NotWord(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, FulltextQuery::NotWord(_))
    }

    pub fn is_phrase(&self) -> bool {
        self.word().is_some_and(|w| w.contains(' '))
    }

    pub fn terms(&self) -> &[FulltextQuery] {
        match self {
            FulltextQuery::Or(terms) | FulltextQuery::And(terms) => terms,
            _ => &[],
        }
    }
}

impl fmt::Display for FulltextQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let syntax = crate::analysis::translate::TranslationSyntax::default();
        f.write_str(&crate::analysis::translate::translate(self, &syntax))
    }
}

/// Single-use parser state for one raw query string.
#[derive(Debug, Default)]
pub struct FulltextQueryAnalyzer {
    groups: Vec<FulltextQuery>,
    current: Vec<FulltextQuery>,
}

impl FulltextQueryAnalyzer {
    pub fn new() -> Self {
        FulltextQueryAnalyzer::default()
    }

    /// Returns `None` when no AND-group survives, meaning the query matches
    /// nothing.
    pub fn analyze(mut self, query: &str) -> Result<Option<FulltextQuery>> {
        let mut words = query.split_whitespace();
        let mut was_or = false;

        while let Some(raw) = words.next() {
            if ignored(raw) {
                continue;
            }
            let (negated, forced, rest) = match raw.as_bytes()[0] {
                b'+' => (false, true, &raw[1..]),
                b'-' => (true, false, &raw[1..]),
                _ => (false, false, raw),
            };

            let word = if let Some(start) = rest.strip_prefix('"') {
                match read_phrase(start, &mut words, query)? {
                    Some(phrase) => phrase,
                    None => continue,
                }
            } else if !negated && !forced && rest.eq_ignore_ascii_case("OR") {
                if was_or {
                    return Err(invalid("OR OR", query));
                }
                if self.current.is_empty() {
                    return Err(invalid("standalone OR", query));
                }
                was_or = true;
                continue;
            } else {
                rest.to_string()
            };

            if word.is_empty() {
                return Err(invalid(if negated { "standalone -" } else { "standalone +" }, query));
            }
            if was_or {
                self.end_and();
                was_or = false;
            }
            self.current.push(if negated {
                FulltextQuery::NotWord(word)
            } else {
                FulltextQuery::Word(word)
            });
        }
        if was_or {
            return Err(invalid("final OR", query));
        }
        self.end_and();

        let mut groups = self.groups;
        Ok(match groups.len() {
            0 => None,
            1 => groups.pop(),
            _ => Some(FulltextQuery::Or(groups)),
        })
    }

    /// Closes the current AND-group, moving negated terms last and dropping
    /// the group if nothing positive remains.
    fn end_and(&mut self) {
        let terms = std::mem::take(&mut self.current);
        let (mut positive, negative): (Vec<_>, Vec<_>) =
            terms.into_iter().partition(|t| !t.is_negated());
        if positive.is_empty() {
            return;
        }
        positive.extend(negative);
        if positive.len() == 1 {
            self.groups.extend(positive);
        } else {
            self.groups.push(FulltextQuery::And(positive));
        }
    }
}

pub fn analyze(query: &str) -> Result<Option<FulltextQuery>> {
    FulltextQueryAnalyzer::new().analyze(query)
}

/// Collects a quoted phrase whose opening quote was already consumed.
fn read_phrase<'a>(
    first: &'a str,
    words: &mut impl Iterator<Item = &'a str>,
    query: &str,
) -> Result<Option<String>> {
    let mut phrase: Vec<&str> = Vec::new();
    let mut word = first;
    loop {
        let closed = word.ends_with('"');
        let content = if closed { &word[..word.len() - 1] } else { word };
        if content.contains('"') {
            return Err(invalid("double quotes", query));
        }
        if !content.is_empty() {
            phrase.push(content);
        }
        if closed {
            break;
        }
        match words.next() {
            Some(next) => word = next,
            // an unterminated phrase runs to the end of the query
            None => break,
        }
    }
    Ok(if phrase.is_empty() { None } else { Some(phrase.join(" ")) })
}

/// Pure punctuation carries no search term; lone `+`/`-` and anything with
/// a quote are kept so they fail with a precise message.
fn ignored(word: &str) -> bool {
    if word == "+" || word == "-" || word.contains('"') {
        return false;
    }
    word.chars().all(|c| c.is_ascii_punctuation())
}

fn invalid(reason: &str, query: &str) -> Error {
    Error::query_parse(format!("Invalid fulltext query ({}): {}", reason, query))
}
