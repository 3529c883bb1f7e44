use std::collections::BTreeSet;
use std::ops::Bound;
use crate::analysis::analyzer::Analyzer;
use crate::analysis::fulltext::FulltextQuery;
use crate::core::config::FulltextConfig;

/// In-memory fulltext matching against document text.
///
/// Document text is reduced to a set of normalized words plus every run of
/// 2..=n consecutive words joined by a space, where n is the largest number
/// of normalized words any query term needs. Query terms go through the same
/// normalization, so `report.pdf` or `"quick brown"` match only when their
/// words are adjacent after stop words and short words are removed.
#[derive(Debug, Clone)]
pub struct FulltextMatcher {
    analyzer: Analyzer,
    prefix: Analyzer,
}

impl FulltextMatcher {
    pub fn new(config: &FulltextConfig) -> Self {
        FulltextMatcher {
            analyzer: Analyzer::fulltext(config),
            prefix: Analyzer::prefix(config),
        }
    }

    pub fn matches(&self, query: &FulltextQuery, text: &str) -> bool {
        let words = self.word_set(text, self.phrase_size(query));
        self.matches_words(query, &words)
    }

    /// Longest run of normalized words needed by any term of `query`, at least 1.
    pub fn phrase_size(&self, query: &FulltextQuery) -> usize {
        match query {
            FulltextQuery::Or(terms) | FulltextQuery::And(terms) => {
                terms.iter().map(|t| self.phrase_size(t)).max().unwrap_or(1)
            }
            FulltextQuery::Word(word) | FulltextQuery::NotWord(word) => {
                self.term_words(word).len().max(1)
            }
        }
    }

    /// Normalized words of `text` plus phrase windows up to `phrase_size` words.
    pub fn word_set(&self, text: &str, phrase_size: usize) -> BTreeSet<String> {
        let words = self.analyzer.words(text);
        let mut set: BTreeSet<String> = words.iter().cloned().collect();
        for size in 2..=phrase_size.min(words.len()) {
            for window in words.windows(size) {
                set.insert(window.join(" "));
            }
        }
        set
    }

    /// Evaluates the OR-of-ANDs tree against an already built word set.
    pub fn matches_words(&self, query: &FulltextQuery, words: &BTreeSet<String>) -> bool {
        match query {
            FulltextQuery::Or(terms) => terms.iter().any(|t| self.matches_words(t, words)),
            FulltextQuery::And(terms) => terms.iter().all(|t| self.matches_words(t, words)),
            FulltextQuery::Word(word) => self.contains(word, words).unwrap_or(false),
            FulltextQuery::NotWord(word) => !self.contains(word, words).unwrap_or(false),
        }
    }

    /// Prefix terms keep short and stop words, since `th*` must still
    /// reach `thesis`.
    fn term_words(&self, word: &str) -> Vec<String> {
        match prefix_of(word) {
            Some(prefix) => self.prefix.words(prefix),
            None => self.analyzer.words(word),
        }
    }

    /// `None` when the query term normalizes to nothing.
    fn contains(&self, word: &str, words: &BTreeSet<String>) -> Option<bool> {
        let normalized = self.term_words(word).join(" ");
        if normalized.is_empty() {
            return None;
        }
        if prefix_of(word).is_none() {
            return Some(words.contains(&normalized));
        }
        let found = words
            .range::<str, _>((Bound::Included(normalized.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|candidate| candidate.starts_with(&normalized));
        Some(found)
    }
}

fn prefix_of(word: &str) -> Option<&str> {
    word.strip_suffix('*').or_else(|| word.strip_suffix('%'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fulltext::analyze;

    fn matches(query: &str, text: &str) -> bool {
        let matcher = FulltextMatcher::new(&FulltextConfig::default());
        let query = analyze(query).unwrap().unwrap();
        matcher.matches(&query, text)
    }

    #[test]
    fn phrases_need_adjacent_words() {
        assert!(matches("\"quick brown\"", "The quick brown fox"));
        assert!(!matches("\"quick fox\"", "The quick brown fox"));
        assert!(matches("\"the quick\"", "The quick brown fox"));
    }

    #[test]
    fn negation_and_or() {
        assert!(!matches("quick -fox", "The quick brown fox"));
        assert!(matches("quick -dog", "The quick brown fox"));
        assert!(matches("cat OR fox", "The quick brown fox"));
    }

    #[test]
    fn words_are_folded_and_singularized() {
        assert!(matches("ÉLÈVES", "une eleve"));
        assert!(matches("reports", "Annual report"));
    }

    #[test]
    fn prefix_scan() {
        assert!(matches("bro*", "The quick brown fox"));
        assert!(matches("qui%", "The quick brown fox"));
        assert!(!matches("zeb*", "The quick brown fox"));
        assert!(matches("reports*", "Annual reports"));
        assert!(matches("Report*", "Annual reporting"));
    }

    #[test]
    fn punctuated_terms_need_adjacent_words() {
        assert!(matches("report.pdf", "see report.pdf"));
        assert!(matches("jean-luc", "jean-luc picard"));
        assert!(!matches("report.pdf", "the pdf of the report"));
    }

    #[test]
    fn phrase_size_counts_normalized_words() {
        let matcher = FulltextMatcher::new(&FulltextConfig::default());
        let query = analyze("report.pdf OR \"the quick brown\"").unwrap().unwrap();
        assert_eq!(matcher.phrase_size(&query), 2);
        let query = analyze("annual.rep*").unwrap().unwrap();
        assert_eq!(matcher.phrase_size(&query), 2);
    }

    #[test]
    fn words_normalizing_to_nothing_never_match() {
        assert!(!matches("ab", "ab ab"));
        assert!(matches("fox -ab", "fox ab"));
    }
}
