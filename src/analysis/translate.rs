use std::collections::HashSet;
use crate::analysis::fulltext::FulltextQuery;

/// Backend-specific spelling of a fulltext query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSyntax {
    pub or: String,
    pub and: String,
    pub and_not: String,
    pub word_start: String,
    pub word_end: String,
    /// A word containing any of these is emitted without word delimiters.
    pub reserved_chars: HashSet<char>,
    pub phrase_start: String,
    pub phrase_end: String,
    /// Joins the words of a phrase between the phrase delimiters.
    pub phrase_separator: String,
    /// Emit each phrase word with word delimiters instead of wrapping the
    /// whole phrase in phrase delimiters.
    pub quote_phrase_words: bool,
}

impl Default for TranslationSyntax {
    fn default() -> Self {
        TranslationSyntax {
            or: "OR".to_string(),
            and: "AND".to_string(),
            and_not: "AND NOT".to_string(),
            word_start: String::new(),
            word_end: String::new(),
            reserved_chars: HashSet::new(),
            phrase_start: "\"".to_string(),
            phrase_end: "\"".to_string(),
            phrase_separator: " ".to_string(),
            quote_phrase_words: false,
        }
    }
}

impl TranslationSyntax {
    /// `to_tsquery` syntax; phrases become `<->` adjacency chains.
    pub fn postgresql() -> Self {
        TranslationSyntax {
            or: "|".to_string(),
            and: "&".to_string(),
            and_not: "& !".to_string(),
            phrase_start: "(".to_string(),
            phrase_end: ")".to_string(),
            phrase_separator: " <-> ".to_string(),
            ..TranslationSyntax::default()
        }
    }

    /// `CONTAINS` syntax. Prefix terms carry their `*` inside the quotes.
    pub fn sql_server() -> Self {
        TranslationSyntax {
            word_start: "\"".to_string(),
            word_end: "\"".to_string(),
            ..TranslationSyntax::default()
        }
    }
}

pub fn translate(query: &FulltextQuery, syntax: &TranslationSyntax) -> String {
    let mut buf = String::new();
    translate_into(query, syntax, &mut buf);
    buf
}

pub fn translate_into(query: &FulltextQuery, syntax: &TranslationSyntax, buf: &mut String) {
    match query {
        FulltextQuery::Or(terms) | FulltextQuery::And(terms) => {
            let is_or = matches!(query, FulltextQuery::Or(_));
            buf.push('(');
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    buf.push(' ');
                    buf.push_str(if is_or {
                        &syntax.or
                    } else if term.is_negated() {
                        &syntax.and_not
                    } else {
                        &syntax.and
                    });
                    buf.push(' ');
                }
                translate_into(term, syntax, buf);
            }
            buf.push(')');
        }
        FulltextQuery::Word(word) | FulltextQuery::NotWord(word) => {
            let word = word.to_lowercase();
            if !query.is_phrase() {
                append_word(buf, &word, syntax);
            } else if syntax.quote_phrase_words {
                for (i, w) in word.split(' ').enumerate() {
                    if i > 0 {
                        buf.push(' ');
                    }
                    append_word(buf, w, syntax);
                }
            } else {
                buf.push_str(&syntax.phrase_start);
                buf.push_str(&word.replace(' ', &syntax.phrase_separator));
                buf.push_str(&syntax.phrase_end);
            }
        }
    }
}

fn append_word(buf: &mut String, word: &str, syntax: &TranslationSyntax) {
    let quote = !word.chars().any(|c| syntax.reserved_chars.contains(&c));
    if quote {
        buf.push_str(&syntax.word_start);
    }
    buf.push_str(word);
    if quote {
        buf.push_str(&syntax.word_end);
    }
}
