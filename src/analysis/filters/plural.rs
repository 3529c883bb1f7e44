use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Naive English plural removal: drops one trailing `s` from words longer
/// than `min_length` characters.
#[derive(Clone, Copy)]
pub struct PluralFilter {
    pub min_length: usize,
}

impl Default for PluralFilter {
    fn default() -> Self {
        PluralFilter { min_length: 3 }
    }
}

impl PluralFilter {
    pub fn strip<'a>(&self, word: &'a str) -> &'a str {
        if word.chars().count() > self.min_length {
            word.strip_suffix('s').unwrap_or(word)
        } else {
            word
        }
    }
}

impl TokenFilter for PluralFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .map(|mut token| {
                let stripped = self.strip(&token.text);
                if stripped.len() != token.text.len() {
                    token.text.truncate(stripped.len());
                }
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "plural"
    }

    fn clone_box(&self) -> Box<dyn TokenFilter> {
        Box::new(*self)
    }
}
