use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Drops words shorter than `min_length` characters.
#[derive(Clone, Copy)]
pub struct MinLengthFilter {
    pub min_length: usize,
}

impl MinLengthFilter {
    pub fn new(min_length: usize) -> Self {
        MinLengthFilter { min_length }
    }
}

impl TokenFilter for MinLengthFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .filter(|token| token.text.chars().count() >= self.min_length)
            .collect()
    }

    fn name(&self) -> &str {
        "min_length"
    }

    fn clone_box(&self) -> Box<dyn TokenFilter> {
        Box::new(*self)
    }
}
