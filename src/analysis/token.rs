use serde::{Serialize, Deserialize};

/// A word cut out of fulltext source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,      // normalized form once filters ran
    pub position: u32,     // index among the words of the source text
    pub offset: usize,     // byte offset in the source text
}

impl Token {
    pub fn new(text: String, position: u32, offset: usize) -> Self {
        Token {
            text,
            position,
            offset,
        }
    }
}
