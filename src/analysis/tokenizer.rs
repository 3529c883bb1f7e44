use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

/// Splits on Unicode word boundaries, then again on any non-alphanumeric
/// character so that `report.pdf` or `jean-luc` yield two words each.
#[derive(Clone)]
pub struct StandardTokenizer {
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (start, word) in text.unicode_word_indices() {
            let mut part_start = None;
            let bounded = word.char_indices().chain(std::iter::once((word.len(), ' ')));
            for (i, c) in bounded {
                if c.is_alphanumeric() {
                    part_start.get_or_insert(i);
                } else if let Some(s) = part_start.take() {
                    let part = &word[s..i];
                    if part.len() <= self.max_token_length {
                        tokens.push(Token::new(part.to_string(), position, start + s));
                        position += 1;
                    }
                }
            }
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_inside_words() {
        let tokens = StandardTokenizer::default().tokenize("See report.pdf, page 12!");
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, ["See", "report", "pdf", "page", "12"]);
        assert_eq!(tokens[2].offset, 11);
        assert_eq!(tokens[4].position, 4);
    }
}
