use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::fold::FoldFilter;
use crate::analysis::filters::length::MinLengthFilter;
use crate::analysis::filters::plural::PluralFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use crate::core::config::FulltextConfig;

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Normalized words only, in source order.
    pub fn words(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|t| t.text).collect()
    }

    /// Word normalization used by the in-memory fulltext matcher: fold, drop
    /// stop words, strip plurals, drop short words.
    pub fn fulltext(config: &FulltextConfig) -> Self {
        let mut analyzer = Analyzer::new("fulltext".to_string(),
                                         Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(FoldFilter))
            .add_filter(Box::new(StopWordFilter::new(config.stop_words.clone())));
        if config.plural_stripping {
            analyzer = analyzer.add_filter(Box::new(PluralFilter::default()));
        }
        analyzer.add_filter(Box::new(MinLengthFilter::new(config.min_word_length)))
    }

    /// Prefix term normalization: fold and strip plurals the way candidate
    /// words are, without dropping stop words or short words.
    pub fn prefix(config: &FulltextConfig) -> Self {
        let analyzer = Analyzer::new("prefix".to_string(), Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(FoldFilter));
        if config.plural_stripping {
            analyzer.add_filter(Box::new(PluralFilter::default()))
        } else {
            analyzer
        }
    }
}

impl Clone for Analyzer {
    fn clone(&self) -> Self {
        Analyzer {
            tokenizer: self.tokenizer.clone_box(),
            filters: self.filters.iter().map(|f| f.clone_box()).collect(),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|f| f.name()).collect();
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &filters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulltext_pipeline_normalizes_words() {
        let analyzer = Analyzer::fulltext(&FulltextConfig::default());
        assert_eq!(
            analyzer.words("The Élèves read two Reports at noon"),
            ["eleve", "read", "two", "report", "noon"]
        );
    }

    #[test]
    fn plural_stripping_can_be_disabled() {
        let config = FulltextConfig {
            plural_stripping: false,
            ..FulltextConfig::default()
        };
        assert_eq!(Analyzer::fulltext(&config).words("reports"), ["reports"]);
        assert_eq!(Analyzer::prefix(&config).words("Reports"), ["reports"]);
    }

    #[test]
    fn prefix_pipeline_keeps_short_words() {
        let analyzer = Analyzer::prefix(&FulltextConfig::default());
        assert_eq!(analyzer.words("The Élèves"), ["the", "eleve"]);
    }
}
