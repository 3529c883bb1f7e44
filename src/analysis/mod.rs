pub mod token;
pub mod tokenizer;
pub mod filter;
pub mod filters;
pub mod analyzer;
pub mod fulltext;
pub mod translate;
pub mod matcher;
