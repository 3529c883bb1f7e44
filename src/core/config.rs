use serde::{Deserialize, Serialize};
use crate::core::error::Result;
use crate::state::copy::DEFAULT_MAX_DEPTH;

/// How the `ecm:isTrashed` pseudo-property is represented in stored documents.
/// Exactly one applies for the lifetime of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashStrategy {
    /// Trashed means the lifecycle state is `deleted`.
    Lifecycle,
    /// Either the lifecycle state or the dedicated flag marks a document trashed.
    Migration,
    /// Trashed means the boolean `ecm:isTrashed` property is true.
    #[default]
    DedicatedProperty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FulltextConfig {
    pub disabled: bool,
    pub min_word_length: usize,     // shorter candidate words are dropped
    pub stop_words: Vec<String>,
    pub plural_stripping: bool,     // naive trailing-`s` removal
}

impl Default for FulltextConfig {
    fn default() -> Self {
        FulltextConfig {
            disabled: false,
            min_word_length: 3,
            stop_words: default_stop_words(),
            plural_stripping: true,
        }
    }
}

pub fn default_stop_words() -> Vec<String> {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for",
        "from", "has", "he", "if", "in", "into", "is", "it", "its", "no",
        "not", "of", "on", "or", "such", "that", "the", "their", "then",
        "there", "these", "they", "this", "to", "was", "will", "with",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub default_batch_size: usize,
    pub default_keep_alive_secs: u64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        CursorConfig {
            default_batch_size: 100,
            default_keep_alive_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trash_strategy: TrashStrategy,
    pub fulltext: FulltextConfig,
    pub cursor: CursorConfig,
    pub like_cache_size: usize,      // compiled LIKE patterns kept per evaluator
    pub max_nesting_depth: usize,    // copy/diff/apply refuse deeper states
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trash_strategy: TrashStrategy::default(),
            fulltext: FulltextConfig::default(),
            cursor: CursorConfig::default(),
            like_cache_size: 256,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Missing keys fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"trash_strategy": "lifecycle", "cursor": {"default_batch_size": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.trash_strategy, TrashStrategy::Lifecycle);
        assert_eq!(config.cursor.default_batch_size, 10);
        assert_eq!(config.cursor.default_keep_alive_secs, 60);
        assert_eq!(config.fulltext.min_word_length, 3);
        assert!(config.fulltext.stop_words.contains(&"the".to_string()));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(EngineConfig::from_json_str(r#"{"trash_strategy": "guess"}"#).is_err());
    }
}
