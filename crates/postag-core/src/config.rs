//! # Configuration
//!
//! Immutable settings threaded through the estimator, the model loader and
//! the tagger driver.

use crate::tags::TagSet;

/// Default out-of-vocabulary symbol.
pub const UNKNOWN_WORD: &str = "<UNK>";

/// Settings shared by training and decoding.
///
/// The same configuration must be used on both sides: a model trained with
/// one tag inventory or unknown-word symbol is rejected when loaded with
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Closed tag inventory, sentinels included
    pub tagset: TagSet,
    /// Column standing in for words never seen in training
    pub unknown_word: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            tagset: TagSet::penn_treebank(),
            unknown_word: UNKNOWN_WORD.to_string(),
        }
    }
}

impl ModelConfig {
    /// Create a configuration with the Penn Treebank inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different tag inventory.
    pub fn with_tagset(mut self, tagset: TagSet) -> Self {
        self.tagset = tagset;
        self
    }

    /// Use a different out-of-vocabulary symbol.
    pub fn with_unknown_word(mut self, unknown_word: impl Into<String>) -> Self {
        self.unknown_word = unknown_word.into();
        self
    }
}

/// Settings for the sentence-level tagging driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggerConfig {
    /// Decode sentences on the rayon thread pool
    pub parallel: bool,
    /// Reject sentences longer than this many tokens (sentinels included)
    pub max_sentence_tokens: Option<usize>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_sentence_tokens: None,
        }
    }
}

impl TaggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel decoding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Bound the number of tokens per sentence. Zero is treated as no bound.
    pub fn with_max_sentence_tokens(mut self, limit: usize) -> Self {
        self.max_sentence_tokens = (limit > 0).then_some(limit);
        self
    }
}
