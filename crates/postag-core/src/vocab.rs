//! # Vocabulary
//!
//! Word and tag frequency tables gathered in one pass over a labelled pair
//! stream.

use std::collections::HashMap;

use crate::corpus::LabelledPair;
use crate::error::{PosTagError, Result};

/// Word and tag occurrence counts from a training corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    word_counts: HashMap<String, usize>,
    tag_counts: Vec<usize>,
}

impl Vocabulary {
    /// Count words and tags in `pairs`.
    ///
    /// `num_tags` is the size of the tag inventory; every tag gets an entry,
    /// so an empty corpus yields all-zero tag counts. A pair whose tag index
    /// falls outside the inventory is a [`PosTagError::ShapeMismatch`].
    pub fn build(pairs: &[LabelledPair], num_tags: usize) -> Result<Self> {
        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut tag_counts = vec![0usize; num_tags];

        for (i, pair) in pairs.iter().enumerate() {
            let count = tag_counts.get_mut(pair.tag).ok_or_else(|| {
                PosTagError::ShapeMismatch(format!(
                    "pair {} carries tag index {}, inventory has {} tags",
                    i, pair.tag, num_tags
                ))
            })?;
            *count += 1;
            *word_counts.entry(pair.word.clone()).or_default() += 1;
        }

        Ok(Self {
            word_counts,
            tag_counts,
        })
    }

    /// Occurrences of the tag at `tag`, zero if unseen.
    pub fn tag_count(&self, tag: usize) -> usize {
        self.tag_counts.get(tag).copied().unwrap_or(0)
    }

    pub fn tag_counts(&self) -> &[usize] {
        &self.tag_counts
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_counts.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.word_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_counts.is_empty()
    }

    /// Total number of tagged tokens.
    pub fn total_tags(&self) -> usize {
        self.tag_counts.iter().sum()
    }

    /// Distinct words in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.word_counts.keys().map(String::as_str)
    }
}
