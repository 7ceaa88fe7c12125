//! # Probability Tables
//!
//! Dense log-probability matrices indexed by tag position (and, for
//! emissions, by word column). Zero probabilities are stored as
//! [`log_floor`] instead of negative infinity so that every path score in
//! the decoder stays finite and totally ordered.

use std::collections::HashMap;

use crate::error::{PosTagError, Result};

/// Natural log of the smallest positive normal `f64`.
///
/// Stands in for `ln(0)`. Sums of floored values remain finite.
pub fn log_floor() -> f64 {
    f64::MIN_POSITIVE.ln()
}

/// Natural log of `probability`, or [`log_floor`] when it is not positive.
pub fn log_prob(probability: f64) -> f64 {
    if probability > 0.0 {
        probability.ln()
    } else {
        log_floor()
    }
}

fn check_finite(scores: &[f64], table: &str) -> Result<()> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(i) => Err(PosTagError::ModelShapeMismatch(format!(
            "{} table holds a non-finite value at offset {}",
            table, i
        ))),
        None => Ok(()),
    }
}

/// `ln P(tag_i | tag_{i-1})`, row = previous tag, column = current tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    num_tags: usize,
    scores: Vec<f64>,
}

impl TransitionTable {
    /// Wrap a row-major `num_tags × num_tags` score matrix.
    pub fn from_scores(num_tags: usize, scores: Vec<f64>) -> Result<Self> {
        if scores.len() != num_tags * num_tags {
            return Err(PosTagError::ModelShapeMismatch(format!(
                "transition table has {} entries, expected {}x{}",
                scores.len(),
                num_tags,
                num_tags
            )));
        }
        check_finite(&scores, "transition")?;
        Ok(Self { num_tags, scores })
    }

    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    /// Log-probability of moving from `prev` to `curr`.
    #[inline]
    pub fn score(&self, prev: usize, curr: usize) -> f64 {
        self.scores[prev * self.num_tags + curr]
    }

    /// All transitions out of `prev`.
    pub fn row(&self, prev: usize) -> &[f64] {
        &self.scores[prev * self.num_tags..(prev + 1) * self.num_tags]
    }
}

/// `ln P(word | tag)`, row = tag, column = word or the unknown-word symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionTable {
    num_tags: usize,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    unknown: usize,
    scores: Vec<f64>,
}

impl EmissionTable {
    /// Wrap a row-major `num_tags × columns.len()` score matrix.
    ///
    /// `columns` must be distinct and must contain `unknown_word`.
    pub fn from_scores(
        num_tags: usize,
        columns: Vec<String>,
        unknown_word: &str,
        scores: Vec<f64>,
    ) -> Result<Self> {
        let mut column_index = HashMap::with_capacity(columns.len());
        for (i, word) in columns.iter().enumerate() {
            if column_index.insert(word.clone(), i).is_some() {
                return Err(PosTagError::ModelShapeMismatch(format!(
                    "emission column {:?} appears twice",
                    word
                )));
            }
        }

        let unknown = column_index.get(unknown_word).copied().ok_or_else(|| {
            PosTagError::ModelShapeMismatch(format!(
                "emission table has no {:?} column",
                unknown_word
            ))
        })?;

        if scores.len() != num_tags * columns.len() {
            return Err(PosTagError::ModelShapeMismatch(format!(
                "emission table has {} entries, expected {}x{}",
                scores.len(),
                num_tags,
                columns.len()
            )));
        }
        check_finite(&scores, "emission")?;

        Ok(Self {
            num_tags,
            columns,
            column_index,
            unknown,
            scores,
        })
    }

    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    /// Number of word columns, the unknown-word column included.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column words in index order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of the unknown-word column.
    pub fn unknown_column(&self) -> usize {
        self.unknown
    }

    /// The unknown-word symbol.
    pub fn unknown_word(&self) -> &str {
        &self.columns[self.unknown]
    }

    /// Column of `word` if it was seen in training.
    pub fn known_column(&self, word: &str) -> Option<usize> {
        self.column_index.get(word).copied()
    }

    /// Column of `word`, falling back to the unknown-word column.
    pub fn column(&self, word: &str) -> usize {
        self.known_column(word).unwrap_or(self.unknown)
    }

    /// Log-probability of `tag` emitting the word at `column`.
    #[inline]
    pub fn score(&self, tag: usize, column: usize) -> f64 {
        self.scores[tag * self.columns.len() + column]
    }

    /// All emissions of `tag`.
    pub fn row(&self, tag: usize) -> &[f64] {
        let width = self.columns.len();
        &self.scores[tag * width..(tag + 1) * width]
    }
}
