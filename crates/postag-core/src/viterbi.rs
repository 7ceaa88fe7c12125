//! # Viterbi Decoding
//!
//! Finds the most probable tag sequence for one sentinel-wrapped sentence
//! under a trained [`HmmModel`].

use crate::error::{PosTagError, Result};
use crate::model::HmmModel;
use crate::tables::{EmissionTable, TransitionTable};

/// Viterbi decoder for bigram HMM tag sequences.
#[derive(Debug, Clone)]
pub struct ViterbiDecoder {
    num_tags: usize,
}

/// The best tag path through a sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    /// Tag indices for token positions `1..T`; position 0 is the start
    /// sentinel and is not included.
    pub tags: Vec<usize>,
    /// Cumulative log-probability of the path.
    pub score: f64,
}

impl ViterbiDecoder {
    /// Create a new Viterbi decoder.
    ///
    /// # Arguments
    /// * `num_tags` - Size of the tag inventory
    pub fn new(num_tags: usize) -> Self {
        Self { num_tags }
    }

    /// Create a decoder sized for `model`.
    pub fn for_model(model: &HmmModel) -> Self {
        Self::new(model.num_tags())
    }

    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    /// Decode the optimal tag sequence for `tokens`.
    ///
    /// `tokens` is a sentinel-wrapped sentence whose first token stands for
    /// the start marker. Words without an emission column are scored with
    /// the unknown-word column.
    ///
    /// # Returns
    /// Tag indices for positions `1..tokens.len()`.
    pub fn decode<S: AsRef<str>>(&self, model: &HmmModel, tokens: &[S]) -> Result<Vec<usize>> {
        Ok(self.decode_with_score(model, tokens)?.tags)
    }

    /// Decode `tokens` and also report the best path score.
    pub fn decode_with_score<S: AsRef<str>>(
        &self,
        model: &HmmModel,
        tokens: &[S],
    ) -> Result<ViterbiPath> {
        let emissions = model.emissions();
        let columns: Vec<usize> = tokens
            .iter()
            .map(|token| emissions.column(token.as_ref()))
            .collect();

        self.decode_columns(model.transitions(), emissions, &columns)
    }

    /// Decode a sentence already mapped to emission columns.
    pub fn decode_columns(
        &self,
        transitions: &TransitionTable,
        emissions: &EmissionTable,
        columns: &[usize],
    ) -> Result<ViterbiPath> {
        let num_tags = self.num_tags;

        // Validate dimensions
        if transitions.num_tags() != num_tags || emissions.num_tags() != num_tags {
            return Err(PosTagError::ModelShapeMismatch(format!(
                "decoder expects {} tags, model tables cover {} and {}",
                num_tags,
                transitions.num_tags(),
                emissions.num_tags()
            )));
        }
        if let Some(&column) = columns.iter().find(|&&c| c >= emissions.num_columns()) {
            return Err(PosTagError::ShapeMismatch(format!(
                "emission column {} out of range ({} columns)",
                column,
                emissions.num_columns()
            )));
        }

        let seq_len = columns.len();
        if seq_len == 0 {
            return Err(PosTagError::EmptySentence);
        }

        // memo[pos * num_tags + tag]: best score of a path ending in `tag` at
        // `pos`. Position 0 is the start sentinel, certain for every tag.
        let mut memo = vec![0.0f64; seq_len * num_tags];
        let mut backptr = vec![0usize; seq_len * num_tags];

        // Forward pass
        for pos in 1..seq_len {
            let (done, rest) = memo.split_at_mut(pos * num_tags);
            let prev_scores = &done[(pos - 1) * num_tags..];
            let curr_scores = &mut rest[..num_tags];
            let column = columns[pos];

            for curr_tag in 0..num_tags {
                let emission = emissions.score(curr_tag, column);
                let mut best_score = f64::NEG_INFINITY;
                let mut best_prev = 0;

                for (prev_tag, &prev_score) in prev_scores.iter().enumerate() {
                    let score = prev_score + transitions.score(prev_tag, curr_tag) + emission;

                    // Strict comparison keeps the lowest-indexed maximiser.
                    if score > best_score {
                        best_score = score;
                        best_prev = prev_tag;
                    }
                }

                curr_scores[curr_tag] = best_score;
                backptr[pos * num_tags + curr_tag] = best_prev;
            }
        }

        // Find best final tag
        let last = &memo[(seq_len - 1) * num_tags..];
        let mut best_final_tag = 0;
        let mut best_final_score = f64::NEG_INFINITY;
        for (tag, &score) in last.iter().enumerate() {
            if score > best_final_score {
                best_final_score = score;
                best_final_tag = tag;
            }
        }

        if seq_len == 1 {
            return Ok(ViterbiPath {
                tags: Vec::new(),
                score: best_final_score,
            });
        }

        // Backtrack from the last position down to position 1
        let mut path = Vec::with_capacity(seq_len - 1);
        let mut curr_tag = best_final_tag;
        path.push(curr_tag);

        for pos in (2..seq_len).rev() {
            curr_tag = backptr[pos * num_tags + curr_tag];
            path.push(curr_tag);
        }

        path.reverse();
        Ok(ViterbiPath {
            tags: path,
            score: best_final_score,
        })
    }
}
