//! # Probability Model Estimator
//!
//! Turns a labelled pair stream into transition and emission log-probability
//! tables.
//!
//! Transitions are maximum-likelihood bigram estimates over the whole stream,
//! sentence boundaries included. Emissions are smoothed by a single
//! pseudo-count on the unknown-word column of every tag, which is added to
//! the row total before normalising so each row remains a distribution.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::ModelConfig;
use crate::corpus::LabelledPair;
use crate::error::{PosTagError, Result};
use crate::model::HmmModel;
use crate::tables::{log_prob, EmissionTable, TransitionTable};
use crate::vocab::Vocabulary;

/// Pseudo-count given to the unknown-word column of every tag.
const UNKNOWN_PSEUDO_COUNT: usize = 1;

/// Builds an [`HmmModel`] from labelled training pairs.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    config: ModelConfig,
}

impl Estimator {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Count the vocabulary of `pairs` and estimate a model from it.
    pub fn estimate(&self, pairs: &[LabelledPair]) -> Result<HmmModel> {
        let vocab = Vocabulary::build(pairs, self.config.tagset.len())?;
        self.estimate_with_vocabulary(pairs, &vocab)
    }

    /// Estimate a model from `pairs` using precomputed counts.
    ///
    /// `vocab` must have been built from `pairs`: a missing word or a tag
    /// count that disagrees with the pairs is a [`PosTagError::ShapeMismatch`].
    pub fn estimate_with_vocabulary(
        &self,
        pairs: &[LabelledPair],
        vocab: &Vocabulary,
    ) -> Result<HmmModel> {
        let num_tags = self.config.tagset.len();
        if vocab.tag_counts().len() != num_tags {
            return Err(PosTagError::ShapeMismatch(format!(
                "vocabulary counts {} tags, inventory has {}",
                vocab.tag_counts().len(),
                num_tags
            )));
        }
        check_pairs(pairs, vocab, num_tags)?;

        let transitions = self.transition_table(pairs)?;
        let emissions = self.emission_table(pairs, vocab)?;

        debug!(
            pairs = pairs.len(),
            tokens = vocab.total_tags(),
            words = vocab.len(),
            columns = emissions.num_columns(),
            "estimated model tables"
        );

        HmmModel::from_tables(self.config.tagset.clone(), transitions, emissions)
    }

    fn transition_table(&self, pairs: &[LabelledPair]) -> Result<TransitionTable> {
        let num_tags = self.config.tagset.len();
        let mut counts = vec![0usize; num_tags * num_tags];

        for window in pairs.windows(2) {
            counts[window[0].tag * num_tags + window[1].tag] += 1;
        }

        let mut scores = Vec::with_capacity(counts.len());
        for row in counts.chunks(num_tags) {
            // Times this tag was followed by anything: its frequency, less
            // one if it closes the stream.
            let outgoing: usize = row.iter().sum();
            scores.extend(row.iter().map(|&count| {
                if outgoing == 0 {
                    log_prob(0.0)
                } else {
                    log_prob(count as f64 / outgoing as f64)
                }
            }));
        }

        TransitionTable::from_scores(num_tags, scores)
    }

    fn emission_table(&self, pairs: &[LabelledPair], vocab: &Vocabulary) -> Result<EmissionTable> {
        let num_tags = self.config.tagset.len();
        let unknown_word = self.config.unknown_word.as_str();

        let columns: Vec<String> = vocab
            .words()
            .chain(std::iter::once(unknown_word))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();
        let column_of = |word: &str| {
            columns
                .binary_search_by(|c| c.as_str().cmp(word))
                .map_err(|_| {
                    PosTagError::ShapeMismatch(format!("no emission column for {:?}", word))
                })
        };
        let unknown = column_of(unknown_word)?;

        let mut counts = vec![0usize; num_tags * width];
        for pair in pairs {
            counts[pair.tag * width + column_of(&pair.word)?] += 1;
        }
        for tag in 0..num_tags {
            counts[tag * width + unknown] += UNKNOWN_PSEUDO_COUNT;
        }

        let mut scores = Vec::with_capacity(counts.len());
        for (tag, row) in counts.chunks(width).enumerate() {
            let total = (vocab.tag_count(tag) + UNKNOWN_PSEUDO_COUNT) as f64;
            scores.extend(row.iter().map(|&count| log_prob(count as f64 / total)));
        }

        EmissionTable::from_scores(num_tags, columns, unknown_word, scores)
    }
}

/// Every pair must carry an in-range tag and a word from `vocab`, and the
/// per-tag totals of `vocab` must be those of `pairs`.
fn check_pairs(pairs: &[LabelledPair], vocab: &Vocabulary, num_tags: usize) -> Result<()> {
    let mut tag_counts = vec![0usize; num_tags];
    for (i, pair) in pairs.iter().enumerate() {
        if pair.tag >= num_tags {
            return Err(PosTagError::ShapeMismatch(format!(
                "pair {} carries tag index {}, inventory has {} tags",
                i, pair.tag, num_tags
            )));
        }
        if !vocab.contains(&pair.word) {
            return Err(PosTagError::ShapeMismatch(format!(
                "pair {} word {:?} is missing from the vocabulary",
                i, pair.word
            )));
        }
        tag_counts[pair.tag] += 1;
    }

    if tag_counts != vocab.tag_counts() {
        return Err(PosTagError::ShapeMismatch(
            "vocabulary tag counts disagree with the training pairs".to_string(),
        ));
    }
    Ok(())
}
