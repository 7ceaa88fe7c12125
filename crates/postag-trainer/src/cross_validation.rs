//! K-fold cross-validation of the HMM tagger.

use std::ops::Range;

use anyhow::{bail, Context};
use postag_core::corpus::flatten_sentences;
use postag_core::{
    parse_labelled_sentences, Estimator, Evaluation, LabelledSentence, ModelConfig, PosTagger,
    TaggerConfig,
};
use serde::Serialize;
use tracing::info;

use crate::trainer::evaluate_sentences;

/// Default number of folds.
pub const DEFAULT_FOLDS: usize = 10;

/// Outcome of one fold.
#[derive(Debug, Clone, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_sentences: usize,
    pub test_sentences: usize,
    pub accuracy: f64,
}

/// Outcome of a full cross-validation run.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationReport {
    pub folds: Vec<FoldResult>,
    /// All folds' predictions scored together.
    pub evaluation: Evaluation,
}

impl CrossValidationReport {
    /// Unweighted mean of the per-fold accuracies.
    pub fn mean_accuracy(&self) -> f64 {
        if self.folds.is_empty() {
            return 0.0;
        }
        self.folds.iter().map(|f| f.accuracy).sum::<f64>() / self.folds.len() as f64
    }
}

/// Splits a labelled corpus into folds, trains on all but one and tags the
/// held-out fold, for each fold in turn.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    folds: usize,
    shuffle_seed: Option<u64>,
    config: ModelConfig,
    tagger_config: TaggerConfig,
}

impl CrossValidator {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            folds: DEFAULT_FOLDS,
            shuffle_seed: None,
            config,
            tagger_config: TaggerConfig::new(),
        }
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Shuffle sentences with this seed before folding.
    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    pub fn with_tagger_config(mut self, tagger_config: TaggerConfig) -> Self {
        self.tagger_config = tagger_config;
        self
    }

    /// Test ranges for each fold over `num_sentences` sentences.
    ///
    /// Every fold holds `num_sentences / folds` sentences; the remainder
    /// always stays in training.
    pub fn fold_ranges(&self, num_sentences: usize) -> anyhow::Result<Vec<Range<usize>>> {
        if self.folds < 2 {
            bail!("cross-validation needs at least 2 folds, got {}", self.folds);
        }
        let size = num_sentences / self.folds;
        if size == 0 {
            bail!(
                "{} sentences are too few for {} folds",
                num_sentences,
                self.folds
            );
        }
        Ok((0..self.folds).map(|i| i * size..(i + 1) * size).collect())
    }

    /// Cross-validate on the text of a labelled corpus.
    pub fn validate_str(&self, corpus: &str) -> anyhow::Result<CrossValidationReport> {
        let sentences = parse_labelled_sentences(corpus, &self.config.tagset)
            .context("failed to parse cross-validation corpus")?;
        self.validate(sentences)
    }

    /// Cross-validate on parsed sentences.
    pub fn validate(
        &self,
        mut sentences: Vec<LabelledSentence>,
    ) -> anyhow::Result<CrossValidationReport> {
        if let Some(seed) = self.shuffle_seed {
            shuffle(&mut sentences, seed);
        }

        let ranges = self.fold_ranges(sentences.len())?;
        let estimator = Estimator::new(self.config.clone());
        let tagset = &self.config.tagset;

        let mut folds = Vec::with_capacity(ranges.len());
        let mut evaluation = Evaluation::new();

        for (fold, range) in ranges.into_iter().enumerate() {
            let mut pairs = flatten_sentences(&sentences[..range.start], tagset);
            pairs.extend(flatten_sentences(&sentences[range.end..], tagset));

            let model = estimator.estimate(&pairs)?;
            let tagger = PosTagger::new(model, self.tagger_config.clone());
            let fold_eval = evaluate_sentences(&tagger, &sentences[range.clone()])?;

            info!(
                fold = fold + 1,
                folds = self.folds,
                accuracy = fold_eval.accuracy(),
                "fold complete"
            );

            folds.push(FoldResult {
                fold,
                train_sentences: sentences.len() - range.len(),
                test_sentences: range.len(),
                accuracy: fold_eval.accuracy(),
            });
            evaluation.merge(&fold_eval);
        }

        Ok(CrossValidationReport { folds, evaluation })
    }
}

/// Fisher-Yates shuffle driven by a seeded PCG generator.
fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = oorandom::Rand64::new(u128::from(seed));
    for i in (1..items.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(sentences: usize) -> String {
        (0..sentences)
            .map(|i| match i % 3 {
                0 => "the/DT dog/NN barks/VBZ ./.",
                1 => "a/DT cat/NN sleeps/VBZ ./.",
                _ => "dogs/NNS bark/VBP ./.",
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_fold_ranges() {
        let validator = CrossValidator::new(ModelConfig::new()).with_folds(4);
        let ranges = validator.fold_ranges(10).unwrap();
        assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_fold_ranges_partition_once() {
        let validator = CrossValidator::new(ModelConfig::new());
        let ranges = validator.fold_ranges(100).unwrap();
        let mut seen = vec![0; 100];
        for range in ranges {
            for i in range {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_too_few_sentences() {
        let validator = CrossValidator::new(ModelConfig::new());
        assert!(validator.fold_ranges(9).is_err());
        assert!(validator.clone().with_folds(1).fold_ranges(100).is_err());
    }

    #[test]
    fn test_validate() {
        let validator = CrossValidator::new(ModelConfig::new()).with_folds(3);
        let report = validator.validate_str(&corpus(12)).unwrap();

        assert_eq!(report.folds.len(), 3);
        for fold in &report.folds {
            assert_eq!(fold.test_sentences, 4);
            assert_eq!(fold.train_sentences, 8);
            assert_eq!(fold.accuracy, 1.0);
        }
        assert_eq!(report.evaluation.total, 44);
        assert_eq!(report.mean_accuracy(), 1.0);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let mut a: Vec<usize> = (0..50).collect();
        let mut b = a.clone();
        shuffle(&mut a, 7);
        shuffle(&mut b, 7);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
