//! # Postag Trainer
//!
//! Batch training of the HMM tagger from a labelled corpus, dev-set
//! evaluation, and k-fold cross-validation.

pub mod cross_validation;
pub mod trainer;

pub use cross_validation::{CrossValidationReport, CrossValidator, FoldResult, DEFAULT_FOLDS};
pub use trainer::{
    build_tagger, evaluate_path, evaluate_sentences, load_config, train_from_path,
    train_from_str,
};
