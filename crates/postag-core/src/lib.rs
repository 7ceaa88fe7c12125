//! # Postag Core
//!
//! Bigram hidden Markov model part-of-speech tagging: estimates transition
//! and emission log-probability tables from a `word/TAG` corpus and decodes
//! new sentences with the Viterbi algorithm.
//!
//! ## Quick Start
//!
//! ```rust
//! use postag_core::{parse_labelled_document, Estimator, ModelConfig, PosTagger, TaggerConfig};
//!
//! let config = ModelConfig::new();
//! let pairs = parse_labelled_document("the/DT dog/NN barks/VBZ", &config.tagset).unwrap();
//! let model = Estimator::new(config).estimate(&pairs).unwrap();
//!
//! let tagger = PosTagger::new(model, TaggerConfig::new());
//! let tagged = tagger.tag_sentence("the dog barks").unwrap();
//! let tags: Vec<_> = tagged.iter().map(|t| t.tag.as_str()).collect();
//! assert_eq!(tags, vec!["DT", "NN", "VBZ"]);
//! ```
pub mod config;
pub mod corpus;
pub mod error;
pub mod estimator;
pub mod evaluation;
pub mod model;
pub mod tables;
pub mod tagger;
pub mod tags;
pub mod viterbi;
pub mod vocab;

// Re-export primary API
pub use config::{ModelConfig, TaggerConfig, UNKNOWN_WORD};
pub use corpus::{
    parse_labelled_document, parse_labelled_sentences, split_sentences, wrap_sentence,
    LabelledPair, LabelledSentence, TokenizeMode, Tokenizer,
};
pub use error::{PosTagError, Result};
pub use estimator::Estimator;
pub use evaluation::{accuracy, Evaluation};
pub use model::HmmModel;
pub use tables::{log_floor, log_prob, EmissionTable, TransitionTable};
pub use tagger::{format_sentence, PosTagger, TaggedWord};
pub use tags::{TagSet, END_MARKER, START_MARKER};
pub use viterbi::{ViterbiDecoder, ViterbiPath};
pub use vocab::Vocabulary;
