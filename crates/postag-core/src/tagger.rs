//! # Tagger
//!
//! Sentence-level driver around the [`ViterbiDecoder`]: tokenizes, wraps
//! sentences in sentinels, decodes and formats `word/TAG` output.

use std::fmt;

use rayon::prelude::*;
use tracing::info;

use crate::config::TaggerConfig;
use crate::corpus::{split_sentences, wrap_sentence, Tokenizer};
use crate::error::{PosTagError, Result};
use crate::model::HmmModel;
use crate::viterbi::ViterbiDecoder;

/// A word with its predicted tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedWord {
    pub word: String,
    pub tag: String,
}

impl fmt::Display for TaggedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.word, self.tag)
    }
}

/// Part-of-speech tagger over a trained model.
///
/// Sentences are decoded independently against the shared read-only model,
/// so batches can be spread across the rayon thread pool.
#[derive(Debug, Clone)]
pub struct PosTagger {
    model: HmmModel,
    decoder: ViterbiDecoder,
    tokenizer: Tokenizer,
    config: TaggerConfig,
}

impl PosTagger {
    /// Create a tagger with whitespace tokenization.
    pub fn new(model: HmmModel, config: TaggerConfig) -> Self {
        let decoder = ViterbiDecoder::for_model(&model);
        Self {
            model,
            decoder,
            tokenizer: Tokenizer::default(),
            config,
        }
    }

    /// Use a different tokenizer for raw sentences.
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn model(&self) -> &HmmModel {
        &self.model
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Tag indices for `words`, one per word, sentinels excluded.
    pub fn tag_indices<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<usize>> {
        let tagset = self.model.tagset();
        let len = words.len() + 2;
        if let Some(limit) = self.config.max_sentence_tokens {
            if len > limit {
                return Err(PosTagError::SentenceTooLong { len, limit });
            }
        }

        let tokens = wrap_sentence(words, tagset);
        let mut tags = self.decoder.decode(&self.model, &tokens)?;
        // The last position belongs to the end sentinel.
        tags.truncate(words.len());
        Ok(tags)
    }

    /// Tag pre-split `words`.
    pub fn tag_words<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<TaggedWord>> {
        let tagset = self.model.tagset();
        let tags = self.tag_indices(words)?;

        Ok(words
            .iter()
            .zip(tags)
            .map(|(word, tag)| TaggedWord {
                word: word.as_ref().to_string(),
                tag: tagset.name(tag).unwrap_or_default().to_string(),
            })
            .collect())
    }

    /// Tokenize and tag one sentence.
    pub fn tag_sentence(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
        let words = self.tokenizer.words(sentence);
        self.tag_words(&words)
    }

    /// Tag many sentences. Output order matches input order; the first
    /// failure aborts the whole batch.
    pub fn tag_sentences<S: AsRef<str> + Sync>(
        &self,
        sentences: &[S],
    ) -> Result<Vec<Vec<TaggedWord>>> {
        if self.config.parallel {
            sentences
                .par_iter()
                .map(|sentence| self.tag_sentence(sentence.as_ref()))
                .collect()
        } else {
            sentences
                .iter()
                .map(|sentence| self.tag_sentence(sentence.as_ref()))
                .collect()
        }
    }

    /// Tag many pre-split sentences, returning tag indices.
    pub fn tag_index_batch<S: AsRef<str> + Sync>(
        &self,
        batch: &[Vec<S>],
    ) -> Result<Vec<Vec<usize>>> {
        if self.config.parallel {
            batch.par_iter().map(|words| self.tag_indices(words)).collect()
        } else {
            batch.iter().map(|words| self.tag_indices(words)).collect()
        }
    }

    /// Tag a newline-delimited document and format it as `word/TAG` lines.
    pub fn tag_document(&self, document: &str) -> Result<String> {
        let sentences = split_sentences(document);
        let tagged = self.tag_sentences(&sentences)?;
        info!(sentences = tagged.len(), "tagged document");

        Ok(tagged
            .iter()
            .map(|sentence| format_sentence(sentence))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Space-join `word/TAG` pairs.
pub fn format_sentence(sentence: &[TaggedWord]) -> String {
    sentence
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::corpus::{parse_labelled_document, TokenizeMode};
    use crate::estimator::Estimator;

    const CORPUS: &str = "the/DT dog/NN barks/VBZ ./.\n\
                          a/DT cat/NN sleeps/VBZ ./.\n\
                          the/DT cat/NN saw/VBD a/DT dog/NN ./.\n\
                          dogs/NNS bark/VBP ./.\n";

    fn model() -> HmmModel {
        let config = ModelConfig::new();
        let pairs = parse_labelled_document(CORPUS, &config.tagset).unwrap();
        Estimator::new(config).estimate(&pairs).unwrap()
    }

    fn tags(tagged: &[TaggedWord]) -> Vec<&str> {
        tagged.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_tag_sentence() {
        let tagger = PosTagger::new(model(), TaggerConfig::new());
        let tagged = tagger.tag_sentence("the cat barks .").unwrap();
        assert_eq!(tags(&tagged), vec!["DT", "NN", "VBZ", "."]);
        assert_eq!(tagged[1].to_string(), "cat/NN");
    }

    #[test]
    fn test_empty_sentence() {
        let tagger = PosTagger::new(model(), TaggerConfig::new());
        assert!(tagger.tag_sentence("   ").unwrap().is_empty());
    }

    #[test]
    fn test_document_output_is_aligned() {
        let tagger = PosTagger::new(model(), TaggerConfig::new());
        let output = tagger.tag_document("the dog barks .\n\na cat sleeps .\n").unwrap();
        assert_eq!(
            output,
            "the/DT dog/NN barks/VBZ ./.\n\na/DT cat/NN sleeps/VBZ ./."
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sentences: Vec<String> = (0..64)
            .map(|i| match i % 3 {
                0 => "the dog barks .".to_string(),
                1 => "dogs bark .".to_string(),
                _ => "a cat saw the zebra .".to_string(),
            })
            .collect();

        let parallel = PosTagger::new(model(), TaggerConfig::new().with_parallel(true));
        let sequential = PosTagger::new(model(), TaggerConfig::new().with_parallel(false));

        let a = parallel.tag_sentences(&sentences).unwrap();
        let b = sequential.tag_sentences(&sentences).unwrap();
        assert_eq!(a, b);
        assert_eq!(tags(&a[1]), vec!["NNS", "VBP", "."]);
    }

    #[test]
    fn test_sentence_limit() {
        let config = TaggerConfig::new().with_max_sentence_tokens(4);
        let tagger = PosTagger::new(model(), config);

        assert!(tagger.tag_sentence("dogs bark").is_ok());
        let err = tagger.tag_sentence("the dog barks .").unwrap_err();
        assert!(matches!(err, PosTagError::SentenceTooLong { len: 6, limit: 4 }));

        // One bad sentence fails the whole document.
        assert!(tagger.tag_document("dogs bark\nthe dog barks .").is_err());
    }

    #[test]
    fn test_penn_tokenizer() {
        let tokenizer = Tokenizer::new(TokenizeMode::Penn).unwrap();
        let tagger = PosTagger::new(model(), TaggerConfig::new()).with_tokenizer(tokenizer);
        let tagged = tagger.tag_sentence("the dog barks.").unwrap();
        assert_eq!(tags(&tagged), vec!["DT", "NN", "VBZ", "."]);
    }

    #[test]
    fn test_tag_index_batch() {
        let tagger = PosTagger::new(model(), TaggerConfig::new());
        let batch = vec![vec!["dogs", "bark"], vec!["the", "dog"]];
        let result = tagger.tag_index_batch(&batch).unwrap();
        let tagset = tagger.model().tagset();
        let expected = vec![tagset.index_of("NNS").unwrap(), tagset.index_of("VBP").unwrap()];
        assert_eq!(result[0], expected);
        assert_eq!(result[1].len(), 2);
    }
}
