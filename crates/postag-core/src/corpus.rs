//! # Corpus Tokenizer
//!
//! Turns labelled `word/TAG` documents into sentinel-delimited pair streams,
//! and unlabelled documents into sentinel-wrapped token sequences.

use regex::Regex;

use crate::error::{PosTagError, Result};
use crate::tags::TagSet;

/// One `(word, tag)` observation from a labelled corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledPair {
    /// The surface word
    pub word: String,
    /// Index of the tag in the [`TagSet`]
    pub tag: usize,
}

impl LabelledPair {
    pub fn new(word: impl Into<String>, tag: usize) -> Self {
        Self {
            word: word.into(),
            tag,
        }
    }
}

/// A labelled sentence without sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelledSentence {
    pub words: Vec<String>,
    pub tags: Vec<usize>,
}

impl LabelledSentence {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Split a document into sentence lines.
///
/// The empty line produced by a trailing newline is dropped, interior blank
/// lines are kept so that output lines stay aligned with input lines.
pub fn split_sentences(document: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = document
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Parse a labelled document into one flat stream of pairs.
///
/// Each line becomes one sentence wrapped in start/end sentinel pairs, and
/// sentences are concatenated in order so that tag bigrams span sentence
/// boundaries.
pub fn parse_labelled_document(document: &str, tagset: &TagSet) -> Result<Vec<LabelledPair>> {
    let sentences = split_sentences(document)
        .into_iter()
        .enumerate()
        .map(|(i, line)| parse_labelled_line(line, i + 1, tagset))
        .collect::<Result<Vec<_>>>()?;

    Ok(flatten_sentences(&sentences, tagset))
}

/// Parse the non-blank lines of a labelled document as separate sentences.
pub fn parse_labelled_sentences(document: &str, tagset: &TagSet) -> Result<Vec<LabelledSentence>> {
    split_sentences(document)
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_labelled_line(line, i + 1, tagset))
        .collect()
}

/// Wrap each sentence in sentinel pairs and concatenate them.
pub fn flatten_sentences(sentences: &[LabelledSentence], tagset: &TagSet) -> Vec<LabelledPair> {
    let total: usize = sentences.iter().map(|s| s.len() + 2).sum();
    let mut pairs = Vec::with_capacity(total);

    for sentence in sentences {
        pairs.push(LabelledPair::new(tagset.start_name(), tagset.start()));
        pairs.extend(
            sentence
                .words
                .iter()
                .zip(&sentence.tags)
                .map(|(word, &tag)| LabelledPair::new(word.clone(), tag)),
        );
        pairs.push(LabelledPair::new(tagset.end_name(), tagset.end()));
    }

    pairs
}

fn parse_labelled_line(line: &str, line_no: usize, tagset: &TagSet) -> Result<LabelledSentence> {
    let mut sentence = LabelledSentence::default();

    for token in line.trim_matches(' ').split(' ') {
        if token.is_empty() {
            continue;
        }
        let (word, tag) = split_labelled_token(token).ok_or_else(|| PosTagError::MalformedToken {
            line: line_no,
            token: token.to_string(),
        })?;
        let tag = tagset.index_of(tag).ok_or_else(|| PosTagError::UnknownTag {
            line: line_no,
            tag: tag.to_string(),
        })?;

        sentence.words.push(word.to_string());
        sentence.tags.push(tag);
    }

    Ok(sentence)
}

/// Split `word/TAG` on the last slash, so `1/2/CD` is `("1/2", "CD")`.
pub fn split_labelled_token(token: &str) -> Option<(&str, &str)> {
    token.rsplit_once('/')
}

/// Pattern for raw text: clitics, words (with inner hyphens and dots),
/// ellipses, then any other single symbol.
const PENN_PATTERN: &str = r"(?i)'(?:s|d|ll|re|ve|m|t)\b|\w+(?:[-.]\w+)*|\.\.\.|[^\w\s]";

/// How unlabelled sentences are split into words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenizeMode {
    /// Split on whitespace; the input is already tokenized.
    #[default]
    Whitespace,
    /// Split raw text into Penn Treebank style tokens.
    Penn,
}

/// Tokenizer for unlabelled sentences.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    mode: TokenizeMode,
    pattern: Option<Regex>,
}

impl Tokenizer {
    /// Create a tokenizer for the given mode.
    pub fn new(mode: TokenizeMode) -> Result<Self> {
        let pattern = match mode {
            TokenizeMode::Whitespace => None,
            TokenizeMode::Penn => Some(Regex::new(PENN_PATTERN)?),
        };
        Ok(Self { mode, pattern })
    }

    pub fn mode(&self) -> TokenizeMode {
        self.mode
    }

    /// Split one sentence into words.
    ///
    /// # Examples
    /// ```
    /// use postag_core::corpus::{TokenizeMode, Tokenizer};
    ///
    /// let tokenizer = Tokenizer::new(TokenizeMode::Penn).unwrap();
    /// assert_eq!(tokenizer.words("John's dog."), vec!["John", "'s", "dog", "."]);
    /// ```
    pub fn words<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        match &self.pattern {
            Some(pattern) => pattern.find_iter(sentence).map(|m| m.as_str()).collect(),
            None => sentence.split_whitespace().collect(),
        }
    }
}

/// Wrap `words` in the start and end sentinel words of `tagset`.
pub fn wrap_sentence<'a, S: AsRef<str>>(words: &'a [S], tagset: &'a TagSet) -> Vec<&'a str> {
    let mut tokens = Vec::with_capacity(words.len() + 2);
    tokens.push(tagset.start_name());
    tokens.extend(words.iter().map(AsRef::as_ref));
    tokens.push(tagset.end_name());
    tokens
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            mode: TokenizeMode::Whitespace,
            pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagset() -> TagSet {
        TagSet::penn_treebank()
    }

    fn tag(name: &str) -> usize {
        tagset().index_of(name).unwrap()
    }

    #[test]
    fn test_parse_single_sentence() {
        let tags = tagset();
        let pairs = parse_labelled_document("the/DT dog/NN barks/VBZ", &tags).unwrap();

        let words: Vec<_> = pairs.iter().map(|p| p.word.as_str()).collect();
        assert_eq!(words, vec!["<S>", "the", "dog", "barks", "<E>"]);
        assert_eq!(pairs[0].tag, tags.start());
        assert_eq!(pairs[1].tag, tag("DT"));
        assert_eq!(pairs[3].tag, tag("VBZ"));
        assert_eq!(pairs[4].tag, tags.end());
    }

    #[test]
    fn test_trailing_newline_adds_no_sentence() {
        let tags = tagset();
        let with = parse_labelled_document("a/DT cat/NN\n", &tags).unwrap();
        let without = parse_labelled_document("a/DT cat/NN", &tags).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_sentences_are_concatenated() {
        let tags = tagset();
        let pairs = parse_labelled_document("a/DT\nit/PRP", &tags).unwrap();
        let words: Vec<_> = pairs.iter().map(|p| p.word.as_str()).collect();
        assert_eq!(words, vec!["<S>", "a", "<E>", "<S>", "it", "<E>"]);
    }

    #[test]
    fn test_split_on_last_slash() {
        assert_eq!(split_labelled_token("1/2/CD"), Some(("1/2", "CD")));
        assert_eq!(split_labelled_token("and/or/CC"), Some(("and/or", "CC")));
        assert_eq!(split_labelled_token("dog"), None);

        let pairs = parse_labelled_document("3/4/CD", &tagset()).unwrap();
        assert_eq!(pairs[1], LabelledPair::new("3/4", tag("CD")));
    }

    #[test]
    fn test_extra_spaces_are_discarded() {
        let pairs = parse_labelled_document("  the/DT   dog/NN  ", &tagset()).unwrap();
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_malformed_token_reports_line() {
        let err = parse_labelled_document("the/DT dog/NN\nthe dog/NN", &tagset()).unwrap_err();
        match err {
            PosTagError::MalformedToken { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "the");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = parse_labelled_document("the/DT dog/NOUN", &tagset()).unwrap_err();
        assert!(matches!(err, PosTagError::UnknownTag { line: 1, ref tag } if tag == "NOUN"));
    }

    #[test]
    fn test_parse_labelled_sentences_skips_blank_lines() {
        let tags = tagset();
        let sentences = parse_labelled_sentences("a/DT cat/NN\n\nit/PRP\n", &tags).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].words, vec!["a", "cat"]);
        assert_eq!(sentences[0].tags, vec![tag("DT"), tag("NN")]);
        assert_eq!(sentences[1].words, vec!["it"]);
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(split_sentences("a b\nc\n"), vec!["a b", "c"]);
        assert_eq!(split_sentences("a b\r\n\nc"), vec!["a b", "", "c"]);
        assert!(split_sentences("").is_empty());
        assert_eq!(split_sentences("a b\n   "), vec!["a b", "   "]);
    }

    #[test]
    fn test_sentences_are_wrapped() {
        let tags = tagset();
        let words = Tokenizer::default().words(" the  dog barks ");
        assert_eq!(
            wrap_sentence(&words, &tags),
            vec!["<S>", "the", "dog", "barks", "<E>"]
        );
        assert_eq!(wrap_sentence::<&str>(&[], &tags), vec!["<S>", "<E>"]);
    }

    #[test]
    fn test_penn_mode() {
        let tokenizer = Tokenizer::new(TokenizeMode::Penn).unwrap();
        assert_eq!(tokenizer.mode(), TokenizeMode::Penn);
        assert_eq!(
            tokenizer.words("Don't stop, John's dog..."),
            vec!["Don", "'t", "stop", ",", "John", "'s", "dog", "..."]
        );
        assert_eq!(tokenizer.words("U.S. rock-n-roll"), vec!["U.S", ".", "rock-n-roll"]);
    }
}
