use thiserror::Error;

/// Errors that can occur while training or running the tagger.
#[derive(Debug, Error)]
pub enum PosTagError {
    /// A labelled token has no `/` separating the word from its tag.
    #[error("line {line}: token {token:?} is not in word/TAG form")]
    MalformedToken {
        /// 1-based line number in the labelled document.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A labelled token carries a tag outside the configured inventory.
    #[error("line {line}: tag {tag:?} is not in the tag inventory")]
    UnknownTag {
        /// 1-based line number in the labelled document.
        line: usize,
        /// The unrecognised tag.
        tag: String,
    },

    /// Decoding was asked to run on a sentence with no tokens at all.
    #[error("cannot decode an empty token sequence")]
    EmptySentence,

    /// A sentence exceeds the configured token bound.
    #[error("sentence has {len} tokens, limit is {limit}")]
    SentenceTooLong {
        /// Token count including sentinels.
        len: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The model tables do not agree with the configured tag inventory.
    #[error("model does not match tag inventory: {0}")]
    ModelShapeMismatch(String),

    /// Predicted and gold sequences have different shapes.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The tag inventory definition is invalid.
    #[error("invalid tag inventory: {0}")]
    InvalidTagSet(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model artifact could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for tagger operations.
pub type Result<T> = std::result::Result<T, PosTagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = PosTagError::EmptySentence;
        assert_eq!(err.to_string(), "cannot decode an empty token sequence");

        let err = PosTagError::MalformedToken {
            line: 3,
            token: "dogs".into(),
        };
        assert!(err.to_string().contains("line 3"));
        assert!(err.to_string().contains("dogs"));

        let err = PosTagError::SentenceTooLong { len: 12, limit: 10 };
        assert_eq!(err.to_string(), "sentence has 12 tokens, limit is 10");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PosTagError>();
    }
}
