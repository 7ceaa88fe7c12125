//! Tags a newline-delimited document with a trained model and writes one
//! line of `word/TAG` tokens per input sentence.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use postag_core::{HmmModel, PosTagger, TaggerConfig, TokenizeMode, Tokenizer, UNKNOWN_WORD};
use postag_trainer::load_config;
use tracing::info;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "run-tagger")]
#[command(about = "Tag sentences with a trained bigram HMM model")]
#[command(version)]
struct Cli {
    /// Document to tag, one sentence per line
    test: PathBuf,

    /// Trained model written by build-tagger
    model: PathBuf,

    /// Where to write the tagged document
    output: PathBuf,

    /// Tag inventory JSON the model was trained with (defaults to Penn Treebank)
    #[arg(long, env = "POSTAG_TAGSET")]
    tagset: Option<PathBuf>,

    /// Out-of-vocabulary symbol the model was trained with
    #[arg(long, default_value = UNKNOWN_WORD)]
    unknown_word: String,

    /// Decoding threads (defaults to one per core)
    #[arg(short = 'j', long, env = "POSTAG_THREADS")]
    threads: Option<usize>,

    /// Reject sentences longer than this many tokens
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Split raw text into Penn Treebank style tokens instead of on spaces
    #[arg(long)]
    penn: bool,
}

impl Cli {
    fn tagger_config(&self) -> TaggerConfig {
        let config = TaggerConfig::new().with_parallel(self.threads != Some(1));
        match self.max_tokens {
            Some(limit) => config.with_max_sentence_tokens(limit),
            None => config,
        }
    }

    fn tokenize_mode(&self) -> TokenizeMode {
        if self.penn {
            TokenizeMode::Penn
        } else {
            TokenizeMode::Whitespace
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure decoding threads")?;
    }

    let config = load_config(cli.tagset.as_deref())?.with_unknown_word(cli.unknown_word.clone());
    let model = HmmModel::load(&cli.model, &config)
        .with_context(|| format!("failed to load model {}", cli.model.display()))?;

    let document = std::fs::read_to_string(&cli.test)
        .with_context(|| format!("failed to read {}", cli.test.display()))?;

    let tagger = PosTagger::new(model, cli.tagger_config())
        .with_tokenizer(Tokenizer::new(cli.tokenize_mode())?);
    let mut tagged = tagger.tag_document(&document)?;
    if !tagged.is_empty() {
        tagged.push('\n');
    }

    std::fs::write(&cli.output, tagged)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "tagging complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["run-tagger", "test.txt", "model.json", "out.txt"]).unwrap();
        assert_eq!(cli.test, PathBuf::from("test.txt"));
        assert_eq!(cli.model, PathBuf::from("model.json"));
        assert_eq!(cli.output, PathBuf::from("out.txt"));
        assert_eq!(cli.unknown_word, "<UNK>");
        assert_eq!(cli.tokenize_mode(), TokenizeMode::Whitespace);
    }

    #[test]
    fn test_tagger_config_from_flags() {
        let cli = Cli::try_parse_from([
            "run-tagger", "a", "b", "c", "-j", "1", "--max-tokens", "50", "--penn",
        ])
        .unwrap();
        let config = cli.tagger_config();
        assert!(!config.parallel);
        assert_eq!(config.max_sentence_tokens, Some(50));
        assert_eq!(cli.tokenize_mode(), TokenizeMode::Penn);
    }

    #[test]
    fn test_missing_arguments() {
        assert!(Cli::try_parse_from(["run-tagger", "test.txt"]).is_err());
    }
}
