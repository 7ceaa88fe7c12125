use std::path::PathBuf;

use clap::Parser;
use postag_trainer::{build_tagger, load_config};

/// Train a bigram HMM tagger from a word/TAG corpus
#[derive(Parser)]
#[command(name = "build-tagger")]
#[command(version)]
struct Cli {
    /// Labelled training corpus, one sentence per line
    train: PathBuf,

    /// Labelled development corpus, scored after training
    dev: PathBuf,

    /// Where to write the trained model
    model: PathBuf,

    /// Tag inventory JSON (defaults to Penn Treebank)
    #[arg(long, env = "POSTAG_TAGSET")]
    tagset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.tagset.as_deref())?;
    build_tagger(&cli.train, &cli.dev, &cli.model, &config)?;
    Ok(())
}
