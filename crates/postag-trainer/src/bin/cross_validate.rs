use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use postag_trainer::{load_config, CrossValidator, DEFAULT_FOLDS};
use tracing::info;

/// K-fold cross-validation of the HMM tagger on a word/TAG corpus
#[derive(Parser)]
#[command(name = "cross-validate")]
#[command(version)]
struct Cli {
    /// Labelled corpus, one sentence per line
    corpus: PathBuf,

    /// Number of folds
    #[arg(short, long, default_value_t = DEFAULT_FOLDS)]
    folds: usize,

    /// Shuffle sentences with this seed before folding
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the per-tag error breakdown as JSON
    #[arg(short, long)]
    errors: Option<PathBuf>,

    /// Tag inventory JSON (defaults to Penn Treebank)
    #[arg(long, env = "POSTAG_TAGSET")]
    tagset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.tagset.as_deref())?;
    let corpus = std::fs::read_to_string(&cli.corpus)
        .with_context(|| format!("failed to read corpus {}", cli.corpus.display()))?;

    let report = CrossValidator::new(config)
        .with_folds(cli.folds)
        .with_shuffle_seed(cli.seed)
        .validate_str(&corpus)?;

    for fold in &report.folds {
        println!(
            "fold {:>2}: accuracy {:.4} ({} train / {} test sentences)",
            fold.fold + 1,
            fold.accuracy,
            fold.train_sentences,
            fold.test_sentences
        );
    }
    println!("mean accuracy {:.4}", report.mean_accuracy());
    println!("overall {}", report.evaluation);

    for (gold, predicted, count) in report.evaluation.top_confusions(10) {
        println!("  {:>6} -> {:<6} {}", gold, predicted, count);
    }

    if let Some(path) = &cli.errors {
        let json = serde_json::to_string_pretty(&report.evaluation.confusion)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write error report {}", path.display()))?;
        info!(path = %path.display(), "wrote error report");
    }

    Ok(())
}
