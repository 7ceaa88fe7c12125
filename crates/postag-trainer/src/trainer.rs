//! Training pipeline: labelled corpus in, validated model out.

use std::path::Path;

use anyhow::Context;
use postag_core::{
    parse_labelled_document, parse_labelled_sentences, Estimator, Evaluation, HmmModel,
    LabelledSentence, ModelConfig, PosTagger, TagSet, TaggerConfig,
};
use tracing::info;

/// Estimate a model from the text of a labelled corpus.
pub fn train_from_str(corpus: &str, config: &ModelConfig) -> anyhow::Result<HmmModel> {
    let pairs = parse_labelled_document(corpus, &config.tagset)
        .context("failed to parse training corpus")?;
    info!(pairs = pairs.len(), "loaded training pairs");

    let model = Estimator::new(config.clone()).estimate(&pairs)?;
    info!(
        words = model.emissions().num_columns() - 1,
        "estimated model"
    );
    Ok(model)
}

/// Estimate a model from a labelled corpus file.
pub fn train_from_path<P: AsRef<Path>>(path: P, config: &ModelConfig) -> anyhow::Result<HmmModel> {
    let path = path.as_ref();
    let corpus = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read training corpus {}", path.display()))?;
    train_from_str(&corpus, config)
}

/// Tag the words of `gold` sentences and score them against their tags.
pub fn evaluate_sentences(
    tagger: &PosTagger,
    gold: &[LabelledSentence],
) -> anyhow::Result<Evaluation> {
    let tagset = tagger.model().tagset();
    let words: Vec<Vec<&str>> = gold
        .iter()
        .map(|s| s.words.iter().map(String::as_str).collect())
        .collect();

    let predicted = tagger.tag_index_batch(&words)?;
    let predicted = tag_names(tagset, &predicted);
    let expected = tag_names(
        tagset,
        &gold.iter().map(|s| s.tags.clone()).collect::<Vec<_>>(),
    );

    let mut evaluation = Evaluation::new();
    evaluation.add_batch(&predicted, &expected)?;
    Ok(evaluation)
}

/// Score `model` on a labelled corpus file.
pub fn evaluate_path<P: AsRef<Path>>(
    model: &HmmModel,
    path: P,
    config: &ModelConfig,
) -> anyhow::Result<Evaluation> {
    let path = path.as_ref();
    let corpus = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read evaluation corpus {}", path.display()))?;
    let gold = parse_labelled_sentences(&corpus, &config.tagset)
        .context("failed to parse evaluation corpus")?;

    let tagger = PosTagger::new(model.clone(), TaggerConfig::new());
    evaluate_sentences(&tagger, &gold)
}

/// Train on `train`, score on `dev`, then write the model to `model_path`.
///
/// Nothing is written unless training and evaluation both succeed.
pub fn build_tagger(
    train: &Path,
    dev: &Path,
    model_path: &Path,
    config: &ModelConfig,
) -> anyhow::Result<Evaluation> {
    info!(train = %train.display(), dev = %dev.display(), "training tagger");
    let model = train_from_path(train, config)?;

    let evaluation = evaluate_path(&model, dev, config)?;
    info!(
        accuracy = evaluation.accuracy(),
        tokens = evaluation.total,
        "dev set evaluation"
    );

    model
        .save(model_path)
        .with_context(|| format!("failed to write model {}", model_path.display()))?;
    Ok(evaluation)
}

/// Read a tag inventory definition, or fall back to Penn Treebank.
pub fn load_config(tagset: Option<&Path>) -> anyhow::Result<ModelConfig> {
    let config = ModelConfig::new();
    match tagset {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read tag inventory {}", path.display()))?;
            let tagset = TagSet::from_json(&json)
                .with_context(|| format!("invalid tag inventory {}", path.display()))?;
            Ok(config.with_tagset(tagset))
        }
        None => Ok(config),
    }
}

fn tag_names<'a>(tagset: &'a TagSet, sequences: &[Vec<usize>]) -> Vec<Vec<&'a str>> {
    sequences
        .iter()
        .map(|tags| {
            tags.iter()
                .map(|&t| tagset.name(t).unwrap_or_default())
                .collect()
        })
        .collect()
}
