//! # Trained Model
//!
//! The pair of transition and emission tables, plus the tag inventory they
//! are indexed by. The on-disk artifact is a JSON array
//! `[transition_table, emission_table]`, each table a map from tag name to a
//! map from tag or word to log-probability.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::{PosTagError, Result};
use crate::tables::{EmissionTable, TransitionTable};
use crate::tags::TagSet;

type TableMap = BTreeMap<String, BTreeMap<String, f64>>;

/// Serialized form of a model.
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact(TableMap, TableMap);

/// A trained bigram HMM. Immutable once built and safe to share across
/// threads.
#[derive(Debug, Clone, PartialEq)]
pub struct HmmModel {
    tagset: TagSet,
    transitions: TransitionTable,
    emissions: EmissionTable,
}

impl HmmModel {
    /// Assemble a model from tables, checking that both are indexed by
    /// `tagset`.
    pub fn from_tables(
        tagset: TagSet,
        transitions: TransitionTable,
        emissions: EmissionTable,
    ) -> Result<Self> {
        if transitions.num_tags() != tagset.len() {
            return Err(PosTagError::ModelShapeMismatch(format!(
                "transition table covers {} tags, inventory has {}",
                transitions.num_tags(),
                tagset.len()
            )));
        }
        if emissions.num_tags() != tagset.len() {
            return Err(PosTagError::ModelShapeMismatch(format!(
                "emission table covers {} tags, inventory has {}",
                emissions.num_tags(),
                tagset.len()
            )));
        }

        Ok(Self {
            tagset,
            transitions,
            emissions,
        })
    }

    pub fn tagset(&self) -> &TagSet {
        &self.tagset
    }

    pub fn num_tags(&self) -> usize {
        self.tagset.len()
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn emissions(&self) -> &EmissionTable {
        &self.emissions
    }

    /// Whether `word` has its own emission column.
    pub fn knows_word(&self, word: &str) -> bool {
        self.emissions.known_column(word).is_some()
    }

    /// Encode the model as its JSON artifact.
    pub fn to_json(&self) -> Result<String> {
        let tags: Vec<&str> = self.tagset.iter().collect();

        let transitions: TableMap = tags
            .iter()
            .enumerate()
            .map(|(prev, prev_name)| {
                let row = tags
                    .iter()
                    .enumerate()
                    .map(|(curr, curr_name)| {
                        (curr_name.to_string(), self.transitions.score(prev, curr))
                    })
                    .collect();
                (prev_name.to_string(), row)
            })
            .collect();

        let emissions: TableMap = tags
            .iter()
            .enumerate()
            .map(|(tag, tag_name)| {
                let row = self
                    .emissions
                    .columns()
                    .iter()
                    .zip(self.emissions.row(tag))
                    .map(|(word, &score)| (word.clone(), score))
                    .collect();
                (tag_name.to_string(), row)
            })
            .collect();

        Ok(serde_json::to_string(&ModelArtifact(transitions, emissions))?)
    }

    /// Decode a JSON artifact, rejecting it unless its tables are keyed by
    /// exactly the configured tag inventory and carry the configured
    /// unknown-word column.
    pub fn from_json(json: &str, config: &ModelConfig) -> Result<Self> {
        let ModelArtifact(transition_map, emission_map) = serde_json::from_str(json)?;
        let tagset = &config.tagset;
        let num_tags = tagset.len();

        check_tag_keys(&transition_map, tagset, "transition")?;
        check_tag_keys(&emission_map, tagset, "emission")?;

        let mut transition_scores = Vec::with_capacity(num_tags * num_tags);
        for prev in tagset.iter() {
            let row = &transition_map[prev];
            if row.len() != num_tags {
                return Err(PosTagError::ModelShapeMismatch(format!(
                    "transition row {:?} has {} columns, inventory has {} tags",
                    prev,
                    row.len(),
                    num_tags
                )));
            }
            for curr in tagset.iter() {
                let score = row.get(curr).ok_or_else(|| {
                    PosTagError::ModelShapeMismatch(format!(
                        "transition row {:?} has no {:?} column",
                        prev, curr
                    ))
                })?;
                transition_scores.push(*score);
            }
        }

        let columns: Vec<String> = match tagset.name(0) {
            Some(first) => emission_map[first].keys().cloned().collect(),
            None => Vec::new(),
        };
        let mut emission_scores = Vec::with_capacity(num_tags * columns.len());
        for tag in tagset.iter() {
            let row = &emission_map[tag];
            if row.len() != columns.len() || !row.keys().eq(columns.iter()) {
                return Err(PosTagError::ModelShapeMismatch(format!(
                    "emission row {:?} does not share the word columns of the other rows",
                    tag
                )));
            }
            emission_scores.extend(row.values().copied());
        }

        let transitions = TransitionTable::from_scores(num_tags, transition_scores)?;
        let emissions =
            EmissionTable::from_scores(num_tags, columns, &config.unknown_word, emission_scores)?;

        debug!(
            tags = num_tags,
            columns = emissions.num_columns(),
            "decoded model artifact"
        );
        Self::from_tables(tagset.clone(), transitions, emissions)
    }

    /// Write the artifact to `path`.
    ///
    /// The artifact is encoded in full before anything touches the disk and
    /// lands via a rename, so a failed save never leaves a partial model at
    /// `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;

        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");

        if let Err(e) = fs::write(&staging, json).and_then(|_| fs::rename(&staging, path)) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(path = %path.display(), "saved model");
        Ok(())
    }

    /// Read and validate the artifact at `path`.
    pub fn load(path: impl AsRef<Path>, config: &ModelConfig) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let model = Self::from_json(&json, config)?;
        info!(
            path = %path.display(),
            columns = model.emissions.num_columns(),
            "loaded model"
        );
        Ok(model)
    }
}

fn check_tag_keys(map: &TableMap, tagset: &TagSet, table: &str) -> Result<()> {
    if let Some(missing) = tagset.iter().find(|tag| !map.contains_key(*tag)) {
        return Err(PosTagError::ModelShapeMismatch(format!(
            "{} table has no row for tag {:?}",
            table, missing
        )));
    }
    if let Some(extra) = map.keys().find(|key| tagset.index_of(key).is_none()) {
        return Err(PosTagError::ModelShapeMismatch(format!(
            "{} table has a row for tag {:?} outside the inventory",
            table, extra
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::log_floor;

    fn tiny_tagset() -> TagSet {
        TagSet::new(["<S>", "<E>", "N"], "<S>", "<E>").unwrap()
    }

    fn tiny_model() -> HmmModel {
        let floor = log_floor();
        let transitions = TransitionTable::from_scores(
            3,
            vec![floor, floor, 0.0, floor, floor, floor, floor, 0.0, floor],
        )
        .unwrap();
        let columns = ["<E>", "<S>", "<UNK>", "dog"].map(String::from).to_vec();
        let half = 0.5f64.ln();
        #[rustfmt::skip]
        let scores = vec![
            floor, half,  half, floor,
            half,  floor, half, floor,
            floor, floor, half, half,
        ];
        let emissions = EmissionTable::from_scores(3, columns, "<UNK>", scores).unwrap();
        HmmModel::from_tables(tiny_tagset(), transitions, emissions).unwrap()
    }

    fn tiny_config() -> ModelConfig {
        ModelConfig::new().with_tagset(tiny_tagset())
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let model = tiny_model();
        let json = model.to_json().unwrap();
        let restored = HmmModel::from_json(&json, &tiny_config()).unwrap();
        assert_eq!(model, restored);
    }

    #[test]
    fn test_artifact_layout() {
        let json = tiny_model().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let tables = value.as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0]["<S>"]["N"], serde_json::json!(0.0));
        assert!(tables[1]["N"]["dog"].as_f64().unwrap() < 0.0);
    }

    #[test]
    fn test_rejects_other_inventory() {
        let json = tiny_model().to_json().unwrap();
        let err = HmmModel::from_json(&json, &ModelConfig::new()).unwrap_err();
        assert!(matches!(err, PosTagError::ModelShapeMismatch(_)));
    }

    #[test]
    fn test_rejects_other_unknown_symbol() {
        let json = tiny_model().to_json().unwrap();
        let config = tiny_config().with_unknown_word("__oov__");
        let err = HmmModel::from_json(&json, &config).unwrap_err();
        assert!(matches!(err, PosTagError::ModelShapeMismatch(_)));
    }

    #[test]
    fn test_rejects_ragged_emission_rows() {
        let json = tiny_model().to_json().unwrap();
        let ModelArtifact(transitions, mut emissions) = serde_json::from_str(&json).unwrap();
        emissions.get_mut("N").unwrap().remove("dog");
        let json = serde_json::to_string(&ModelArtifact(transitions, emissions)).unwrap();

        let err = HmmModel::from_json(&json, &tiny_config()).unwrap_err();
        assert!(matches!(err, PosTagError::ModelShapeMismatch(_)));
    }

    #[test]
    fn test_from_tables_checks_tag_count() {
        let model = tiny_model();
        let tagset = TagSet::new(["<S>", "<E>"], "<S>", "<E>").unwrap();
        let err = HmmModel::from_tables(
            tagset,
            model.transitions().clone(),
            model.emissions().clone(),
        )
        .unwrap_err();
        assert!(matches!(err, PosTagError::ModelShapeMismatch(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = tiny_model();
        model.save(&path).unwrap();
        assert!(!dir.path().join("model.json.tmp").exists());

        let loaded = HmmModel::load(&path, &tiny_config()).unwrap();
        assert_eq!(model, loaded);
        assert!(loaded.knows_word("dog"));
        assert!(!loaded.knows_word("cat"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HmmModel::load(dir.path().join("absent.json"), &tiny_config()).unwrap_err();
        assert!(matches!(err, PosTagError::Io(_)));
    }
}
