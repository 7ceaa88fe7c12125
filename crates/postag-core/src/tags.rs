//! # Tag Inventory
//!
//! The closed, ordered set of part-of-speech tags. A tag's position in the
//! inventory is its index into every dense probability table.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PosTagError, Result};

/// Start-of-sentence marker, used as both word and tag.
pub const START_MARKER: &str = "<S>";

/// End-of-sentence marker, used as both word and tag.
pub const END_MARKER: &str = "<E>";

/// Penn Treebank tags, preceded by the two sentence sentinels.
#[rustfmt::skip]
const PENN_TREEBANK_TAGS: &[&str] = &[
    START_MARKER, END_MARKER,
    "CC", "CD", "DT", "EX", "FW", "IN",
    "JJ", "JJR", "JJS", "LS", "MD",
    "NN", "NNS", "NNP", "NNPS",
    "PDT", "POS", "PRP", "PRP$",
    "RB", "RBR", "RBS", "RP",
    "SYM", "TO", "UH",
    "VB", "VBD", "VBG", "VBN", "VBP", "VBZ",
    "WDT", "WP", "WP$", "WRB",
    "$", "#", "``", "''", "-LRB-", "-RRB-", ",", ".", ":",
];

/// Serialized shape of a tag inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TagSetDef {
    tags: Vec<String>,
    start: String,
    end: String,
}

/// An ordered, closed tag inventory with two sentinel tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TagSetDef", into = "TagSetDef")]
pub struct TagSet {
    tags: Vec<String>,
    index: HashMap<String, usize>,
    start: usize,
    end: usize,
}

impl TagSet {
    /// Build an inventory from ordered tag names and the two sentinel names.
    pub fn new<S: Into<String>>(
        tags: impl IntoIterator<Item = S>,
        start: &str,
        end: &str,
    ) -> Result<Self> {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(tags.len());

        for (i, tag) in tags.iter().enumerate() {
            if tag.is_empty() {
                return Err(PosTagError::InvalidTagSet(format!(
                    "tag at position {} is empty",
                    i
                )));
            }
            if index.insert(tag.clone(), i).is_some() {
                return Err(PosTagError::InvalidTagSet(format!(
                    "duplicate tag {:?}",
                    tag
                )));
            }
        }

        let lookup = |name: &str| {
            index.get(name).copied().ok_or_else(|| {
                PosTagError::InvalidTagSet(format!("sentinel {:?} is not in the inventory", name))
            })
        };
        let start = lookup(start)?;
        let end = lookup(end)?;
        if start == end {
            return Err(PosTagError::InvalidTagSet(
                "start and end sentinels must differ".into(),
            ));
        }

        Ok(Self {
            tags,
            index,
            start,
            end,
        })
    }

    /// The Penn Treebank inventory with `<S>` and `<E>` sentinels.
    pub fn penn_treebank() -> Self {
        Self::new(PENN_TREEBANK_TAGS.iter().copied(), START_MARKER, END_MARKER)
            .unwrap_or_else(|e| unreachable!("built-in tag inventory is valid: {}", e))
    }

    /// Load an inventory from its JSON definition.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of tags, sentinels included.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the inventory is empty (never true for a validated set).
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Index of a tag name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the tag at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(String::as_str)
    }

    /// Index of the start sentinel.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index of the end sentinel.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Name of the start sentinel.
    pub fn start_name(&self) -> &str {
        &self.tags[self.start]
    }

    /// Name of the end sentinel.
    pub fn end_name(&self) -> &str {
        &self.tags[self.end]
    }

    /// Tag names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::penn_treebank()
    }
}

impl TryFrom<TagSetDef> for TagSet {
    type Error = PosTagError;

    fn try_from(def: TagSetDef) -> Result<Self> {
        TagSet::new(def.tags, &def.start, &def.end)
    }
}

impl From<TagSet> for TagSetDef {
    fn from(set: TagSet) -> Self {
        let start = set.tags[set.start].clone();
        let end = set.tags[set.end].clone();
        TagSetDef {
            tags: set.tags,
            start,
            end,
        }
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tags.join(" "))
    }
}
