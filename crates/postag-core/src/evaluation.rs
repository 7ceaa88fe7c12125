//! # Evaluation
//!
//! Token-level accuracy of predicted tag sequences against gold sequences,
//! with a per-tag confusion breakdown for error analysis.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{PosTagError, Result};

/// Fraction of positions where `predicted` equals `gold`.
///
/// Both sides must have the same number of sentences and the same length
/// per sentence. Returns 0.0 when there are no positions at all.
pub fn accuracy<T: PartialEq>(predicted: &[Vec<T>], gold: &[Vec<T>]) -> Result<f64> {
    check_shape(predicted, gold)?;

    let (correct, total) = predicted
        .iter()
        .zip(gold)
        .flat_map(|(p, g)| p.iter().zip(g))
        .fold((0usize, 0usize), |(correct, total), (p, g)| {
            (correct + usize::from(p == g), total + 1)
        });

    Ok(ratio(correct, total))
}

fn check_shape<T>(predicted: &[Vec<T>], gold: &[Vec<T>]) -> Result<()> {
    if predicted.len() != gold.len() {
        return Err(PosTagError::ShapeMismatch(format!(
            "{} predicted sentences, {} gold sentences",
            predicted.len(),
            gold.len()
        )));
    }
    if let Some((i, (p, g))) = predicted
        .iter()
        .zip(gold)
        .enumerate()
        .find(|(_, (p, g))| p.len() != g.len())
    {
        return Err(PosTagError::ShapeMismatch(format!(
            "sentence {} has {} predicted tags, {} gold tags",
            i,
            p.len(),
            g.len()
        )));
    }
    Ok(())
}

fn ratio(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

/// Accumulated tagging performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    /// Number of correctly tagged positions.
    pub correct: usize,
    /// Total number of tagged positions.
    pub total: usize,
    /// Gold tag → predicted tag → count, mistakes only.
    pub confusion: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one batch of named tag sequences.
    pub fn add_batch<S: AsRef<str>>(
        &mut self,
        predicted: &[Vec<S>],
        gold: &[Vec<S>],
    ) -> Result<()> {
        check_shape(predicted, gold)?;

        for (p_sent, g_sent) in predicted.iter().zip(gold) {
            for (p, g) in p_sent.iter().zip(g_sent) {
                let (p, g) = (p.as_ref(), g.as_ref());
                self.total += 1;
                if p == g {
                    self.correct += 1;
                } else {
                    *self
                        .confusion
                        .entry(g.to_string())
                        .or_default()
                        .entry(p.to_string())
                        .or_default() += 1;
                }
            }
        }
        Ok(())
    }

    /// Fold another evaluation into this one.
    pub fn merge(&mut self, other: &Evaluation) {
        self.correct += other.correct;
        self.total += other.total;
        for (gold, row) in &other.confusion {
            let target = self.confusion.entry(gold.clone()).or_default();
            for (predicted, count) in row {
                *target.entry(predicted.clone()).or_default() += count;
            }
        }
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.total)
    }

    /// The `n` most frequent (gold, predicted, count) confusions.
    pub fn top_confusions(&self, n: usize) -> Vec<(&str, &str, usize)> {
        let mut all: Vec<_> = self
            .confusion
            .iter()
            .flat_map(|(gold, row)| {
                row.iter()
                    .map(move |(predicted, &count)| (gold.as_str(), predicted.as_str(), count))
            })
            .collect();
        all.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));
        all.truncate(n);
        all
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy {:.4} ({}/{})",
            self.accuracy(),
            self.correct,
            self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_accuracy_known_fraction() {
        let predicted = seqs(&[&["DT", "NN", "VBZ"], &["DT", "JJ", "NN", "."]]);
        let gold = seqs(&[&["DT", "NN", "VBD"], &["DT", "NN", "NN", "."]]);
        // 5 of 7 positions agree.
        let acc = accuracy(&predicted, &gold).unwrap();
        assert!((acc - 5.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_on_indices() {
        let acc = accuracy(&[vec![1, 2], vec![3]], &[vec![1, 2], vec![4]]).unwrap();
        assert!((acc - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_empty() {
        let empty: Vec<Vec<usize>> = Vec::new();
        assert_eq!(accuracy(&empty, &empty).unwrap(), 0.0);
    }

    #[test]
    fn test_accuracy_shape_mismatch() {
        let err = accuracy(&[vec![1, 2]], &[vec![1]]).unwrap_err();
        assert!(matches!(err, PosTagError::ShapeMismatch(_)));
        let err = accuracy(&[vec![1]], &[vec![1], vec![2]]).unwrap_err();
        assert!(matches!(err, PosTagError::ShapeMismatch(_)));
    }

    #[test]
    fn test_confusion() {
        let mut eval = Evaluation::new();
        eval.add_batch(
            &seqs(&[&["DT", "JJ", "NN"], &["JJ", "VB"]]),
            &seqs(&[&["DT", "NN", "NN"], &["NN", "VBP"]]),
        )
        .unwrap();

        assert_eq!(eval.total, 5);
        assert_eq!(eval.correct, 2);
        assert_eq!(eval.confusion["NN"]["JJ"], 2);
        assert_eq!(eval.confusion["VBP"]["VB"], 1);
        assert!(!eval.confusion.contains_key("DT"));
        assert_eq!(eval.top_confusions(1), vec![("NN", "JJ", 2)]);
        assert_eq!(eval.to_string(), "accuracy 0.4000 (2/5)");
    }

    #[test]
    fn test_merge() {
        let mut a = Evaluation::new();
        a.add_batch(&seqs(&[&["JJ"]]), &seqs(&[&["NN"]])).unwrap();
        let mut b = Evaluation::new();
        b.add_batch(&seqs(&[&["JJ", "NN"]]), &seqs(&[&["NN", "NN"]])).unwrap();

        a.merge(&b);
        assert_eq!(a.total, 3);
        assert_eq!(a.correct, 1);
        assert_eq!(a.confusion["NN"]["JJ"], 2);
    }
}
