//! Per-class classification metrics.
//!
//! Counting is one-vs-rest over the encoder's classes. Any ratio with a zero
//! denominator is defined as 0.

use serde::{Deserialize, Serialize};

use crate::error::{LeafError, Result};
use crate::model::LabelEncoder;

/// Rows = true class, columns = predicted class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Tallies `(true, predicted)` pairs. Every index must be `< n_classes`.
    pub fn from_pairs(predicted: &[usize], truth: &[usize], n_classes: usize) -> Result<Self> {
        if predicted.len() != truth.len() {
            return Err(LeafError::TestSetMismatch { features: predicted.len(), labels: truth.len() });
        }
        let mut counts = vec![vec![0usize; n_classes]; n_classes];
        for (&p, &t) in predicted.iter().zip(truth.iter()) {
            for index in [p, t] {
                if index >= n_classes {
                    return Err(LeafError::UnknownClassIndex { index, class_count: n_classes });
                }
            }
            counts[t][p] += 1;
        }
        Ok(ConfusionMatrix { counts })
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    /// Predicted as `class` but actually something else.
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes()).filter(|&t| t != class).map(|t| self.counts[t][class]).sum()
    }

    /// Actually `class` but predicted as something else.
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes()).filter(|&p| p != class).map(|p| self.counts[class][p]).sum()
    }

    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.n_classes()).map(|c| self.counts[c][c]).sum()
    }
}

/// Unrounded metrics for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Macro or weighted average over all classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Full, unfiltered report: every encoder class plus the aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    /// Builds the report for every class the encoder knows, in encoder order.
    pub fn from_predictions(predicted: &[usize], truth: &[usize], encoder: &LabelEncoder) -> Result<Self> {
        if truth.is_empty() {
            return Err(LeafError::EmptyTestSet);
        }
        let confusion = ConfusionMatrix::from_pairs(predicted, truth, encoder.len())?;

        let classes: Vec<ClassMetrics> = encoder
            .classes()
            .iter()
            .enumerate()
            .map(|(c, label)| {
                let tp = confusion.true_positives(c);
                let precision = ratio(tp, tp + confusion.false_positives(c));
                let recall = ratio(tp, tp + confusion.false_negatives(c));
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support: confusion.support(c),
                }
            })
            .collect();

        let total = confusion.total();
        let n = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: classes.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: classes.iter().map(|m| m.f1).sum::<f64>() / n,
            support: total,
        };
        let weight = |m: &ClassMetrics| m.support as f64 / total as f64;
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|m| m.precision * weight(m)).sum(),
            recall: classes.iter().map(|m| m.recall * weight(m)).sum(),
            f1: classes.iter().map(|m| m.f1 * weight(m)).sum(),
            support: total,
        };

        Ok(ClassificationReport {
            accuracy: confusion.correct() as f64 / total as f64,
            classes,
            macro_avg,
            weighted_avg,
            confusion,
        })
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(vec!["a".into(), "b".into(), "c".into()]).unwrap()
    }

    #[test]
    fn hand_checked_three_class_report() {
        let truth = [0, 0, 1, 1, 2, 2];
        let pred = [0, 1, 1, 1, 0, 0];
        let r = ClassificationReport::from_predictions(&pred, &truth, &encoder()).unwrap();

        // class a: tp 1, fp 2, fn 1
        assert!((r.classes[0].precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((r.classes[0].recall - 0.5).abs() < 1e-12);
        assert!((r.classes[0].f1 - 0.4).abs() < 1e-12);
        // class b: tp 2, fp 1, fn 0
        assert!((r.classes[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.classes[1].recall, 1.0);
        assert!((r.classes[1].f1 - 0.8).abs() < 1e-12);
        // class c never predicted: precision defined as 0
        assert_eq!((r.classes[2].precision, r.classes[2].recall, r.classes[2].f1), (0.0, 0.0, 0.0));

        assert_eq!(r.classes.iter().map(|m| m.support).collect::<Vec<_>>(), vec![2, 2, 2]);
        assert!((r.accuracy - 0.5).abs() < 1e-12);
        assert!((r.macro_avg.f1 - 0.4).abs() < 1e-12);
        assert!((r.weighted_avg.f1 - 0.4).abs() < 1e-12);
        assert_eq!(r.confusion.counts, vec![vec![1, 1, 0], vec![0, 2, 0], vec![2, 0, 0]]);
    }

    #[test]
    fn absent_class_has_zero_support() {
        let r = ClassificationReport::from_predictions(&[0, 1], &[0, 1], &encoder()).unwrap();
        assert_eq!(r.classes[2].support, 0);
        assert_eq!(r.classes[2].f1, 0.0);
        assert_eq!(r.accuracy, 1.0);
    }

    #[test]
    fn out_of_range_labels_are_rejected() {
        assert!(matches!(
            ClassificationReport::from_predictions(&[0], &[3], &encoder()),
            Err(LeafError::UnknownClassIndex { index: 3, class_count: 3 })
        ));
        assert!(matches!(
            ClassificationReport::from_predictions(&[], &[], &encoder()),
            Err(LeafError::EmptyTestSet)
        ));
    }
}
