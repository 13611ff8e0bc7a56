use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LeafError, Result};
use crate::evaluation::metrics::{ClassMetrics, ClassificationReport};
use crate::model::{Classifier, LabelEncoder, ModelArtifacts, TestSet};

/// One displayed row of the performance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl From<&ClassMetrics> for EvaluationRow {
    fn from(m: &ClassMetrics) -> Self {
        EvaluationRow {
            label: m.label.clone(),
            precision: round2(m.precision),
            recall: round2(m.recall),
            f1: round2(m.f1),
            support: m.support,
        }
    }
}

/// Filtered, rounded per-class rows plus the overall accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub rows: Vec<EvaluationRow>,
    pub accuracy: f64,
}

impl From<&ClassificationReport> for EvaluationReport {
    /// Keeps classes with a nonzero F1, in encoder order. Filtering looks at
    /// the unrounded F1.
    fn from(report: &ClassificationReport) -> Self {
        EvaluationReport {
            rows: report
                .classes
                .iter()
                .filter(|m| m.f1 > 0.0)
                .map(EvaluationRow::from)
                .collect(),
            accuracy: report.accuracy,
        }
    }
}

/// Scores a classifier against a held-out test set.
pub struct EvaluationReporter<'a> {
    model: &'a dyn Classifier,
    encoder: &'a LabelEncoder,
}

impl<'a> EvaluationReporter<'a> {
    pub fn new(model: &'a dyn Classifier, encoder: &'a LabelEncoder) -> Self {
        EvaluationReporter { model, encoder }
    }

    pub fn from_artifacts(artifacts: &'a ModelArtifacts) -> Self {
        EvaluationReporter::new(artifacts.classifier(), &artifacts.encoder)
    }

    /// Runs the model over the whole test set and builds the unfiltered report.
    /// Recomputed from scratch on every call.
    pub fn classification_report(&self, test_set: &TestSet) -> Result<ClassificationReport> {
        if test_set.is_empty() {
            return Err(LeafError::EmptyTestSet);
        }
        if test_set.features.len() != test_set.labels.len() {
            return Err(LeafError::TestSetMismatch {
                features: test_set.features.len(),
                labels: test_set.labels.len(),
            });
        }

        let predicted = self.model.predict_batch(&test_set.features)?;
        ClassificationReport::from_predictions(&predicted, &test_set.labels, self.encoder)
    }

    /// The display table: nonzero-F1 classes, rounded to two decimals.
    pub fn report(&self, test_set: &TestSet) -> Result<EvaluationReport> {
        let full = self.classification_report(test_set)?;
        let report = EvaluationReport::from(&full);
        info!(
            rows = test_set.len(),
            shown = report.rows.len(),
            accuracy = report.accuracy,
            "computed evaluation report"
        );
        Ok(report)
    }
}

/// Rounds to two decimals. Exact ties go to the even hundredth, so
/// `0.125` becomes `0.12` and `0.625` becomes `0.62`.
pub fn round2(x: f64) -> f64 {
    let y = x * 100.0;
    // Exact residual of the scaling; tells which side of a .5 the true value is on.
    let err = x.mul_add(100.0, -y);
    let floor = y.floor();
    let scaled = if y - floor == 0.5 {
        if err > 0.0 || (err == 0.0 && floor % 2.0 != 0.0) {
            floor + 1.0
        } else {
            floor
        }
    } else {
        y.round()
    };
    scaled / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Predicts the index stored in the first feature.
    struct FirstFeature;

    impl Classifier for FirstFeature {
        fn input_width(&self) -> usize {
            1
        }
        fn class_count(&self) -> usize {
            4
        }
        fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
            Ok(rows.iter().map(|r| r.first().copied().unwrap_or(0.0) as usize).collect())
        }
    }

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(vec!["w".into(), "x".into(), "y".into(), "z".into()]).unwrap()
    }

    fn test_set(pred: &[usize], truth: &[usize]) -> TestSet {
        TestSet {
            features: pred.iter().map(|&p| vec![p as f64]).collect(),
            labels: truth.to_vec(),
        }
    }

    #[test]
    fn zero_f1_classes_are_dropped_and_order_kept() {
        // w: perfect, x: never right, y: partly right, z: absent
        let ts = test_set(&[0, 0, 2, 2, 2, 1], &[0, 0, 1, 2, 2, 2]);
        let enc = encoder();
        let report = EvaluationReporter::new(&FirstFeature, &enc).report(&ts).unwrap();

        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["w", "y"]);
        assert_eq!(report.rows[0], EvaluationRow {
            label: "w".into(), precision: 1.0, recall: 1.0, f1: 1.0, support: 2,
        });
        // y: tp 2, fp 1, fn 1 → 0.67 / 0.67 / 0.67
        assert_eq!((report.rows[1].precision, report.rows[1].recall, report.rows[1].f1), (0.67, 0.67, 0.67));
        assert_eq!(report.rows[1].support, 3);
        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn empty_test_set_produces_no_report() {
        let enc = encoder();
        assert!(matches!(
            EvaluationReporter::new(&FirstFeature, &enc).report(&TestSet::default()),
            Err(LeafError::EmptyTestSet)
        ));
    }

    #[test]
    fn mismatched_test_set_is_rejected() {
        let enc = encoder();
        let ts = TestSet { features: vec![vec![0.0]; 3], labels: vec![0, 1] };
        assert!(matches!(
            EvaluationReporter::new(&FirstFeature, &enc).report(&ts),
            Err(LeafError::TestSetMismatch { features: 3, labels: 2 })
        ));
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(1.0), 1.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.875), 0.88);
    }

    #[test]
    fn near_ties_follow_the_stored_value() {
        // 0.285 and 0.015 are stored slightly below the decimal tie.
        assert_eq!(round2(0.285), 0.28);
        assert_eq!(round2(0.015), 0.01);
    }

    #[test]
    fn eighth_precision_is_shown_as_twelve_hundredths() {
        // "w" predicted eight times, right once.
        let ts = test_set(&[0; 8], &[0, 1, 1, 1, 1, 1, 1, 1]);
        let enc = encoder();
        let report = EvaluationReporter::new(&FirstFeature, &enc).report(&ts).unwrap();

        assert_eq!(report.rows.len(), 1);
        let w = &report.rows[0];
        assert_eq!(w.label, "w");
        assert_eq!((w.precision, w.recall, w.f1), (0.12, 1.0, 0.22));
        assert_eq!(w.support, 1);
    }

    proptest! {
        #[test]
        fn accuracy_bounded_and_rows_consistent(
            pairs in proptest::collection::vec((0usize..4, 0usize..4), 1..60)
        ) {
            let (pred, truth): (Vec<usize>, Vec<usize>) = pairs.into_iter().unzip();
            let ts = test_set(&pred, &truth);
            let enc = encoder();
            let reporter = EvaluationReporter::new(&FirstFeature, &enc);
            let full = reporter.classification_report(&ts).unwrap();
            let report = reporter.report(&ts).unwrap();

            prop_assert!((0.0..=1.0).contains(&report.accuracy));

            let expected: Vec<&str> = full.classes.iter()
                .filter(|m| m.f1 > 0.0)
                .map(|m| m.label.as_str())
                .collect();
            let shown: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
            prop_assert_eq!(shown, expected);

            for row in &report.rows {
                prop_assert_eq!(row.support, truth.iter().filter(|&&t| enc.transform(&row.label) == Some(t)).count());
                for v in [row.precision, row.recall, row.f1] {
                    prop_assert!((v * 100.0 - (v * 100.0).round()).abs() < 1e-9);
                }
            }
        }
    }
}
