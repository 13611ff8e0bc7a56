use crate::error::{LeafError, Result};
use crate::math::matrix::Matrix;
use crate::network::Network;

/// The capability a trained model exposes to the rest of the pipeline.
pub trait Classifier {
    /// Number of features every input row must have.
    fn input_width(&self) -> usize;

    /// Number of classes the model can predict (`0..class_count`).
    fn class_count(&self) -> usize;

    /// Predicts one class index per input row.
    ///
    /// Fails with `FeatureShapeMismatch` if any row has the wrong width.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>>;
}

impl Classifier for Network {
    fn input_width(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    fn class_count(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        let expected = self.input_width();
        if let Some(bad) = rows.iter().find(|r| r.len() != expected) {
            return Err(LeafError::FeatureShapeMismatch { expected, actual: bad.len() });
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let outputs = self.forward_batch(Matrix::from_data(rows.to_vec()));
        Ok(outputs.data.iter().map(|row| argmax(row)).collect())
    }
}

/// Index of the maximum element; ties resolve to the lowest index.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if b >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}
