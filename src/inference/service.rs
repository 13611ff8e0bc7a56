use image::RgbImage;
use tracing::{debug, info};

use crate::error::{LeafError, Result};
use crate::features::HistogramExtractor;
use crate::model::{Classifier, LabelEncoder, ModelArtifacts};

/// Turns feature vectors (or images) into class labels.
pub struct InferenceService<'a> {
    model: &'a dyn Classifier,
    encoder: &'a LabelEncoder,
}

impl<'a> InferenceService<'a> {
    pub fn new(model: &'a dyn Classifier, encoder: &'a LabelEncoder) -> Self {
        InferenceService { model, encoder }
    }

    pub fn from_artifacts(artifacts: &'a ModelArtifacts) -> Self {
        InferenceService::new(artifacts.classifier(), &artifacts.encoder)
    }

    /// Predicts the label for a single feature vector.
    ///
    /// The vector must have exactly the model's input width; it is never
    /// truncated or padded.
    pub fn predict(&self, features: &[f64]) -> Result<String> {
        let expected = self.model.input_width();
        if features.len() != expected {
            return Err(LeafError::FeatureShapeMismatch { expected, actual: features.len() });
        }

        let predicted = self.model.predict_batch(&[features.to_vec()])?;
        let index = predicted.first().copied().ok_or_else(|| {
            LeafError::corrupt("model", "classifier returned no prediction for a single-row batch")
        })?;
        let label = self.encoder.inverse_transform(index)?;

        debug!(index, label, "resolved prediction");
        Ok(label.to_owned())
    }

    /// Extracts the histogram of `image` and predicts its label.
    pub fn predict_image(&self, extractor: &HistogramExtractor, image: &RgbImage) -> Result<String> {
        let features = extractor.extract(image)?;
        let label = self.predict(&features)?;
        info!(width = image.width(), height = image.height(), %label, "classified image");
        Ok(label)
    }
}
