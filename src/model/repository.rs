use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LeafError, Result};
use crate::features::HistogramConfig;
use crate::model::classifier::Classifier;
use crate::model::encoder::LabelEncoder;
use crate::network::Network;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Source of raw artifact blobs, addressed by name.
pub trait ArtifactStore {
    /// Returns the blob's bytes, or `ArtifactMissing` if it does not exist.
    fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// Reads artifacts as files from a single directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for DirectoryStore {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        debug!(path = %path.display(), "reading artifact");
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LeafError::ArtifactMissing { name: name.to_owned() },
            _ => LeafError::Io(e),
        })
    }
}

/// Fixed names of the four artifacts inside a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactNames {
    pub model: String,
    pub encoder: String,
    pub test_features: String,
    pub test_labels: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        ArtifactNames {
            model: "model.json".into(),
            encoder: "label_encoder.json".into(),
            test_features: "x_test.json".into(),
            test_labels: "y_test.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loaded artifacts
// ---------------------------------------------------------------------------

/// The trained classifier and its label encoder, validated against each other.
#[derive(Debug)]
pub struct ModelArtifacts {
    pub model: Network,
    pub encoder: LabelEncoder,
}

impl ModelArtifacts {
    pub fn classifier(&self) -> &dyn Classifier {
        &self.model
    }
}

/// Held-out evaluation data: one feature row and one true class index per sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestSet {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl TestSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Loads the model, encoder and test set once and hands out shared
/// references afterwards.
///
/// A failed load leaves the cache empty, so the next call retries.
/// Concurrent first calls block on a single initializer.
pub struct ModelRepository<S> {
    store: S,
    names: ArtifactNames,
    histogram: HistogramConfig,
    artifacts: OnceCell<Arc<ModelArtifacts>>,
    test_set: OnceCell<Arc<TestSet>>,
}

impl<S: ArtifactStore> ModelRepository<S> {
    pub fn new(store: S, histogram: HistogramConfig) -> Self {
        Self::with_names(store, ArtifactNames::default(), histogram)
    }

    pub fn with_names(store: S, names: ArtifactNames, histogram: HistogramConfig) -> Self {
        ModelRepository {
            store,
            names,
            histogram,
            artifacts: OnceCell::new(),
            test_set: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn histogram(&self) -> &HistogramConfig {
        &self.histogram
    }

    /// Returns the cached model and encoder, loading them on first use.
    pub fn load(&self) -> Result<Arc<ModelArtifacts>> {
        self.artifacts
            .get_or_try_init(|| self.read_artifacts().map(Arc::new))
            .map(Arc::clone)
    }

    /// Returns the cached test set, loading it on first use.
    pub fn load_test_set(&self) -> Result<Arc<TestSet>> {
        self.test_set
            .get_or_try_init(|| self.read_test_set().map(Arc::new))
            .map(Arc::clone)
    }

    fn read_artifacts(&self) -> Result<ModelArtifacts> {
        let model: Network = self.read_json(&self.names.model)?;
        let encoder: LabelEncoder = self.read_json(&self.names.encoder)?;

        let corrupt_model = |reason: String| LeafError::corrupt(&self.names.model, reason);
        model.validate().map_err(corrupt_model)?;
        encoder
            .validate()
            .map_err(|reason| LeafError::corrupt(&self.names.encoder, reason))?;

        let feature_len = self.histogram.feature_len();
        if model.input_width() != feature_len {
            return Err(corrupt_model(format!(
                "model takes {} features, histogram produces {}",
                model.input_width(),
                feature_len
            )));
        }
        if let Some(bins) = model.metadata.as_ref().and_then(|m| m.histogram_bins) {
            if bins != self.histogram.bins() {
                return Err(corrupt_model(format!(
                    "model was built for bins {:?}, extractor uses {:?}",
                    bins, self.histogram.bins()
                )));
            }
        }
        if model.class_count() != encoder.len() {
            return Err(corrupt_model(format!(
                "model predicts {} classes, encoder knows {}",
                model.class_count(),
                encoder.len()
            )));
        }

        info!(
            classes = encoder.len(),
            layers = model.layers.len(),
            input_width = model.input_width(),
            "loaded model artifacts"
        );
        Ok(ModelArtifacts { model, encoder })
    }

    fn read_test_set(&self) -> Result<TestSet> {
        let features: Vec<Vec<f64>> = self.read_json(&self.names.test_features)?;
        let labels: Vec<usize> = self.read_json(&self.names.test_labels)?;

        if features.len() != labels.len() {
            return Err(LeafError::TestSetMismatch { features: features.len(), labels: labels.len() });
        }
        let feature_len = self.histogram.feature_len();
        if let Some((row, bad)) = features.iter().enumerate().find(|(_, r)| r.len() != feature_len) {
            return Err(LeafError::corrupt(
                &self.names.test_features,
                format!("row {} has {} features, expected {}", row, bad.len(), feature_len),
            ));
        }

        info!(rows = labels.len(), "loaded test set");
        Ok(TestSet { features, labels })
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let bytes = self.store.read(name)?;
        serde_json::from_slice(&bytes).map_err(|e| LeafError::corrupt(name, e.to_string()))
    }
}
