//! Error types for the leaf classification pipeline.
//!
//! Every fallible operation in the crate returns [`LeafError`]. None of the
//! variants are retried internally; callers (the CLI or the studio) decide
//! how to present them.

use thiserror::Error;

/// Errors produced by feature extraction, artifact loading, inference and
/// evaluation.
#[derive(Error, Debug)]
pub enum LeafError {
    /// The image handed to the feature extractor is empty or malformed.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    /// The uploaded bytes could not be decoded as an image.
    #[error("image decode")]
    Decode(#[source] image::ImageError),

    /// A required artifact is not present in the artifact store.
    #[error("artifact '{name}' is missing")]
    ArtifactMissing { name: String },

    /// An artifact exists but does not deserialize or fails validation.
    #[error("artifact '{name}' is corrupt: {reason}")]
    ArtifactCorrupt { name: String, reason: String },

    /// A feature vector's length disagrees with the model's input width.
    #[error("feature vector has {actual} values, model expects {expected}")]
    FeatureShapeMismatch { expected: usize, actual: usize },

    /// A class index has no label in the encoder (model/encoder skew).
    #[error("class index {index} is outside the encoder's {class_count} classes")]
    UnknownClassIndex { index: usize, class_count: usize },

    /// An evaluation was requested over a test set with no rows.
    #[error("test set is empty")]
    EmptyTestSet,

    /// The test feature matrix and label vector have different lengths.
    #[error("test set has {features} feature rows but {labels} labels")]
    TestSetMismatch { features: usize, labels: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("io")]
    Io(#[from] std::io::Error),

    #[error("json")]
    Json(#[from] serde_json::Error),
}

impl LeafError {
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        LeafError::InvalidImage { reason: reason.into() }
    }

    pub fn corrupt(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LeafError::ArtifactCorrupt { name: name.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, LeafError>;
