pub mod error;
pub mod utils;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod features;
pub mod model;
pub mod inference;
pub mod evaluation;

// Convenience re-exports
pub use error::{LeafError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, LayerSpec, ModelMetadata};
pub use features::{decode_image, HistogramConfig, HistogramExtractor};
pub use model::{
    ArtifactNames, ArtifactStore, Classifier, DirectoryStore, LabelEncoder, ModelArtifacts,
    ModelRepository, TestSet,
};
pub use inference::InferenceService;
pub use evaluation::{ClassificationReport, EvaluationReport, EvaluationReporter, EvaluationRow};
