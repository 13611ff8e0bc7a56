pub mod classifier;
pub mod encoder;
pub mod repository;
pub mod scaffold;

pub use classifier::Classifier;
pub use encoder::LabelEncoder;
pub use repository::{ArtifactNames, ArtifactStore, DirectoryStore, ModelArtifacts, ModelRepository, TestSet};
