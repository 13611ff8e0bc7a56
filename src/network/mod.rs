pub mod metadata;
pub mod network;
pub mod spec;

pub use network::Network;
pub use spec::LayerSpec;
pub use metadata::ModelMetadata;
