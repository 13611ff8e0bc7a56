use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::metadata::ModelMetadata;
use crate::network::spec::LayerSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    /// Builds a randomly initialized network from layer specs.
    pub fn new<R: Rng + ?Sized>(layer_specs: &[LayerSpec], rng: &mut R) -> Network {
        let layers = layer_specs.iter()
            .map(|s| Layer::new(s.size, s.input_size, s.activation.clone(), rng))
            .collect();
        Network { layers, metadata: None }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Forward pass over a batch; returns one output row per input row.
    pub fn forward_batch(&self, inputs: Matrix) -> Matrix {
        self.layers.iter().fold(inputs, |current, layer| layer.forward(&current))
    }

    /// Verifies that every layer is well formed and that consecutive layers
    /// agree on their widths.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".into());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|e| format!("layer {}: {}", i, e))?;
            if layer.size == 0 || layer.input_size() == 0 {
                return Err(format!("layer {}: zero-width layer", i));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size != pair[1].input_size() {
                return Err(format!(
                    "layer {} outputs {} values but layer {} takes {}",
                    i, pair[0].size, i + 1, pair[1].input_size()
                ));
            }
        }
        Ok(())
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
