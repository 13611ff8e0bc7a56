use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// Describes one layer of a network layout.
///
/// Fields:
/// - `size`: number of neurons in this layer
/// - `input_size`: number of neurons feeding into this layer (the output
///   size of the previous layer, or the feature length for the first layer)
/// - `activation`: activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

impl LayerSpec {
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Self {
        LayerSpec { size, input_size, activation }
    }
}
