use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// A fully connected layer: `a = σ(x · W + b)`.
///
/// `weights` is `input_size × size`, `biases` is `1 × size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Creates a randomly initialized layer. ReLU-family layers get He
    /// initialization, everything else Xavier. Biases start at zero.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU
            | ActivationFunction::LeakyReLU { .. }
            | ActivationFunction::Elu { .. } => Matrix::he(input_size, size, rng),
            _ => Matrix::xavier(input_size, size, rng),
        };

        Layer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Forward pass over a batch (one sample per row).
    pub fn forward(&self, inputs: &Matrix) -> Matrix {
        let z = (inputs * &self.weights).add_row(&self.biases);
        Matrix::from_data(z.data.iter().map(|row| self.activator.apply_row(row)).collect())
    }

    /// Checks that the stored shapes agree with `size`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.weights.is_well_formed() || !self.biases.is_well_formed() {
            return Err("matrix dimensions disagree with its data".into());
        }
        if self.weights.cols != self.size {
            return Err(format!("weights have {} columns for {} neurons", self.weights.cols, self.size));
        }
        if self.biases.rows != 1 || self.biases.cols != self.size {
            return Err(format!(
                "biases are {}x{}, expected 1x{}",
                self.biases.rows, self.biases.cols, self.size
            ));
        }
        Ok(())
    }
}
