use serde::{Serialize, Deserialize};
use std::f64::consts::{E, PI};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Softmax is a vector-valued activation; `Layer::forward()` applies it
    /// row by row instead of calling `function()`.
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Gelu,
    Swish,
}

impl ActivationFunction {
    /// Element-wise activation. `Softmax` is the identity here; see
    /// `apply_row` for the full-vector form.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (E.powf(x) - 1.0) }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationFunction::Swish => x / (1.0 + E.powf(-x)),
        }
    }

    /// Applies the activation to one row of pre-activations.
    pub fn apply_row(&self, row: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => softmax(row),
            _ => row.iter().map(|&x| self.function(x)).collect(),
        }
    }
}

/// Numerically stable softmax (max-shifted).
fn softmax(row: &[f64]) -> Vec<f64> {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
