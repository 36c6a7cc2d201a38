use serde::{Deserialize, Serialize};

use super::{check_width, dot, sigmoid, ModelError, ScoringModel};

/// Fully connected layer; `weights[o]` holds the input weights of output `o`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl DenseLayer {
    pub fn new(weights: Vec<Vec<f64>>, biases: Vec<f64>) -> Self {
        Self { weights, biases }
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    fn inputs(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(weights, bias)| bias + dot(weights, input))
            .collect()
    }
}

/// Feed-forward network: ReLU hidden layers and a single sigmoid output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpModel {
    layers: Vec<DenseLayer>,
}

impl MlpModel {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ModelError> {
        let model = Self { layers };
        let width = model.layers.first().map(DenseLayer::inputs).unwrap_or(0);
        model.validate(width)?;
        Ok(model)
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub(crate) fn validate(&self, width: usize) -> Result<(), ModelError> {
        let invalid = |detail: String| Err(ModelError::InvalidParameters(detail));
        if self.layers.is_empty() {
            return invalid("network has no layers".to_string());
        }

        let mut expected_inputs = width;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.weights.is_empty() || layer.weights.len() != layer.biases.len() {
                return invalid(format!("layer {index} has mismatched weights and biases"));
            }
            if layer.weights.iter().any(|row| row.len() != expected_inputs) {
                return invalid(format!(
                    "layer {index} expects {expected_inputs} inputs per unit"
                ));
            }
            let finite = layer.biases.iter().all(|b| b.is_finite())
                && layer.weights.iter().flatten().all(|w| w.is_finite());
            if !finite {
                return invalid(format!("layer {index} has non-finite parameters"));
            }
            expected_inputs = layer.weights.len();
        }

        if expected_inputs != 1 {
            return invalid(format!(
                "output layer has {expected_inputs} units, expected 1"
            ));
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let hidden = self.layers.len().saturating_sub(1);
        let mut activations = row.to_vec();
        for (index, layer) in self.layers.iter().enumerate() {
            activations = layer.forward(&activations);
            if index < hidden {
                activations.iter_mut().for_each(|value| *value = value.max(0.0));
            }
        }
        activations.first().copied().map(sigmoid).unwrap_or(f64::NAN)
    }
}

impl ScoringModel for MlpModel {
    fn kind(&self) -> &'static str {
        "mlp"
    }

    fn input_width(&self) -> usize {
        self.layers.first().map(DenseLayer::inputs).unwrap_or(0)
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        // Deserialized networks have not been through `new`.
        self.validate(self.input_width())?;
        check_width(rows, self.input_width())?;
        Ok(rows.iter().map(|row| self.predict(row)).collect())
    }
}
