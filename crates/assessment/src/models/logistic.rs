use serde::{Deserialize, Serialize};

use super::{check_width, dot, sigmoid, ModelError, ScoringModel};

/// Binary logistic regression exported as an intercept plus one coefficient per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self, ModelError> {
        let model = Self {
            intercept,
            coefficients,
        };
        model.validate(model.coefficients.len())?;
        Ok(model)
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub(crate) fn validate(&self, width: usize) -> Result<(), ModelError> {
        if self.coefficients.len() != width {
            return Err(ModelError::InvalidParameters(format!(
                "logistic model has {} coefficients, expected {width}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidParameters(
                "logistic parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl ScoringModel for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        check_width(rows, self.coefficients.len())?;
        Ok(rows
            .iter()
            .map(|row| sigmoid(self.intercept + dot(&self.coefficients, row)))
            .collect())
    }
}
