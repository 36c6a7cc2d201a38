//! Interchangeable scoring backends and their on-disk artifacts.
//!
//! Every backend implements [`ScoringModel`]: score a batch of numeric rows and
//! return one predicted outcome per row. Training happens elsewhere; this module
//! only evaluates exported parameters.

mod artifact;
mod forest;
mod logistic;
mod mlp;

pub use artifact::{load_dir, load_file, ArtifactError, ModelArtifact};
pub use forest::{DecisionTree, ForestModel, TreeNode};
pub use logistic::LogisticModel;
pub use mlp::{DenseLayer, MlpModel};

use std::fmt;
use std::sync::Arc;

use crate::recommendation::MODEL_INPUT_WIDTH;

/// Capability shared by every predictive backend.
pub trait ScoringModel: Send + Sync + fmt::Debug {
    /// Short label for the backend family, e.g. `logistic`.
    fn kind(&self) -> &'static str;

    /// Number of columns expected in each row.
    fn input_width(&self) -> usize {
        MODEL_INPUT_WIDTH
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;
}

/// Shared, immutable reference to a loaded model.
pub type ModelHandle = Arc<dyn ScoringModel>;

/// Failure raised while validating or evaluating a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("row {row} has {found} columns, model expects {expected}")]
    InputWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("model returned {found} predictions for {expected} rows")]
    OutputLength { expected: usize, found: usize },
    #[error("model produced a non-finite score for row {row}")]
    NonFiniteScore { row: usize },
    #[error("invalid model parameters: {0}")]
    InvalidParameters(String),
    #[error("{0}")]
    Backend(String),
}

pub(crate) fn check_width(rows: &[Vec<f64>], expected: usize) -> Result<(), ModelError> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(ModelError::InputWidth {
            row,
            expected,
            found: rows[row].len(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

pub(crate) fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}
