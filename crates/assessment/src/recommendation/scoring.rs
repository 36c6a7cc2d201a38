use super::domain::{BaselineVector, CandidateScenario, ScoredCandidate};
use super::registry::{ModelRegistry, RegistryError};

/// Baseline and candidate scores produced by a single model.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBatch {
    pub model: String,
    pub baseline: f64,
    pub candidates: Vec<ScoredCandidate>,
}

/// Runs the baseline and candidate rows through the registry's active model.
#[derive(Debug, Clone)]
pub struct Scorer {
    registry: ModelRegistry,
}

impl Scorer {
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    /// Pins the active model once, then issues one call for the baseline row
    /// and one batched call for every candidate row.
    pub fn score(
        &self,
        baseline: &BaselineVector,
        candidates: Vec<CandidateScenario>,
    ) -> Result<ScoredBatch, RegistryError> {
        let model = self.registry.active()?;

        let baseline_score = model.score(&[baseline.baseline_row()])?[0];

        let scores = if candidates.is_empty() {
            Vec::new()
        } else {
            let rows: Vec<Vec<f64>> = candidates
                .iter()
                .map(|candidate| candidate.row().to_vec())
                .collect();
            model.score(&rows)?
        };

        let candidates = candidates
            .into_iter()
            .zip(scores)
            .map(|(scenario, score)| ScoredCandidate { scenario, score })
            .collect();

        Ok(ScoredBatch {
            model: model.name().to_string(),
            baseline: baseline_score,
            candidates,
        })
    }
}
