use super::domain::{
    InterventionDimension, Recommendation, ScoredCandidate, FEATURE_COUNT, INTERVENTION_COUNT,
};

pub const DEFAULT_TOP_K: usize = 3;

/// A flag slot counts as switched on above this value.
pub const FLAG_THRESHOLD: f64 = 0.5;

/// Orders scored candidates and keeps the best `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    k: usize,
}

impl Ranker {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Highest score first; equal scores keep generation order.
    pub fn rank(&self, mut scored: Vec<ScoredCandidate>) -> Vec<Recommendation> {
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.scenario.ordinal().cmp(&b.scenario.ordinal()))
        });
        scored.truncate(self.k);

        scored
            .into_iter()
            .map(|candidate| Recommendation {
                predicted_score: candidate.score,
                interventions: decode_interventions(candidate.scenario.row())
                    .into_iter()
                    .map(|dimension| dimension.name().to_string())
                    .collect(),
            })
            .collect()
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

/// Reads the intervention block of a model row back into dimension names.
pub fn decode_interventions(row: &[f64]) -> Vec<InterventionDimension> {
    let flags = row
        .get(FEATURE_COUNT..FEATURE_COUNT + INTERVENTION_COUNT)
        .unwrap_or(&[]);
    InterventionDimension::ALL
        .into_iter()
        .zip(flags)
        .filter(|(_, value)| **value > FLAG_THRESHOLD)
        .map(|(dimension, _)| dimension)
        .collect()
}
