use tracing::{debug, info};

use super::domain::{RawAttributes, RecommendationResult};
use super::encoding::{EncodingError, FeatureEncoder, MissingValuePolicy};
use super::ranking::Ranker;
use super::registry::{ModelRegistry, RegistryError};
use super::scenario::ScenarioGenerator;
use super::scoring::Scorer;
use crate::config::RecommenderConfig;

/// Service composing the encoder, scenario generator, scorer and ranker.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    registry: ModelRegistry,
    encoder: FeatureEncoder,
    generator: ScenarioGenerator,
    scorer: Scorer,
    ranker: Ranker,
    missing_values: MissingValuePolicy,
}

impl RecommendationService {
    pub fn new(registry: ModelRegistry, config: &RecommenderConfig) -> Self {
        Self::with_components(
            registry,
            FeatureEncoder::default(),
            ScenarioGenerator::new(config.interventions.clone(), config.enumeration),
            Ranker::new(config.top_k),
            config.missing_values,
        )
    }

    pub fn with_components(
        registry: ModelRegistry,
        encoder: FeatureEncoder,
        generator: ScenarioGenerator,
        ranker: Ranker,
        missing_values: MissingValuePolicy,
    ) -> Self {
        let scorer = Scorer::new(registry.clone());
        Self {
            registry,
            encoder,
            generator,
            scorer,
            ranker,
            missing_values,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn ranker(&self) -> Ranker {
        self.ranker
    }

    /// Scores the client's baseline and every candidate scenario, returning the
    /// best candidates decoded into service names.
    pub fn recommend(
        &self,
        raw: &RawAttributes,
    ) -> Result<RecommendationResult, RecommendationError> {
        self.recommend_with(raw, self.ranker)
    }

    /// Same as [`recommend`](Self::recommend) with a per-call result limit.
    pub fn recommend_top_k(
        &self,
        raw: &RawAttributes,
        k: usize,
    ) -> Result<RecommendationResult, RecommendationError> {
        self.recommend_with(raw, Ranker::new(k))
    }

    fn recommend_with(
        &self,
        raw: &RawAttributes,
        ranker: Ranker,
    ) -> Result<RecommendationResult, RecommendationError> {
        let encoded = self.encoder.encode(raw)?;
        let baseline = self
            .missing_values
            .apply(&encoded, self.encoder.schema())?;

        let candidates = self.generator.generate(&baseline);
        let candidate_count = candidates.len();
        let batch = self.scorer.score(&baseline, candidates)?;
        let recommendations = ranker.rank(batch.candidates);

        debug!(
            model = %batch.model,
            candidates = candidate_count,
            returned = recommendations.len(),
            baseline = batch.baseline,
            "recommendation scored"
        );
        if recommendations.is_empty() {
            info!(model = %batch.model, "no recommendations available");
        }

        Ok(RecommendationResult {
            model: batch.model,
            baseline: batch.baseline,
            recommendations,
        })
    }

    pub fn available_models(&self) -> Vec<String> {
        self.registry.list_names()
    }

    pub fn active_model(&self) -> Option<String> {
        self.registry.active_name()
    }

    pub fn switch_model(&self, name: &str) -> Result<(), RecommendationError> {
        self.registry.activate(name)?;
        Ok(())
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
