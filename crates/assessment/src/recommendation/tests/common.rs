use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::RecommenderConfig;
use crate::models::{ModelError, ModelHandle, ScoringModel};
use crate::recommendation::domain::{
    CandidateScenario, InterventionDimension, RawAttributes, ScoredCandidate, FEATURE_COUNT,
    MODEL_INPUT_WIDTH,
};
use crate::recommendation::registry::ModelRegistry;
use crate::recommendation::service::RecommendationService;
use crate::recommendation::{BaselineVector, FeatureEncoder, MissingValuePolicy};

/// Scores `base + step * flags_on`, so more services always predict better outcomes.
#[derive(Debug)]
pub(super) struct FlagCountModel {
    pub(super) base: f64,
    pub(super) step: f64,
}

impl ScoringModel for FlagCountModel {
    fn kind(&self) -> &'static str {
        "flag_count"
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Ok(rows
            .iter()
            .map(|row| self.base + self.step * row[FEATURE_COUNT..].iter().sum::<f64>())
            .collect())
    }
}

/// Linear in the intervention flags with a weight per dimension.
#[derive(Debug)]
pub(super) struct WeightedFlagModel {
    pub(super) base: f64,
    pub(super) weights: [f64; 7],
}

impl ScoringModel for WeightedFlagModel {
    fn kind(&self) -> &'static str {
        "weighted_flags"
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Ok(rows
            .iter()
            .map(|row| {
                self.base
                    + row[FEATURE_COUNT..]
                        .iter()
                        .zip(self.weights)
                        .map(|(flag, weight)| flag * weight)
                        .sum::<f64>()
            })
            .collect())
    }
}

#[derive(Debug)]
pub(super) struct ConstantModel(pub(super) f64);

impl ScoringModel for ConstantModel {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Ok(vec![self.0; rows.len()])
    }
}

#[derive(Debug)]
pub(super) struct FailingModel;

impl ScoringModel for FailingModel {
    fn kind(&self) -> &'static str {
        "failing"
    }

    fn score(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::Backend("weights unavailable".to_string()))
    }
}

#[derive(Debug)]
pub(super) struct ShortOutputModel;

impl ScoringModel for ShortOutputModel {
    fn kind(&self) -> &'static str {
        "short"
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Ok(vec![0.5; rows.len().saturating_sub(1)])
    }
}

/// Records batch sizes so tests can assert how often the backend was called.
#[derive(Debug, Default)]
pub(super) struct RecordingModel {
    pub(super) batches: Mutex<Vec<usize>>,
    pub(super) calls: AtomicUsize,
}

impl RecordingModel {
    pub(super) fn batches(&self) -> Vec<usize> {
        self.batches.lock().expect("batch mutex poisoned").clone()
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoringModel for RecordingModel {
    fn kind(&self) -> &'static str {
        "recording"
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .expect("batch mutex poisoned")
            .push(rows.len());
        assert!(rows.iter().all(|row| row.len() == MODEL_INPUT_WIDTH));
        Ok(vec![0.5; rows.len()])
    }
}

pub(super) fn flag_count_model() -> ModelHandle {
    Arc::new(FlagCountModel {
        base: 0.2,
        step: 0.1,
    })
}

pub(super) fn constant_model(score: f64) -> ModelHandle {
    Arc::new(ConstantModel(score))
}

/// Complete client covering numeric, boolean, categorical and numeric-text inputs.
pub(super) fn complete_client() -> RawAttributes {
    RawAttributes::new()
        .with("age", 34i64)
        .with("gender", 1i64)
        .with("work_experience", 6i64)
        .with("canada_workex", 2i64)
        .with("dep_num", 1i64)
        .with("canada_born", "Yes")
        .with("citizen_status", 2i64)
        .with("level_of_schooling", "Grade 0-8")
        .with("fluent_english", "yes")
        .with("reading_english_scale", 7i64)
        .with("speaking_english_scale", 8i64)
        .with("writing_english_scale", 6i64)
        .with("numeracy_scale", 5i64)
        .with("computer_scale", "4")
        .with("transportation_bool", true)
        .with("caregiver_bool", false)
        .with("housing", "Renting-private")
        .with("income_source", "No Source of Income")
        .with("felony_bool", "false")
        .with("attending_school", false)
        .with("currently_employed", "No")
        .with("substance_use", false)
        .with("time_unemployed", 12i64)
        .with("need_mental_health_support_bool", "true")
}

pub(super) fn baseline() -> BaselineVector {
    let encoder = FeatureEncoder::default();
    let vector = encoder.encode(&complete_client()).expect("client encodes");
    MissingValuePolicy::Reject
        .apply(&vector, encoder.schema())
        .expect("client is complete")
}

pub(super) fn registry_with(models: Vec<(&str, ModelHandle)>) -> ModelRegistry {
    let registry = ModelRegistry::new();
    for (name, handle) in models {
        registry.register(name, handle);
    }
    registry
}

pub(super) fn service_with(registry: ModelRegistry) -> RecommendationService {
    RecommendationService::new(registry, &RecommenderConfig::default())
}

pub(super) fn service_with_config(
    registry: ModelRegistry,
    config: RecommenderConfig,
) -> RecommendationService {
    RecommendationService::new(registry, &config)
}

pub(super) fn scored(
    ordinal: usize,
    score: f64,
    enabled: &[InterventionDimension],
) -> ScoredCandidate {
    ScoredCandidate {
        scenario: CandidateScenario::new(ordinal, &baseline(), enabled.to_vec()),
        score,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
