//! Intervention recommendation: encode a client, enumerate service
//! combinations, score them with the active model and rank the results.

pub mod domain;
pub mod encoding;
pub mod import;
pub mod ranking;
pub mod registry;
pub mod router;
pub mod scenario;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AttributeValue, BaselineVector, CandidateScenario, FeatureVector, InterventionDimension,
    RawAttributes, Recommendation, RecommendationResult, RecommendationView, ScoredCandidate,
    UnknownIntervention, FEATURE_COUNT, INTERVENTION_COUNT, MODEL_INPUT_WIDTH,
};
pub use encoding::{
    CategoricalMapping, EncodingError, FeatureEncoder, FeatureSchema, MissingValuePolicy,
};
pub use import::{read_clients_csv, read_clients_csv_path, ClientImportError};
pub use ranking::{decode_interventions, Ranker, DEFAULT_TOP_K};
pub use registry::{ActiveModel, ModelRegistry, RegistryError};
pub use router::recommendation_router;
pub use scenario::{EnumerationPolicy, FallbackStrategy, ScenarioGenerator};
pub use scoring::{ScoredBatch, Scorer};
pub use service::{RecommendationError, RecommendationService};
