//! Client outcome scoring and intervention recommendation.
//!
//! Raw client attributes are encoded into a fixed feature vector, candidate
//! combinations of support services are scored through the active model in
//! a [`recommendation::ModelRegistry`], and the best candidates are decoded
//! into a [`recommendation::RecommendationResult`].

pub mod config;
pub mod error;
pub mod models;
pub mod recommendation;
pub mod telemetry;
