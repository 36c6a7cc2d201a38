use assessment::config::ModelConfig;
use assessment::error::AppError;
use assessment::models;
use assessment::recommendation::{ModelRegistry, RecommendationError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) registry: ModelRegistry,
}

/// Loads every artifact in the model directory and applies the configured
/// active model. A missing directory yields an empty registry.
pub(crate) fn build_registry(config: &ModelConfig) -> Result<ModelRegistry, AppError> {
    let registry = ModelRegistry::new();

    if config.dir.is_dir() {
        for (name, handle) in models::load_dir(&config.dir)? {
            registry.register(name, handle);
        }
    } else {
        warn!(dir = %config.dir.display(), "model directory not found");
    }

    if let Some(active) = &config.active {
        registry
            .activate(active)
            .map_err(RecommendationError::from)?;
    }

    info!(
        dir = %config.dir.display(),
        models = ?registry.list_names(),
        active = ?registry.active_name(),
        "model registry loaded"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn write_logistic(dir: &Path, name: &str) {
        let artifact = json!({
            "kind": "logistic",
            "intercept": 0.0,
            "coefficients": vec![0.05; 31],
        });
        std::fs::write(dir.join(format!("{name}.json")), artifact.to_string()).expect("write");
    }

    #[test]
    fn missing_directory_yields_empty_registry() {
        let config = ModelConfig {
            dir: "does/not/exist".into(),
            active: None,
        };
        let registry = build_registry(&config).expect("registry");
        assert!(registry.is_empty());
        assert_eq!(registry.active_name(), None);
    }

    #[test]
    fn configured_model_becomes_active() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logistic(dir.path(), "logistic_regression");
        write_logistic(dir.path(), "neural_net");

        let config = ModelConfig {
            dir: dir.path().to_path_buf(),
            active: Some("neural_net".to_string()),
        };
        let registry = build_registry(&config).expect("registry");

        assert_eq!(
            registry.list_names(),
            vec!["logistic_regression", "neural_net"]
        );
        assert_eq!(registry.active_name().as_deref(), Some("neural_net"));
    }

    #[test]
    fn first_artifact_is_active_by_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logistic(dir.path(), "random_forest");
        write_logistic(dir.path(), "logistic_regression");

        let config = ModelConfig {
            dir: dir.path().to_path_buf(),
            active: None,
        };
        let registry = build_registry(&config).expect("registry");
        assert_eq!(
            registry.active_name().as_deref(),
            Some("logistic_regression")
        );
    }

    #[test]
    fn unknown_configured_model_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logistic(dir.path(), "logistic_regression");

        let config = ModelConfig {
            dir: dir.path().to_path_buf(),
            active: Some("svm".to_string()),
        };
        assert!(matches!(
            build_registry(&config),
            Err(AppError::Recommendation(_))
        ));
    }
}
