use crate::infra::build_registry;
use assessment::config::AppConfig;
use assessment::error::AppError;
use assessment::recommendation::{
    read_clients_csv_path, RawAttributes, RecommendationService, RecommendationView,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Model and ranking overrides shared by the offline commands.
#[derive(Args, Debug, Default)]
pub(crate) struct ModelSelection {
    /// Directory of model artifacts (defaults to ASSESSMENT_MODEL_DIR)
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
    /// Score with this model instead of the configured active one
    #[arg(long)]
    pub(crate) model: Option<String>,
    /// Number of recommendations to return per client
    #[arg(long)]
    pub(crate) top_k: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ModelsArgs {
    /// Directory of model artifacts (defaults to ASSESSMENT_MODEL_DIR)
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// JSON file holding one client's attributes as a flat object
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) selection: ModelSelection,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one client per row and attribute names in the header
    #[arg(long)]
    pub(crate) csv: PathBuf,
    #[command(flatten)]
    pub(crate) selection: ModelSelection,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchOutcome {
    Scored(RecommendationView),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
struct BatchEntry {
    row: usize,
    #[serde(flatten)]
    outcome: BatchOutcome,
}

fn build_service(selection: ModelSelection) -> Result<RecommendationService, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = selection.model_dir {
        config.models.dir = dir;
    }
    if let Some(model) = selection.model {
        config.models.active = Some(model);
    }
    if let Some(top_k) = selection.top_k {
        config.recommender.top_k = top_k;
    }

    let registry = build_registry(&config.models)?;
    Ok(RecommendationService::new(registry, &config.recommender))
}

pub(crate) fn run_models(args: ModelsArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.model_dir {
        config.models.dir = dir;
    }
    let registry = build_registry(&config.models)?;

    println!("Model directory: {}", config.models.dir.display());
    let names = registry.list_names();
    if names.is_empty() {
        println!("No model artifacts found");
        return Ok(());
    }

    let active = registry.active_name();
    for name in names {
        let marker = if active.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            " "
        };
        let kind = registry
            .get(&name)
            .map(|model| model.kind())
            .unwrap_or("unknown");
        println!("{marker} {name} ({kind})");
    }
    Ok(())
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let contents = std::fs::read_to_string(&args.input)?;
    let client: RawAttributes = serde_json::from_str(&contents)?;

    let service = build_service(args.selection)?;
    let result = service.recommend(&client)?;

    println!("{}", serde_json::to_string_pretty(&result.view())?);
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let clients = read_clients_csv_path(&args.csv)?;
    let service = build_service(args.selection)?;

    let entries = score_batch(&service, &clients);
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Rows are numbered from 1. A failing row is reported inline and does not
/// stop the rest of the batch.
fn score_batch(service: &RecommendationService, clients: &[RawAttributes]) -> Vec<BatchEntry> {
    clients
        .iter()
        .enumerate()
        .map(|(index, client)| {
            let outcome = match service.recommend(client) {
                Ok(result) => BatchOutcome::Scored(result.view()),
                Err(err) => BatchOutcome::Failed {
                    error: err.to_string(),
                },
            };
            BatchEntry {
                row: index + 1,
                outcome,
            }
        })
        .collect()
}
