use crate::cli::ServeArgs;
use crate::infra::{build_registry, AppState};
use crate::routes::with_recommendation_routes;
use assessment::config::AppConfig;
use assessment::error::AppError;
use assessment::recommendation::RecommendationService;
use assessment::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let registry = build_registry(&config.models)?;
    let service = Arc::new(RecommendationService::new(
        registry.clone(),
        &config.recommender,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        registry: registry.clone(),
    };

    let app = with_recommendation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        active_model = ?registry.active_name(),
        top_k = config.recommender.top_k,
        "assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
