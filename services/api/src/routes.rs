use crate::infra::AppState;
use assessment::recommendation::{recommendation_router, RecommendationService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_recommendation_routes(service: Arc<RecommendationService>) -> axum::Router {
    recommendation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the listener is bound and a model is active.
pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let bound = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let active = state.registry.active_name();

    match (bound, active) {
        (true, Some(model)) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "active_model": model })),
        ),
        (false, _) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        ),
        (true, None) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "no_active_model" })),
        ),
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
