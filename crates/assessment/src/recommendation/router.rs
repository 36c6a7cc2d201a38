use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::RawAttributes;
use super::registry::RegistryError;
use super::service::{RecommendationError, RecommendationService};

/// Request body for switching the active model.
#[derive(Debug, Deserialize)]
pub struct SwitchModelRequest {
    pub model_name: String,
}

/// Router exposing recommendation scoring and model administration.
pub fn recommendation_router(service: Arc<RecommendationService>) -> Router {
    Router::new()
        .route("/api/v1/recommendations", post(recommend_handler))
        .route("/api/v1/models", get(list_models_handler))
        .route(
            "/api/v1/models/active",
            get(active_model_handler).put(switch_model_handler),
        )
        .with_state(service)
}

/// Maps service errors onto client, readiness and server failures.
pub fn status_for(error: &RecommendationError) -> StatusCode {
    match error {
        RecommendationError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecommendationError::Registry(RegistryError::UnknownModel(_)) => StatusCode::BAD_REQUEST,
        RecommendationError::Registry(RegistryError::NoActiveModel) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RecommendationError::Registry(RegistryError::Model { .. }) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: RecommendationError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!(%error, "recommendation request failed");
    }
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": rejection.body_text() });
    (rejection.status(), Json(payload)).into_response()
}

pub(crate) async fn recommend_handler(
    State(service): State<Arc<RecommendationService>>,
    body: Result<Json<RawAttributes>, JsonRejection>,
) -> Response {
    let raw = match body {
        Ok(Json(raw)) => raw,
        Err(rejection) => return rejection_response(rejection),
    };
    // Model evaluation is synchronous CPU work; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || service.recommend(&raw)).await;

    match outcome {
        Ok(Ok(result)) => (StatusCode::OK, Json(result.view())).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(%join_error, "recommendation worker did not complete");
            let payload = json!({ "error": "recommendation worker failed" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn list_models_handler(
    State(service): State<Arc<RecommendationService>>,
) -> Response {
    let payload = json!({
        "available_models": service.available_models(),
        "active_model": service.active_model(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn active_model_handler(
    State(service): State<Arc<RecommendationService>>,
) -> Response {
    match service.registry().active() {
        Ok(model) => {
            let payload = json!({
                "active_model": model.name(),
                "kind": model.kind(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn switch_model_handler(
    State(service): State<Arc<RecommendationService>>,
    body: Result<Json<SwitchModelRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.switch_model(&request.model_name) {
        Ok(()) => {
            let payload = json!({
                "message": format!("Model set to {}", request.model_name),
                "active_model": request.model_name,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
