use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::recommendation::registry::ModelRegistry;
use crate::recommendation::router::{list_models_handler, recommendation_router};

fn router(registry: ModelRegistry) -> Router {
    recommendation_router(Arc::new(service_with(registry)))
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn client_body() -> serde_json::Value {
    serde_json::to_value(complete_client()).expect("client serializes")
}

#[tokio::test]
async fn recommend_returns_ranked_view() {
    let app = router(registry_with(vec![("flags", flag_count_model())]));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/recommendations",
            client_body(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["model"], "flags");
    assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(3));
    assert_eq!(
        body["recommendations"][0]["interventions"]
            .as_array()
            .map(Vec::len),
        Some(7)
    );
    assert!(body["summary"]
        .as_str()
        .is_some_and(|summary| summary.starts_with("best of 3")));
}

#[tokio::test]
async fn incomplete_client_is_unprocessable() {
    let app = router(registry_with(vec![("flags", flag_count_model())]));
    let mut body = client_body();
    body.as_object_mut().expect("object").remove("age");

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/recommendations", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("age")));
}

#[tokio::test]
async fn extra_nested_keys_are_ignored() {
    let app = router(registry_with(vec![("flags", flag_count_model())]));
    let mut body = client_body();
    let object = body.as_object_mut().expect("object");
    object.insert("case_notes".to_string(), json!(["a"]));
    object.insert("contact".to_string(), json!({ "city": "Toronto" }));

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/recommendations", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["model"], "flags");
}

#[tokio::test]
async fn nested_value_in_a_feature_slot_is_unprocessable() {
    let app = router(registry_with(vec![("flags", flag_count_model())]));
    let mut body = client_body();
    body["housing"] = json!(["Renting-private"]);

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/recommendations", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("housing")));
}

#[tokio::test]
async fn malformed_body_gets_a_json_error() {
    let app = router(registry_with(vec![("flags", flag_count_model())]));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/recommendations")
        .header("content-type", "application/json")
        .body(Body::from("{\"age\": 3"))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn switch_without_model_name_gets_a_json_error() {
    let app = router(registry_with(vec![("flags", flag_count_model())]));

    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/models/active",
            json!({ "name": "flags" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("model_name")));
}

#[tokio::test]
async fn recommend_without_models_is_unavailable() {
    let app = router(ModelRegistry::new());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/recommendations",
            client_body(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn failing_backend_is_a_server_error() {
    let app = router(registry_with(vec![("broken", Arc::new(FailingModel))]));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/recommendations",
            client_body(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn switch_then_read_active_model() {
    let app = router(registry_with(vec![
        ("flags", flag_count_model()),
        ("flat", constant_model(0.4)),
    ]));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/models/active",
            json!({ "model_name": "flat" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["message"], "Model set to flat");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/models/active")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["active_model"], "flat");
    assert_eq!(body["kind"], "constant");
}

#[tokio::test]
async fn switching_to_unknown_model_is_a_bad_request() {
    let registry = registry_with(vec![("flags", flag_count_model())]);
    let app = router(registry.clone());

    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/models/active",
            json!({ "model_name": "svm" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(registry.active_name().as_deref(), Some("flags"));
}

#[tokio::test]
async fn active_model_without_registrations_is_unavailable() {
    let response = router(ModelRegistry::new())
        .oneshot(
            Request::builder()
                .uri("/api/v1/models/active")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn lists_models_with_active_entry() {
    let service = Arc::new(service_with(registry_with(vec![
        ("logistic_regression", constant_model(0.3)),
        ("random_forest", constant_model(0.6)),
    ])));

    let response = list_models_handler(State(service)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(
        body["available_models"],
        json!(["logistic_regression", "random_forest"])
    );
    assert_eq!(body["active_model"], "logistic_regression");
}
