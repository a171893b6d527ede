use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt; // for `app.oneshot()`

use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::observability::REQUESTS_TOTAL;
use crate::server::{handlers, routes};
use crate::testing;

fn app() -> Router {
    routes::create_router(testing::app_state(testing::scenario_bundle(), false))
}

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn predict(app: Router, body: &Value) -> (StatusCode, Value) {
    send(app, predict_request(body.to_string())).await
}

/// Sends one request on a current-thread runtime so the thread-local recorder
/// sees every metric. Returns the status, the body and the rendered metrics.
fn send_recorded(app: Router, request: Request<Body>) -> (StatusCode, Value, String) {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let (status, body) =
        metrics::with_local_recorder(&recorder, || runtime.block_on(send(app, request)));
    (status, body, handle.render())
}

fn without(field: &str) -> Value {
    let mut body = testing::biscoe_male_body();
    body.as_object_mut().unwrap().remove(field);
    body
}

#[tokio::test]
async fn test_health_check_handler() {
    assert_eq!(handlers::health_check().await, "OK");
}

#[tokio::test]
async fn test_health_route() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_route() {
    let response = app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_predict_success() {
    let (status, body) = predict(app(), &testing::biscoe_male_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predicted_species": "Gentoo"}));
}

#[tokio::test]
async fn test_identical_requests_give_identical_labels() {
    let app = app();
    let (_, first) = predict(app.clone(), &testing::biscoe_male_body()).await;
    let (_, second) = predict(app, &testing::biscoe_male_body()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_sex_returns_422() {
    let body = without("sex");
    let (status, response) = predict(app(), &body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["error"], "validation_error");
    assert_eq!(response["body"], body);
    let detail = response["detail"].as_array().unwrap();
    assert!(detail
        .iter()
        .any(|d| d["loc"] == json!(["body", "sex"]) && d["type"] == "missing"));
}

#[tokio::test]
async fn test_invalid_json_returns_422_with_raw_body() {
    let (status, response) = send(app(), predict_request("{\"island\": ")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"][0]["type"], "json_invalid");
    assert_eq!(response["body"], "{\"island\": ");
}

#[tokio::test]
async fn test_invalid_payloads_never_reach_the_classifier() {
    // Any request that reaches this classifier fails with a 500.
    let app = routes::create_router(testing::app_state(testing::exploding_bundle(), false));

    let mut negative_mass = testing::biscoe_male_body();
    negative_mass["body_mass_g"] = json!(-10);
    let mut unknown_sex = testing::biscoe_male_body();
    unknown_sex["sex"] = json!("unknown");
    let missing_bill = without("bill_length_mm");

    for body in [negative_mass, unknown_sex, missing_bill] {
        let (status, response) = predict(app.clone(), &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body {body}");
        assert_eq!(response["error"], "validation_error");
    }

    let (status, _) = predict(app, &testing::biscoe_male_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_inference_error_is_opaque_by_default() {
    let app = routes::create_router(testing::app_state(testing::exploding_bundle(), false));
    let (status, body) = predict(app, &testing::biscoe_male_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "internal_server_error", "detail": INTERNAL_ERROR_MESSAGE})
    );
}

#[tokio::test]
async fn test_inference_error_detail_when_exposed() {
    let app = routes::create_router(testing::app_state(testing::exploding_bundle(), true));
    let (status, body) = predict(app, &testing::biscoe_male_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "http_error");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("non-finite score"));
}

#[tokio::test]
async fn test_panic_becomes_opaque_500() {
    async fn boom() -> &'static str {
        panic!("secret internal state")
    }

    let router: Router = Router::new().route("/boom", get(boom));
    let app = routes::with_boundary(router);

    let (status, body) = send(app, Request::get("/boom").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_server_error");
    assert!(!body.to_string().contains("secret"));
}

#[tokio::test]
async fn test_predict_requires_post() {
    let response = app()
        .oneshot(Request::get("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn test_oversized_body_is_counted() {
    let oversized = format!("{{\"island\": \"{}\"}}", "x".repeat(3 * 1024 * 1024));
    let (status, body, rendered) = send_recorded(app(), predict_request(oversized));

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "http_error");
    assert!(rendered.contains(REQUESTS_TOTAL));
    assert!(rendered.contains(r#"outcome="rejected_body""#));
    assert!(!rendered.contains(r#"outcome="validation_error""#));
}

#[test]
fn test_panic_is_counted() {
    async fn boom() -> &'static str {
        panic!("secret internal state")
    }

    let app = routes::with_boundary(Router::new().route("/boom", get(boom)));
    let request = Request::get("/boom").body(Body::empty()).unwrap();
    let (status, _, rendered) = send_recorded(app, request);

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(rendered.contains(r#"outcome="internal_error""#));
}

#[test]
fn test_validation_failure_is_counted() {
    let request = predict_request(without("sex").to_string());
    let (status, _, rendered) = send_recorded(app(), request);

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rendered.contains(r#"outcome="validation_error""#));
}
