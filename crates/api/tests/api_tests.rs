//! Router-level tests for the prediction API

use api::error::MODEL_NOT_LOADED;
use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use decision_engine::{FeatureSchema, FeatureVector, Thresholds, FEATURE_DIMENSION};
use inference_engine::{FraudModel, InferenceError, ScoringEngine};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Model returning a fixed score and counting calls
struct FixedModel {
    score: f64,
    calls: Arc<AtomicUsize>,
}

impl FraudModel for FixedModel {
    fn fraud_probability(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.score)
    }
}

struct FailingModel;

impl FraudModel for FailingModel {
    fn fraud_probability(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
        Err(InferenceError::InferenceFailed("corrupt model state".to_string()))
    }
}

fn schema() -> FeatureSchema {
    FeatureSchema::from_names((0..FEATURE_DIMENSION).map(|i| format!("V{i}")).collect()).unwrap()
}

fn app_with_model(model: Arc<dyn FraudModel>) -> Router {
    let engine = ScoringEngine::new(schema(), model, Thresholds::default()).unwrap();
    create_router(Arc::new(AppState::new(Some(engine))))
}

fn app_with_score(score: f64) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = Arc::new(FixedModel {
        score,
        calls: Arc::clone(&calls),
    });
    (app_with_model(model), calls)
}

fn predict_request(body: Value) -> Request<Body> {
    Request::post("/predict")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn zeros(n: usize) -> Value {
    json!({ "features": vec![0.0; n] })
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_health_check() {
    let app = create_router(Arc::new(AppState::degraded()));
    let resp = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({ "status": "ok", "message": "Welcome to the Fraud Detection API" })
    );
}

#[tokio::test]
async fn test_decision_scenarios() {
    let cases = [
        (0.05, "APPROVE"),
        (0.35, "MANUAL_REVIEW"),
        (0.75, "BLOCK"),
        (0.1, "MANUAL_REVIEW"),
        (0.6, "MANUAL_REVIEW"),
    ];
    for (score, expected) in cases {
        let (app, calls) = app_with_score(score);
        let resp = app
            .oneshot(predict_request(zeros(FEATURE_DIMENSION)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["fraud_score"].as_f64(), Some(score));
        assert_eq!(body["decision"], expected, "score {score}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn test_zero_vector_with_real_backend() {
    let dir = tempfile::tempdir().unwrap();
    let features_path = dir.path().join("model_features.json");
    let names: Vec<String> = (0..FEATURE_DIMENSION).map(|i| format!("V{i}")).collect();
    std::fs::write(&features_path, serde_json::to_string(&names).unwrap()).unwrap();
    let model_path = dir.path().join("fraud_model.json");
    std::fs::write(
        &model_path,
        r#"{"intercept": -1.5, "coefficients": {"V0": 0.01, "V3": 0.2}}"#,
    )
    .unwrap();

    let mut config = api::ServiceConfig::default();
    config.artifacts.model_path = model_path;
    config.artifacts.features_path = features_path;
    let state = AppState::from_config(&config);
    assert!(!state.is_degraded());

    let resp = create_router(Arc::new(state))
        .oneshot(predict_request(zeros(FEATURE_DIMENSION)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let score = body["fraud_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
    let decision = body["decision"].as_str().unwrap();
    assert!(["APPROVE", "MANUAL_REVIEW", "BLOCK"].contains(&decision));
}

#[tokio::test]
async fn test_wrong_length_rejected_without_model_call() {
    for n in [0, 1, 149, 151, 300] {
        let (app, calls) = app_with_score(0.5);
        let resp = app.oneshot(predict_request(zeros(n))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "length {n}");
        let body = json_body(resp).await;
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["field"], "features");
        assert!(body.get("fraud_score").is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_non_numeric_rejected() {
    let mut features: Vec<Value> = vec![json!(0.0); FEATURE_DIMENSION];
    features[10] = json!("abc");

    let (app, calls) = app_with_score(0.5);
    let resp = app
        .oneshot(predict_request(json!({ "features": features })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(resp).await["kind"], "validation");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_value_beyond_f32_rejected_without_model_call() {
    let mut features = vec![0.0; FEATURE_DIMENSION];
    features[0] = 1e39;

    let (app, calls) = app_with_score(0.5);
    let resp = app
        .oneshot(predict_request(json!({ "features": features })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "features");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_field_and_malformed_json() {
    let (app, _) = app_with_score(0.5);
    let resp = app
        .clone()
        .oneshot(predict_request(json!({ "values": [1.0] })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = Request::post("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(resp).await["kind"], "validation");
}

#[tokio::test]
async fn test_degraded_service_never_scores() {
    let app = create_router(Arc::new(AppState::degraded()));
    for _ in 0..3 {
        let resp = app
            .clone()
            .oneshot(predict_request(zeros(FEATURE_DIMENSION)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(resp).await;
        assert_eq!(body, json!({ "error": MODEL_NOT_LOADED }));
    }
}

#[tokio::test]
async fn test_missing_artifacts_degrade() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = api::ServiceConfig::default();
    config.artifacts.model_path = dir.path().join("fraud_model.onnx");
    config.artifacts.features_path = dir.path().join("model_features.json");

    let state = AppState::from_config(&config);
    assert!(state.is_degraded());

    let app = create_router(Arc::new(state));
    let resp = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(predict_request(zeros(FEATURE_DIMENSION)))
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert!(body.get("error").is_some());
    assert!(body.get("fraud_score").is_none());
}

#[tokio::test]
async fn test_inference_failure_is_server_error() {
    let app = app_with_model(Arc::new(FailingModel));
    let resp = app
        .oneshot(predict_request(zeros(FEATURE_DIMENSION)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["kind"], "inference");
}

#[tokio::test]
async fn test_health_reports_model_status() {
    let (app, _) = app_with_score(0.2);
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"]["loaded"], true);
    assert_eq!(body["model"]["feature_count"], FEATURE_DIMENSION);
    assert_eq!(body["model"]["thresholds"]["low"], 0.1);

    let app = create_router(Arc::new(AppState::degraded()));
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model"]["loaded"], false);
}

#[tokio::test]
async fn test_metrics_disabled_returns_not_found() {
    let app = create_router(Arc::new(AppState::degraded()));
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
