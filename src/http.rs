use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::PredictError;
use crate::metrics::{Endpoint, MetricsRegistry};
use crate::service::PredictService;

const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<PredictService>,
    pub metrics: Arc<MetricsRegistry>,
    pub examples: Arc<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Raw sample payload in any accepted shape; absent counts as empty.
    #[serde(default)]
    pub samples: Option<Value>,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    predictions: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct ExplainResponse {
    importances: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

pub async fn serve(addr: String, state: ApiState, cors_origin: String) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(state).layer(cors_layer(&cors_origin));

    let addr: SocketAddr = addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/explain", post(explain))
        .route("/examples", get(examples))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    state.metrics.record_request(Endpoint::Health);
    Json(HealthResponse { status: "ok" })
}

async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}

async fn predict(
    State(state): State<ApiState>,
    Json(request): Json<PredictRequest>,
) -> Response {
    match state.service.predict(request.samples.as_ref()) {
        Ok(predictions) => Json(PredictResponse { predictions }).into_response(),
        Err(error) => error_response(&error).into_response(),
    }
}

async fn explain(State(state): State<ApiState>) -> Response {
    match state.service.explain() {
        Ok(importances) => Json(ExplainResponse { importances }).into_response(),
        Err(error) => error_response(&error).into_response(),
    }
}

async fn examples(State(state): State<ApiState>) -> Json<Value> {
    Json(Value::Object(state.examples.as_ref().clone()))
}

fn error_response(error: &PredictError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(error),
        Json(ErrorResponse {
            detail: error.to_string(),
        }),
    )
}

/// Artifact failures are server faults; everything else in the taxonomy is a
/// client-input fault.
fn status_for(error: &PredictError) -> StatusCode {
    match error {
        PredictError::Artifact(_) => StatusCode::SERVICE_UNAVAILABLE,
        PredictError::Validation(_) | PredictError::ShapeMismatch { .. } | PredictError::Model(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn cors_layer(allowed: &str) -> CorsLayer {
    let cors = if allowed.trim() == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = allowed
            .split(',')
            .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    cors.allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
