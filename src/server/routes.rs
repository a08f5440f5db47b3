//! Axum route handlers for the opamp HTTP server.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::{PipelineOrchestrator, PipelineResult};
use crate::styles::{MenuItem, OutputStyle};
use crate::utilities::errors::OpAmpError;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Model name reported by `/health`.
    pub model: String,
}

impl AppState {
    pub fn new(orchestrator: PipelineOrchestrator, model: impl Into<String>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            model: model.into(),
        }
    }
}

/// Body of `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub opinion_positive: String,
    pub opinion_negative: String,
    #[serde(default)]
    pub context: String,
    pub style: OutputStyle,
}

/// Body of `POST /reformat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReformatRequest {
    pub result: PipelineResult,
    pub style: OutputStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReformatResponse {
    pub style: OutputStyle,
    pub output: String,
}

/// An [`OpAmpError`] rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(OpAmpError);

impl From<OpAmpError> for ApiError {
    fn from(err: OpAmpError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            OpAmpError::Generation { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {}", self.0);
        }
        let body = serde_json::json!({
            "error": self.0.to_string(),
            "stage": self.0.stage(),
        });
        (status, Json(body)).into_response()
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/styles", get(styles_handler))
        .route("/run", post(run_handler))
        .route("/reformat", post(reformat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "opamp",
        "model": state.model,
    }))
}

/// GET /styles: the numbered menu, custom entry last.
async fn styles_handler(State(state): State<AppState>) -> Json<Value> {
    let menu: Vec<MenuItem> = state.orchestrator.catalog().menu();
    Json(serde_json::json!({ "styles": menu }))
}

/// POST /run
async fn run_handler(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<PipelineResult>, ApiError> {
    let result = state
        .orchestrator
        .run(
            &request.opinion_positive,
            &request.opinion_negative,
            &request.context,
            request.style,
        )
        .await?;
    Ok(Json(result))
}

/// POST /reformat: restyle `result.first_synthesis`; the result is not
/// modified or stored.
async fn reformat_handler(
    State(state): State<AppState>,
    Json(request): Json<ReformatRequest>,
) -> Result<Json<ReformatResponse>, ApiError> {
    let output = state
        .orchestrator
        .reformat_only(&request.result, &request.style)
        .await?;
    Ok(Json(ReformatResponse {
        style: request.style,
        output,
    }))
}
