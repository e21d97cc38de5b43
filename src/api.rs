use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::PipelineError;
use crate::pipeline::{PipelineInput, VeracityPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<VeracityPipeline>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/debug/source-prior", get(debug_source_prior))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Response {
    if state.pipeline.is_loaded() {
        (StatusCode::OK, "ok").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "loading").into_response()
    }
}

async fn predict(
    State(state): State<AppState>,
    Json(body): Json<PipelineInput>,
) -> Result<Response, ApiError> {
    let report = state.pipeline.predict(&body).await?;
    Ok(Json(report).into_response())
}

async fn debug_source_prior(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let url = q.get("url").cloned().unwrap_or_default();
    let prior = state.pipeline.source_prior(&url)?;
    Ok(Json(prior).into_response())
}

/// HTTP projection of pipeline errors. Client mistakes are 400s, missing
/// artifacts and dead scorers are 503s.
pub struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::EmptyInput => StatusCode::BAD_REQUEST,
            PipelineError::NotLoaded | PipelineError::ScorerUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        if status.is_server_error() {
            warn!(kind = self.0.kind(), error = %self.0, "request failed");
        }
        let body = json!({
            "error": {
                "kind": self.0.kind(),
                "message": self.0.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
