//! HTTP front end for the extraction pipeline.
//!
//! `POST /extract` takes `{"video_id": "..."}`, `GET /extract?video_id=...` is the same
//! call for clients that can only issue GETs. Both answer with the pipeline result on
//! success; failures use a `{"detail": {...}}` body.

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::transcript::{ExtractionResult, TranscriptPipeline};
use crate::TranscriptorError;

/// Request body and query string of `/extract`
#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    /// YouTube video ID or full URL
    pub video_id: String,
}

/// Failure responses of `/extract`
#[derive(Debug)]
pub enum ApiError {
    InvalidIdentifier { error: String },
    NotFound { video_id: String, errors: Vec<String> },
    Internal { error: String },
}

impl From<TranscriptorError> for ApiError {
    fn from(error: TranscriptorError) -> Self {
        match error {
            TranscriptorError::InvalidIdentifier(_) => ApiError::InvalidIdentifier {
                error: error.to_string(),
            },
            other => ApiError::Internal {
                error: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidIdentifier { error } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "Invalid video ID or URL",
                    "error": error,
                }),
            ),
            ApiError::NotFound { video_id, errors } => (
                StatusCode::NOT_FOUND,
                json!({
                    "message": "Could not extract transcript",
                    "errors": errors,
                    "video_id": video_id,
                }),
            ),
            ApiError::Internal { error } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "message": "Internal server error",
                    "error": error,
                    "timestamp": Utc::now(),
                }),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Build the service router around a shared pipeline
pub fn build_router(pipeline: Arc<TranscriptPipeline>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/extract", get(extract_query).post(extract_body))
        .layer(middleware::from_fn(cors))
        .with_state(pipeline)
}

/// Bind `host:port` and serve until Ctrl-C
pub async fn serve(pipeline: Arc<TranscriptPipeline>, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Transcript service listening");

    axum::serve(listener, build_router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Transcript service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "YouTube Transcript Extractor API",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn extract_body(
    State(pipeline): State<Arc<TranscriptPipeline>>,
    Json(request): Json<TranscriptRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    run_extraction(&pipeline, &request.video_id).await
}

async fn extract_query(
    State(pipeline): State<Arc<TranscriptPipeline>>,
    Query(request): Query<TranscriptRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    tracing::info!(video_id = %request.video_id, "GET extract request");
    run_extraction(&pipeline, &request.video_id).await
}

async fn run_extraction(pipeline: &TranscriptPipeline, input: &str) -> Result<Json<ExtractionResult>, ApiError> {
    match pipeline.extract(input).await {
        Ok(result) if result.success => Ok(Json(result)),
        Ok(result) => Err(ApiError::NotFound {
            errors: result.errors.unwrap_or_default(),
            video_id: result.video_id,
        }),
        Err(error) => {
            match &error {
                TranscriptorError::InvalidIdentifier(_) => {
                    tracing::info!(input, "Rejected extract request: {}", error)
                }
                _ => tracing::error!(input, error = %error, "Extract request failed"),
            }
            Err(error.into())
        }
    }
}

/// Allow any origin, answering preflight requests directly
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}
