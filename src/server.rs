//! HTTP server exposing capture search and answering

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{AiError, Answerer, AskResponse, Capture, ProviderStatus, ScoredCapture};

#[derive(Debug, Deserialize)]
pub struct SearchRequestHttp {
    pub query: String,
    #[serde(default)]
    pub captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequestHttp {
    pub question: String,
    #[serde(default)]
    pub captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequestHttp {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub configured: bool,
    pub provider: Option<ProviderStatus>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: &AiError) -> ApiError {
    let (status, error) = match err {
        AiError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "AI is not configured"),
        AiError::Auth { .. } => (StatusCode::BAD_GATEWAY, "AI provider rejected the API key"),
        AiError::RateLimit { .. } => (StatusCode::TOO_MANY_REQUESTS, "AI provider rate limit reached"),
        AiError::Provider { .. } => (StatusCode::BAD_GATEWAY, "AI provider request failed"),
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details: Some(err.to_string()),
        }),
    )
}

async fn status_handler(State(answerer): State<Arc<Answerer>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        configured: answerer.is_configured(),
        provider: answerer.active_provider(),
    })
}

async fn search_handler(
    State(answerer): State<Arc<Answerer>>,
    Json(req): Json<SearchRequestHttp>,
) -> Json<Vec<ScoredCapture>> {
    let results = answerer.search(&req.query, &req.captures);
    info!(
        "Search ({} chars): {} of {} captures matched",
        req.query.chars().count(),
        results.len(),
        req.captures.len()
    );
    debug!("Search query: '{}'", req.query);
    Json(results)
}

async fn ask_handler(
    State(answerer): State<Arc<Answerer>>,
    Json(req): Json<AskRequestHttp>,
) -> Result<Json<AskResponse>, ApiError> {
    info!(
        "Received ask request: question {} chars, captures={}",
        req.question.chars().count(),
        req.captures.len()
    );
    debug!("Ask question: '{}'", req.question);

    match answerer.ask(&req.question, &req.captures).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            match &e {
                AiError::Configuration(_) | AiError::RateLimit { .. } => warn!("Ask failed: {}", e),
                _ => error!("Ask failed: {}", e),
            }
            Err(error_response(&e))
        }
    }
}

async fn summarize_handler(
    State(answerer): State<Arc<Answerer>>,
    Json(req): Json<SummarizeRequestHttp>,
) -> Json<SummarizeResponse> {
    Json(SummarizeResponse {
        summary: answerer.summarize(&req.content).await,
    })
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "youtopical-ai".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP server
pub fn create_router(answerer: Arc<Answerer>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ai/status", get(status_handler))
        .route("/ai/search", post(search_handler))
        .route("/ai/ask", post(ask_handler))
        .route("/ai/summarize", post(summarize_handler))
        .with_state(answerer)
}

/// Run the HTTP server
pub async fn run_server(answerer: Arc<Answerer>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting youtopical AI server on {}", addr);

    let app = create_router(answerer);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
