//! API routes for the RAG server

pub mod ingest;
pub mod query;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(query::chat))
        .route("/ingest", post(ingest::ingest_text))
        .route("/info", get(info))
}

/// 400 for rejected input, 500 for any other failure
pub(crate) fn failure_status(is_validation: bool) -> StatusCode {
    if is_validation {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// API info endpoint
async fn info(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    let config = state.config();
    axum::Json(serde_json::json!({
        "name": "cited-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Retrieval-augmented question answering with cited sources",
        "endpoints": {
            "POST /api/chat": "Answer a question with citations",
            "POST /api/ingest": "Chunk, embed and store raw text",
            "GET /health": "Liveness check"
        },
        "backend": config.backend,
        "models": config.generation.models,
        "retrieval": {
            "top_k": config.retrieval.top_k,
            "top_n": config.retrieval.top_n
        }
    }))
}
