//! Text ingestion endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::server::state::AppState;
use crate::types::{IngestRequest, IngestResponse};

use super::failure_status;

/// POST /api/ingest - Chunk, embed and store raw text
pub async fn ingest_text(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> (StatusCode, Json<IngestResponse>) {
    tracing::info!(
        "Ingest request: {} chars (source: {:?})",
        request.text.len(),
        request.source
    );

    let response = state.pipeline().ingest(request).await;

    let status = if response.success {
        StatusCode::OK
    } else {
        failure_status(response.is_validation_failure())
    };

    (status, Json(response))
}
