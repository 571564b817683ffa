//! Chat endpoint: cited answers over the indexed corpus

use axum::{extract::State, http::StatusCode, Json};

use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

use super::failure_status;

/// POST /api/chat - Answer a question with citations
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> (StatusCode, Json<QueryResponse>) {
    let response = state.pipeline().query(request).await;

    let status = if response.success {
        StatusCode::OK
    } else {
        failure_status(response.is_validation_failure())
    };

    (status, Json(response))
}
