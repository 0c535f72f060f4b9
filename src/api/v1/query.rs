//! Question answering endpoint

use axum::extract::State;
use tracing::debug;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest};
use crate::domain::ResultEnvelope;

/// POST /v1/query
///
/// Pipeline failures are reported inside the envelope with a `failed` tag,
/// so only malformed requests produce an error status.
pub async fn process_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    request.validate()?;
    debug!(query_chars = request.query.len(), "Processing query");

    let envelope = state
        .query_service
        .process_query(&request.query, &request.context)
        .await;

    Ok(Json(envelope))
}
