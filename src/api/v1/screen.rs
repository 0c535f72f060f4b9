//! PII screening endpoint

use axum::extract::State;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, DocumentRequest, Json};
use crate::domain::{Document, PiiScreeningResult};

/// POST /v1/screen
pub async fn screen_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<PiiScreeningResult>, ApiError> {
    request.validate()?;

    let document = Document::from(request);
    let result = state.pii_service.screen_for_pii(&document).await;

    Ok(Json(result))
}
