//! Document classification endpoint

use axum::extract::State;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, DocumentRequest, Json};
use crate::domain::{ClassificationResult, Document};

/// POST /v1/classify
pub async fn classify_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<ClassificationResult>, ApiError> {
    request.validate()?;

    let document = Document::from(request);
    let result = state.classification_service.classify_document(&document).await;

    Ok(Json(result))
}
