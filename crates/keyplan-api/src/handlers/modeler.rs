//! Key layout generation endpoint.
//!
//! The modeling pipeline is synchronous and CPU-bound over a bounded request
//! body, so the handler calls it directly on the request task.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use keyplan_core::{ModelingRequest, ModelingResponse};
use tracing::{debug, instrument};

use crate::{ApiError, AppState};

// =============================================================================
// HANDLERS
// =============================================================================

/// Generate key layouts and DDL for every entity in the request.
///
/// # Returns
/// - 200 OK with one layout per modeled entity, in request order
/// - 400 Bad Request for malformed JSON or an entity that fails validation
#[utoipa::path(
    post,
    path = "/api/modeler/generate",
    tag = "Modeler",
    request_body = ModelingRequest,
    responses(
        (status = 200, description = "Layouts generated", body = ModelingResponse),
        (status = 400, description = "Malformed request or invalid entity")
    )
)]
#[instrument(skip(state, payload), fields(subsystem = "api", component = "modeler", op = "generate_models"))]
pub async fn generate_models(
    State(state): State<AppState>,
    payload: Result<Json<ModelingRequest>, JsonRejection>,
) -> Result<Json<ModelingResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    debug!(entity_count = request.entities.len(), "Received modeling request");

    let response = state.modeler.generate(&request)?;
    Ok(Json(response))
}
