// Record-level operations: GET/PUT/DELETE /api/data/:resource/:id

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{authorize, into_record};
use crate::error::ApiResult;
use crate::rbac::Session;
use crate::renderer::validate_form;
use crate::resources::FormField;
use crate::server::AppState;
use crate::types::Record;

/// GET /api/data/:resource/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let descriptor = authorize(&state, &session, &resource)?;
    Ok(Json(state.store.get(&descriptor.name, &id).await?))
}

/// PUT /api/data/:resource/:id - partial update
///
/// Only the fields present in the body are validated and merged.
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Record>> {
    let descriptor = authorize(&state, &session, &resource)?;
    let body = into_record(body)?;

    let present: Vec<FormField> = descriptor
        .form_fields
        .iter()
        .filter(|f| body.contains_key(&f.name))
        .cloned()
        .collect();
    let patch = validate_form(&present, &body)?;

    let record = state.store.update(&descriptor.name, &id, patch).await?;
    tracing::info!(resource = %descriptor.name, id = %id, by = %session.email, "record updated");
    Ok(Json(record))
}

/// DELETE /api/data/:resource/:id - returns the removed record
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let descriptor = authorize(&state, &session, &resource)?;
    let record = state.store.delete(&descriptor.name, &id).await?;
    tracing::info!(resource = %descriptor.name, id = %id, by = %session.email, "record deleted");
    Ok(Json(record))
}
