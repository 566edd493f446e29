// handlers/protected/upload.rs - POST /upload, GET /api/uploads

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::require_role;
use crate::rbac::{Role, Session};
use crate::server::AppState;
use crate::uploads::{UploadError, UploadRecord};

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub id: Uuid,
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => ApiError::payload_too_large(err.to_string()),
            UploadError::Empty => ApiError::bad_request(err.to_string()),
            UploadError::Io(io) => {
                tracing::error!("upload write failed: {}", io);
                ApiError::internal_server_error("Could not store the uploaded file")
            }
        }
    }
}

/// POST /upload - multipart form with a `file` field
pub async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("Uploaded file exceeds the size limit")
            } else {
                ApiError::bad_request(format!("Could not read uploaded file: {}", e))
            }
        })?;

        let record = state.uploads.save(&original_name, &bytes, &session.email).await?;
        return Ok((StatusCode::CREATED, Json(UploadResponse::from(record))));
    }

    Err(ApiError::bad_request("No file uploaded (expected multipart field 'file')"))
}

/// GET /api/uploads - everything uploaded since start, operators and up
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Vec<UploadRecord>>> {
    require_role(&session, Role::Operator)?;
    Ok(Json(state.uploads.list().await))
}

impl From<UploadRecord> for UploadResponse {
    fn from(record: UploadRecord) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: record.filename,
            original_name: record.original_name,
            size: record.size,
            id: record.id,
        }
    }
}
