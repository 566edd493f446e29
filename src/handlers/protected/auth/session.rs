use axum::{Extension, Json};

use crate::rbac::Session;

/// GET /api/auth/session - the session carried by the bearer token
pub async fn session(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}
