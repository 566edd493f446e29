// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::client::SignInResponse;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// POST /auth/login - issue a session token for an identity
///
/// Stands in for the external sign-in provider: the identity is trusted,
/// the role comes from the role-assignment store.
///
/// Expected Input:
/// ```json
/// { "email": "ada@academy.test", "name": "Ada" }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiI...",
///   "session": { "userId": "…", "email": "ada@academy.test", "name": "Ada", "role": "user" },
///   "expiresIn": 604800
/// }
/// ```
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<Json<SignInResponse>> {
    let email = payload.email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ApiError::validation_error("A valid email is required", None));
    }

    let session = state
        .accounts
        .sign_in(email, payload.name.as_deref(), payload.avatar_url.as_deref())
        .await;
    let token = state.tokens.issue(&session)?;

    tracing::info!(email = %session.email, role = %session.role, "signed in");
    Ok(Json(SignInResponse {
        token,
        session,
        expires_in: state.tokens.expires_in_secs(),
    }))
}
