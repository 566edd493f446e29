use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::rbac::{is_allowed, Role, Session};
use crate::server::AppState;

/// JWT authentication middleware that validates tokens and injects the `Session`
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let session = state.tokens.verify(&token)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Reject the request unless the session's role reaches `required`.
pub fn require_role(session: &Session, required: Role) -> Result<(), ApiError> {
    if is_allowed(session.role, required) {
        Ok(())
    } else {
        tracing::warn!(email = %session.email, role = %session.role, required = %required, "forbidden");
        Err(ApiError::forbidden(format!("This action requires the {} role", required)))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
