// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, liveness and the chat socket.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::server::AppState;

pub mod auth;
pub mod chat;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Academy Admin API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "login": "/auth/login (public - token acquisition)",
            "chat": "/chat (public - websocket)",
            "session": "/api/auth/session (protected)",
            "data": "/api/data/:resource[/:id] (protected, role per resource)",
            "upload": "/upload (protected, multipart field 'file')",
            "uploads": "/api/uploads (protected, operator)"
        }
    }))
}

/// GET /health - liveness plus database reachability when one is configured
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "memory", "chatClients": state.chat.connected() })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok", "chatClients": state.chat.connected() })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "timestamp": now, "database_error": e.to_string() })),
        ),
    }
}
