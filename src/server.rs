// server.rs - application state and router assembly

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AccountDirectory, RoleAssignments, TokenIssuer};
use crate::chat::ChatHub;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, RecordStore};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::resources::AdminCatalog;
use crate::uploads::UploadStore;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<AdminCatalog>,
    pub store: Arc<dyn RecordStore>,
    pub accounts: AccountDirectory,
    pub tokens: TokenIssuer,
    pub uploads: Arc<UploadStore>,
    pub chat: ChatHub,
    pub pool: Option<PgPool>,
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(config: &AppConfig, catalog: AdminCatalog, store: Arc<dyn RecordStore>, pool: Option<PgPool>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store,
            accounts: AccountDirectory::new(RoleAssignments::new(config.roles.assignments.clone())),
            tokens: TokenIssuer::from_config(&config.security),
            uploads: Arc::new(UploadStore::new(&config.uploads)),
            chat: ChatHub::new(config.chat.channel_capacity),
            pool,
            max_page_size: config.server.max_page_size.max(1),
        }
    }

    /// Embedded catalog plus the store selected by the database config.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let catalog = AdminCatalog::builtin()?;
        let (store, pool) = DatabaseManager::open(&config.database).await?;
        Ok(Self::new(config, catalog, store, pool))
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    // multipart framing on top of the file itself
    let upload_limit = state.uploads.max_bytes() + 64 * 1024;

    let protected_routes = Router::new()
        .route("/api/auth/session", get(protected::auth::session))
        .route(
            "/api/data/:resource",
            get(protected::data::list).post(protected::data::create),
        )
        .route(
            "/api/data/:resource/:id",
            get(protected::data::show)
                .put(protected::data::update)
                .delete(protected::data::delete),
        )
        .route("/api/uploads", get(protected::upload::list))
        .route(
            "/upload",
            post(protected::upload::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::auth::login))
        .route("/chat", get(public::chat::chat_socket))
        // Protected
        .merge(protected_routes)
        // Global middleware
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::rbac::Role;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> (Router, AppState) {
        let mut config = AppConfig::development();
        config.roles.assignments.insert("boss@academy.test".into(), Role::Admin);
        let state = AppState::new(
            &config,
            AdminCatalog::builtin().unwrap(),
            Arc::new(MemoryStore::new()),
            None,
        );
        (app(state.clone(), &config), state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_memory_store() {
        let (router, _) = test_app();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["database"], "memory");
    }

    #[tokio::test]
    async fn data_routes_require_a_token() {
        let (router, _) = test_app();
        let response = router
            .oneshot(Request::get("/api/data/courses").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn admin_token_creates_a_user_record() {
        let (router, state) = test_app();
        let session = state.accounts.sign_in("boss@academy.test", Some("Boss"), None).await;
        let token = state.tokens.issue(&session).unwrap();

        let request = Request::post("/api/data/users")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "name": "Ada", "email": "ada@academy.test", "role": "user" }).to_string(),
            ))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["active"], false);
    }
}
