#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use academy_admin::client::{ApiClient, SignInResponse};
use academy_admin::config::AppConfig;
use academy_admin::database::MemoryStore;
use academy_admin::rbac::Role;
use academy_admin::resources::AdminCatalog;
use academy_admin::server::{app, AppState};
use anyhow::{Context, Result};
use axum::Router;
use reqwest::StatusCode;
use serde_json::json;

pub const ADMIN_EMAIL: &str = "admin@academy.test";
pub const OPERATOR_EMAIL: &str = "operator@academy.test";
pub const USER_EMAIL: &str = "learner@academy.test";

/// An in-process server on its own port, backed by the memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub config: AppConfig,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.uploads.dir = std::env::temp_dir().join(format!("academy-uploads-{}", uuid::Uuid::new_v4()));
    config.uploads.max_bytes = 64 * 1024;
    config.roles.assignments = HashMap::from([
        (ADMIN_EMAIL.to_string(), Role::Admin),
        (OPERATOR_EMAIL.to_string(), Role::Operator),
    ]);
    config
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(test_config(), |router| router).await
    }

    /// Start with extra routes merged in front of the application router.
    pub async fn start_with(config: AppConfig, extend: impl FnOnce(Router) -> Router) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let catalog = AdminCatalog::builtin()?;
        let state = AppState::new(&config, catalog, Arc::new(MemoryStore::new()), None);
        let router = extend(app(state, &config));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            config,
            task,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://127.0.0.1:{}{}", self.port, path)
    }

    /// Sign in through the public endpoint.
    pub async fn login(&self, email: &str) -> Result<SignInResponse> {
        let res = reqwest::Client::new()
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// A typed client rooted at `/api/data`, optionally signed in.
    pub async fn client(&self, email: Option<&str>) -> Result<ApiClient> {
        let mut client_config = self.config.client.clone();
        client_config.base_url = self.url("/api/data");
        let client = ApiClient::new(&client_config)?;
        match email {
            Some(email) => Ok(client.with_token(self.login(email).await?.token)),
            None => Ok(client),
        }
    }
}
