mod common;

use anyhow::Result;
use common::{TestServer, ADMIN_EMAIL, OPERATOR_EMAIL, USER_EMAIL};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_reports_memory_store() -> Result<()> {
    let server = TestServer::start().await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "memory");
    Ok(())
}

#[tokio::test]
async fn login_assigns_roles_from_the_store() -> Result<()> {
    let server = TestServer::start().await?;

    let admin = server.login(ADMIN_EMAIL).await?;
    assert_eq!(admin.session.role.as_str(), "admin");

    let operator = server.login(OPERATOR_EMAIL).await?;
    assert_eq!(operator.session.role.as_str(), "operator");

    let learner = server.login(USER_EMAIL).await?;
    assert_eq!(learner.session.role.as_str(), "user");
    assert!(learner.expires_in > 0);
    Ok(())
}

#[tokio::test]
async fn login_is_stable_per_email() -> Result<()> {
    let server = TestServer::start().await?;

    let first = server.login(USER_EMAIL).await?;
    let second = server.login(&USER_EMAIL.to_uppercase()).await?;
    assert_eq!(first.session.user_id, second.session.user_id);
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_email() -> Result<()> {
    let server = TestServer::start().await?;

    let res = reqwest::Client::new()
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn session_endpoint_echoes_the_token_session() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client(Some(OPERATOR_EMAIL)).await?;

    let session = client.session().await?;
    assert_eq!(session.email, OPERATOR_EMAIL);
    assert_eq!(session.role.as_str(), "operator");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let res = http.get(server.url("/api/auth/session")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = http
        .get(server.url("/api/auth/session"))
        .bearer_auth("garbage.token.value")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}
