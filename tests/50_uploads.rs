mod common;

use anyhow::Result;
use common::{TestServer, OPERATOR_EMAIL, USER_EMAIL};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

fn file_form(name: &str, bytes: Vec<u8>) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(name.to_string()))
}

#[tokio::test]
async fn upload_stores_the_file_under_a_generated_name() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login(USER_EMAIL).await?.token;

    let res = reqwest::Client::new()
        .post(server.url("/upload"))
        .bearer_auth(&token)
        .multipart(file_form("notes.txt", b"lesson notes".to_vec()))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["originalName"], "notes.txt");
    assert_eq!(body["size"], 12);

    let filename = body["filename"].as_str().expect("filename");
    assert_ne!(filename, "notes.txt");
    assert!(filename.ends_with(".txt"));

    let stored = std::fs::read(server.config.uploads.dir.join(filename))?;
    assert_eq!(stored, b"lesson notes");
    Ok(())
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login(USER_EMAIL).await?.token;

    let res = reqwest::Client::new()
        .post(server.url("/upload"))
        .bearer_auth(&token)
        .multipart(Form::new().text("comment", "no file here"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login(USER_EMAIL).await?.token;
    let too_big = vec![b'x'; server.config.uploads.max_bytes + 1];

    let res = reqwest::Client::new()
        .post(server.url("/upload"))
        .bearer_auth(&token)
        .multipart(file_form("big.bin", too_big))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn upload_requires_authentication() -> Result<()> {
    let server = TestServer::start().await?;

    let res = reqwest::Client::new()
        .post(server.url("/upload"))
        .multipart(file_form("notes.txt", b"x".to_vec()))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn upload_log_is_visible_to_operators_only() -> Result<()> {
    let server = TestServer::start().await?;
    let learner = server.login(USER_EMAIL).await?.token;
    let operator = server.login(OPERATOR_EMAIL).await?.token;
    let http = reqwest::Client::new();

    http.post(server.url("/upload"))
        .bearer_auth(&learner)
        .multipart(file_form("a.pdf", b"%PDF".to_vec()))
        .send()
        .await?
        .error_for_status()?;

    let res = http.get(server.url("/api/uploads")).bearer_auth(&learner).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = http.get(server.url("/api/uploads")).bearer_auth(&operator).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let uploads: Vec<Value> = res.json().await?;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["uploadedBy"], USER_EMAIL);
    assert_eq!(uploads[0]["sha256"].as_str().map(str::len), Some(64));
    Ok(())
}
