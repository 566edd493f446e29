// client/mod.rs - generic REST client for admin resources
//
// One best-effort request per call: no retry, no caching. Timeout is
// whatever the configuration says (none by default in tests).

pub mod error;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use crate::config::ClientConfig;
use crate::rbac::Session;
use crate::types::{ListResult, Record};

pub use error::ClientError;

/// Query parameters for `list`. Serialized in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams(BTreeMap<String, String>);

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    pub fn page(self, page: u32) -> Self {
        self.set("page", page)
    }

    pub fn limit(self, limit: u32) -> Self {
        self.set("limit", limit)
    }

    pub fn search(self, term: impl Into<String>) -> Self {
        self.set("search", term.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub session: Session,
    pub expires_in: u64,
}

/// Typed wrapper over the backend REST boundary.
///
/// Holds only static configuration; cloning is cheap.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            token: None,
        })
    }

    /// Same client, authenticating every request with `token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{resource}[/{id}][?{params}]`. Empty params leave no `?`.
    pub fn resource_url(&self, resource: &str, id: Option<&str>, params: Option<&ListParams>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(resource.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }

        if let Some(params) = params.filter(|p| !p.is_empty()) {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    pub async fn list<T: DeserializeOwned>(&self, resource: &str, params: &ListParams) -> Result<ListResult<T>, ClientError> {
        let url = self.resource_url(resource, None, Some(params))?;
        decode(self.request(Method::GET, url).send().await?).await
    }

    pub async fn get_one<T: DeserializeOwned>(&self, resource: &str, id: &str) -> Result<T, ClientError> {
        let url = self.resource_url(resource, Some(id), None)?;
        decode(self.request(Method::GET, url).send().await?).await
    }

    pub async fn create<T, B>(&self, resource: &str, data: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.resource_url(resource, None, None)?;
        decode(self.request(Method::POST, url).json(data).send().await?).await
    }

    pub async fn update<T, B>(&self, resource: &str, id: &str, data: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.resource_url(resource, Some(id), None)?;
        decode(self.request(Method::PUT, url).json(data).send().await?).await
    }

    pub async fn remove<T: DeserializeOwned>(&self, resource: &str, id: &str) -> Result<T, ClientError> {
        let url = self.resource_url(resource, Some(id), None)?;
        decode(self.request(Method::DELETE, url).send().await?).await
    }

    /// Exchange an identity for a session token at `{origin}/auth/login`.
    pub async fn sign_in(&self, email: &str, name: Option<&str>) -> Result<SignInResponse, ClientError> {
        let url = self.origin_url("/auth/login")?;
        let body = serde_json::json!({ "email": email, "name": name });
        decode(self.request(Method::POST, url).json(&body).send().await?).await
    }

    /// Current session from `{origin}/api/auth/session`.
    pub async fn session(&self) -> Result<Session, ClientError> {
        let url = self.origin_url("/api/auth/session")?;
        decode(self.request(Method::GET, url).send().await?).await
    }

    fn origin_url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }
}

/// Success statuses are decoded as JSON; anything else fails without touching the body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

/// Record-level CRUD seam used by the page renderer.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn list(&self, resource: &str, params: &ListParams) -> Result<ListResult<Record>, ClientError>;
    async fn get_one(&self, resource: &str, id: &str) -> Result<Record, ClientError>;
    async fn create(&self, resource: &str, data: &Record) -> Result<Record, ClientError>;
    async fn update(&self, resource: &str, id: &str, data: &Record) -> Result<Record, ClientError>;
    async fn remove(&self, resource: &str, id: &str) -> Result<Record, ClientError>;
}

#[async_trait]
impl ResourceApi for ApiClient {
    async fn list(&self, resource: &str, params: &ListParams) -> Result<ListResult<Record>, ClientError> {
        ApiClient::list(self, resource, params).await
    }

    async fn get_one(&self, resource: &str, id: &str) -> Result<Record, ClientError> {
        ApiClient::get_one(self, resource, id).await
    }

    async fn create(&self, resource: &str, data: &Record) -> Result<Record, ClientError> {
        ApiClient::create(self, resource, data).await
    }

    async fn update(&self, resource: &str, id: &str, data: &Record) -> Result<Record, ClientError> {
        ApiClient::update(self, resource, id, data).await
    }

    async fn remove(&self, resource: &str, id: &str) -> Result<Record, ClientError> {
        ApiClient::remove(self, resource, id).await
    }
}
