//! The configured client shared by every service.
//!
//! # Design
//! `ApiClient` is built once and cloned into each service. It owns the base
//! URL and auth token and holds the `HttpClient` behind an `Arc`, so clones
//! are cheap and tests can inject a fake transport. Request building is
//! split from sending: `get`/`post`/... produce an `HttpRequest`, `send`
//! executes it and turns any non-2xx status or transport failure into a
//! `RawApiError` for the normalization layer.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, RawApiError, TransportError};
use crate::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::ReqwestClient;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    auth_token: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: config.base_url,
            auth_token: config.auth_token,
            http,
        }
    }

    /// Build a client that talks to the network through reqwest.
    pub fn from_config(config: ClientConfig) -> Result<Self, TransportError> {
        let http = ReqwestClient::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(http)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path, None)
    }

    pub fn delete(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, path, None)
    }

    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Post, path, Some(to_json(body)?)))
    }

    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Put, path, Some(to_json(body)?)))
    }

    pub fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Patch, path, Some(to_json(body)?)))
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = &self.auth_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }

    /// Execute `request`. Only 2xx responses are returned as `Ok`.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RawApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending API request");
        let response = self.http.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }
        Err(RawApiError::with_response(response.status, error_body(&response.body)))
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Error bodies that are not JSON are kept as a plain string value.
fn error_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
