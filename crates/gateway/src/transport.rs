use std::time::Duration;

use async_trait::async_trait;
use models::{ApiRequest, ApiResponse, RequestBody};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use service::ServiceError;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    /// No response: the backend could not be reached at all.
    #[error("network error: {0}")]
    Unreachable(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The backend answered with a non-success status.
    #[error("request failed with status code {}", .0.status)]
    Status(ApiResponse),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Other(String),
    /// Local persistence failed while synthesizing a response.
    #[error("local storage failure: {0}")]
    Storage(#[source] ServiceError),
}

impl TransportError {
    /// The backend response attached to the error, if there was one.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            TransportError::Status(resp) => Some(resp),
            _ => None,
        }
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Unreachable(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// The request function call-sites use. Non-success statuses are errors,
/// carrying the response in [`TransportError::Status`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, req: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Real network transport over `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, connect_timeout: Duration, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs are used as-is; relative paths are joined onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, req: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = reqwest::Method::from_bytes(req.method.as_str().as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let url = self.url_for(&req.path);
        debug!(method = %req.method, %url, "sending request");

        let mut builder = self.client.request(method, &url);
        builder = match &req.body {
            Some(RequestBody::Json(v)) => builder.json(v),
            Some(RequestBody::Text(s)) => builder.header(CONTENT_TYPE, "application/json").body(s.clone()),
            None => builder,
        };

        let resp = builder.send().await.map_err(TransportError::from_reqwest)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(TransportError::from_reqwest)?;
        let data = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        let mut response = ApiResponse::from_network(status.as_u16(), data);
        if let Some(reason) = status.canonical_reason() {
            response.status_text = reason.to_string();
        }
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_paths_onto_base() -> Result<(), TransportError> {
        let t = ReqwestTransport::new("http://localhost:8000/", Duration::from_secs(1), Duration::from_secs(1))?;
        assert_eq!(t.base_url(), "http://localhost:8000");
        assert_eq!(t.url_for("/api/payments"), "http://localhost:8000/api/payments");
        assert_eq!(t.url_for("api/payments"), "http://localhost:8000/api/payments");
        assert_eq!(t.url_for("https://other.example/api"), "https://other.example/api");
        Ok(())
    }

    #[test]
    fn status_errors_expose_their_response() {
        let err = TransportError::Status(ApiResponse::from_network(404, Value::Null));
        assert_eq!(err.response().map(|r| r.status), Some(404));
        assert_eq!(err.to_string(), "request failed with status code 404");
        assert!(TransportError::Unreachable("refused".into()).response().is_none());
    }
}
