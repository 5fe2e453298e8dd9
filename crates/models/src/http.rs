use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(ModelError::Validation(format!("invalid HTTP method: {s}"))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body as handed over by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Pre-serialized payload; decoded as JSON when a handler needs it.
    Text(String),
}

impl RequestBody {
    /// Decode to a JSON value. An empty text body is treated as `{}`.
    pub fn to_json(&self) -> Result<Value, ModelError> {
        match self {
            RequestBody::Json(v) => Ok(v.clone()),
            RequestBody::Text(s) if s.trim().is_empty() => Ok(Value::Object(Default::default())),
            RequestBody::Text(s) => Ok(serde_json::from_str(s)?),
        }
    }
}

/// An HTTP-shaped call: method, path (relative or absolute URL) and optional body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_json(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, path).with_json(body)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Body decoded as JSON; an absent body is `{}`.
    pub fn json_body(&self) -> Result<Value, ModelError> {
        match &self.body {
            Some(body) => body.to_json(),
            None => Ok(Value::Object(Default::default())),
        }
    }
}

/// Where a response came from. Kept outside `data` so the envelope stays
/// identical to a backend reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    #[default]
    Network,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub data: Value,
    #[serde(skip)]
    pub source: ResponseSource,
}

impl ApiResponse {
    pub fn from_network(status: u16, data: Value) -> Self {
        Self { status, status_text: status_text(status).to_string(), data, source: ResponseSource::Network }
    }

    pub fn synthesized<T: Serialize>(status: u16, body: &T) -> Result<Self, ModelError> {
        Ok(Self {
            status,
            status_text: status_text(status).to_string(),
            data: serde_json::to_value(body)?,
            source: ResponseSource::Synthesized,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_synthesized(&self) -> bool {
        self.source == ResponseSource::Synthesized
    }
}

/// Reason phrase for the status codes this layer produces or inspects.
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
