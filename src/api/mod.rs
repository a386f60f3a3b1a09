//! REST client for the placement office backend.
//!
//! One method per endpoint lives in the submodules; this module owns the
//! transport seam and the shared request/decode path. Every call is a single
//! blocking request with no retry. Failures come back as [`ApiError`].

mod auth;
mod interviews;
mod placements;
mod selections;

#[cfg(test)]
pub mod fake;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/placements/42`.
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Something that can carry a request to the backend and hand back the JSON
/// body of a successful response.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

/// `{ "message": ... }` acknowledgements from delete endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// --- reqwest transport ---

#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { base_url: config.api_url.clone(), client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response.text().map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull the backend's `message` out of an error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

// --- client ---

/// Typed API client. Holds the bearer token that is attached to every call
/// once the user has logged in.
pub struct ApiClient<T: Transport> {
    transport: T,
    token: Option<String>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, token: None }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn send(&self, method: Method, path: String, body: Option<Value>) -> Result<Value, ApiError> {
        tracing::debug!(%method, %path, "api request");
        let request = ApiRequest { method, path, bearer: self.token.clone(), body };
        let result = self.transport.send(&request);
        if let Err(e) = &result {
            tracing::debug!(method = %request.method, path = %request.path, error = %e, "api request failed");
        }
        result
    }

    fn get<R: DeserializeOwned>(&self, path: String) -> Result<R, ApiError> {
        decode(self.send(Method::Get, path, None)?)
    }

    fn post<R: DeserializeOwned>(&self, path: String, body: &impl Serialize) -> Result<R, ApiError> {
        decode(self.send(Method::Post, path, Some(encode(body)?))?)
    }

    fn put<R: DeserializeOwned>(&self, path: String, body: &impl Serialize) -> Result<R, ApiError> {
        decode(self.send(Method::Put, path, Some(encode(body)?))?)
    }

    fn delete<R: DeserializeOwned>(&self, path: String) -> Result<R, ApiError> {
        decode(self.send(Method::Delete, path, None)?)
    }
}

fn encode(body: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode a success body. An empty body decodes like `{}` so that
/// acknowledgement-only endpoints don't fail on a bare 204.
fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    let value = if value.is_null() { Value::Object(Default::default()) } else { value };
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Percent-encode a caller-supplied id as a single path segment, using the
/// same rules reqwest applies to the rest of the URL.
fn segment(id: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return id.trim().to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(id.trim());
    }
    url.path().trim_start_matches('/').to_string()
}
