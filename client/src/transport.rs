//! HTTP transport.
//!
//! Stores talk to the backend through the [`Transport`] trait so that tests
//! can substitute a scripted implementation. [`HttpTransport`] is the real
//! one: it joins paths onto the configured API root, attaches the session
//! cookie to every request and hands back the parsed JSON body.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Sends requests to the backend and returns the decoded JSON body.
///
/// Non-2xx responses and unreachable backends are errors; envelope
/// interpretation (`success`, payload keys) is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// `reqwest`-backed transport with cookie credentials.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_url: String,
    session_cookie: Option<String>,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url(&request.path);
        tracing::trace!(method = request.method.as_str(), url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(ACCEPT, "application/json");

        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::Engine(stash_engine::Error::MalformedEnvelope(format!(
                "response body is not JSON: {}",
                e
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builders() {
        let request = ApiRequest::get("/api/v1/job/get").query("keyword", "rust");
        assert_eq!(request.method, Method::Get);
        assert_eq!(
            request.query,
            vec![("keyword".to_string(), "rust".to_string())]
        );
        assert!(request.body.is_none());

        let request = ApiRequest::post("/api/order/status")
            .json(&json!({"orderId": "o1", "status": "Delivered"}))
            .unwrap();
        assert_eq!(request.method.as_str(), "POST");
        assert_eq!(request.body.unwrap()["orderId"], "o1");
    }

    #[test]
    fn url_joins_api_root() {
        let config = ClientConfig::new("http://localhost:4000/");
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/api/food/list"),
            "http://localhost:4000/api/food/list"
        );
    }
}
