//! HTTP transport seam
//!
//! The client never talks to `reqwest` directly: every call goes through the
//! [`Transport`] trait as an [`HttpRequest`] (method, url, headers, optional
//! JSON body, timeout) and comes back as an [`HttpResponse`] (status + body
//! text). [`ReqwestTransport`] is the production implementation; tests plug
//! in scripted fakes.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP method used by the AIS endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub json: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// GET request without headers
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            json: None,
            timeout,
        }
    }

    /// POST request carrying a JSON body
    pub fn post_json(url: impl Into<String>, json: Value, timeout: Duration) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            json: Some(json),
            timeout,
        }
    }

    /// Replace the request headers
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Look up a header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response status and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The AIS endpoints only count 200 as success
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Fail with [`Error::Http`] unless the status is 200
    pub fn ensure_success(self, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http(self.status, url))
        }
    }

    /// Body as text
    pub fn text(self) -> String {
        self.body
    }

    /// Body parsed as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::parse(format!("unexpected body shape: {}", e)))
    }
}

/// Something able to execute an [`HttpRequest`]
///
/// Implementations should honour `request.timeout`; the client also bounds
/// every call with its own timer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }

    /// Reuse an existing client (shared connection pool, proxy settings...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        builder = builder.timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(json) = &request.json {
            builder = builder.json(json);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url = %request.url, status, "Received response");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let get = HttpRequest::get("http://host:8122", Duration::from_secs(8))
            .with_headers(vec![("User-Agent".into(), "test".into())]);
        assert_eq!(get.method, Method::Get);
        assert_eq!(get.header("user-agent"), Some("test"));
        assert!(get.json.is_none());

        let post = HttpRequest::post_json(
            "http://host:8122/command",
            json!({"playAudio": "x"}),
            Duration::from_secs(8),
        );
        assert_eq!(post.method, Method::Post);
        assert!(post.headers.is_empty());
        assert_eq!(post.json, Some(json!({"playAudio": "x"})));
    }

    #[test]
    fn test_ensure_success() {
        assert!(HttpResponse::new(200, "ok").ensure_success("u").is_ok());

        let err = HttpResponse::new(204, "").ensure_success("u").unwrap_err();
        assert!(err.is_http());
    }

    #[test]
    fn test_json_parse_error_kind() {
        let response = HttpResponse::new(200, "<html>");
        let err = response.json::<Value>().unwrap_err();
        assert!(err.is_parse());

        let response = HttpResponse::new(200, r#"{"a": 1}"#);
        assert_eq!(response.json::<Value>().unwrap()["a"], 1);
    }
}
