//! reqwest-backed [`Transport`]

use ddns_core::traits::{Header, Transport};
use ddns_core::{Error, Result};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;

/// HTTP transport built on a shared `reqwest::Client`
///
/// The client pools connections, so one instance should be shared by every
/// caller in the process.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ddns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send a prepared request and read the whole body
    ///
    /// Non-2xx statuses are not errors here.
    async fn execute(
        &self,
        method: reqwest::Method,
        url: &str,
        headers: &[Header],
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(header_map(headers)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            Error::transport(format!("Failed to read response body from {}: {}", url, e))
        })?;

        tracing::debug!("{} {} -> {} ({} bytes)", method, url, status, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Convert headers for reqwest
///
/// Errors never include the header value, which may hold a credential.
fn header_map(headers: &[Header]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| Error::invalid_input(format!("invalid header name: {}", header.name)))?;
        let mut value = HeaderValue::from_str(&header.value)
            .map_err(|_| Error::invalid_input(format!("invalid value for header {}", header.name)))?;
        if name == reqwest::header::AUTHORIZATION {
            value.set_sensitive(true);
        }
        map.insert(name, value);
    }
    Ok(map)
}

fn require_body(body: &Value) -> Result<&Value> {
    if body.is_null() {
        return Err(Error::invalid_input("request body must not be null"));
    }
    Ok(body)
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[Header]) -> Result<Vec<u8>> {
        self.execute(reqwest::Method::GET, url, headers, None).await
    }

    async fn post(&self, url: &str, headers: &[Header], body: &Value) -> Result<Vec<u8>> {
        let body = require_body(body)?;
        self.execute(reqwest::Method::POST, url, headers, Some(body))
            .await
    }

    async fn patch(&self, url: &str, headers: &[Header], body: &Value) -> Result<Vec<u8>> {
        let body = require_body(body)?;
        self.execute(reqwest::Method::PATCH, url, headers, Some(body))
            .await
    }
}
