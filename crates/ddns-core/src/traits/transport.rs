// # Transport Trait
//
// Defines the interface for the raw HTTP layer underneath providers and
// IP resolvers.
//
// ## Implementations
//
// - reqwest-based: `ddns-http` crate (`ReqwestTransport`)
//
// ## Contract
//
// A transport returns the response body for any HTTP status. Deciding what a
// 4xx/5xx body means is the caller's job (Cloudflare, for instance, answers
// errors with a JSON envelope that must still be decoded).

use async_trait::async_trait;
use serde_json::Value;

/// A single request header
///
/// The Debug implementation hides the value of `Authorization` headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name
    pub name: &'static str,
    /// Header value
    pub value: String,
}

impl Header {
    /// Create a header
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// `Content-Type: application/json`
    pub fn json_content_type() -> Self {
        Self::new("Content-Type", "application/json")
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer(token: &str) -> Self {
        Self::new("Authorization", format!("Bearer {}", token))
    }
}

impl std::fmt::Debug for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = if self.name.eq_ignore_ascii_case("authorization") {
            "<REDACTED>"
        } else {
            self.value.as_str()
        };
        f.debug_struct("Header")
            .field("name", &self.name)
            .field("value", &value)
            .finish()
    }
}

/// Trait for HTTP transport implementations
///
/// Implementations must be thread-safe: one transport is shared by the IP
/// resolver and by every concurrent domain task through the provider.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and return the raw response body
    async fn get(&self, url: &str, headers: &[Header]) -> Result<Vec<u8>, crate::Error>;

    /// Issue a POST request with a JSON body and return the raw response body
    ///
    /// A `Value::Null` body is a caller error (`Error::InvalidInput`).
    async fn post(
        &self,
        url: &str,
        headers: &[Header],
        body: &Value,
    ) -> Result<Vec<u8>, crate::Error>;

    /// Issue a PATCH request with a JSON body and return the raw response body
    ///
    /// A `Value::Null` body is a caller error (`Error::InvalidInput`).
    async fn patch(
        &self,
        url: &str,
        headers: &[Header],
        body: &Value,
    ) -> Result<Vec<u8>, crate::Error>;
}
