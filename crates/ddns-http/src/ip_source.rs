//! HTTP-based [`IpSource`]
//!
//! Asks a "what is my IP" endpoint for the public address. The endpoint is
//! expected to answer with the bare address, optionally followed by a line
//! break.

use ddns_core::traits::{IpSource, ResolvedAddress, Transport};
use ddns_core::{Error, Result};

use std::sync::Arc;

/// Endpoint used when no override is configured
pub const DEFAULT_SEEK_IP_URL: &str = "https://ipv4.icanhazip.com/";

/// Resolves the public address over HTTP
///
/// One GET per call to [`IpSource::current`]. No retries and no caching.
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// Shared HTTP transport
    transport: Arc<dyn Transport>,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `transport`: shared HTTP transport
    /// - `url_override`: endpoint to use instead of [`DEFAULT_SEEK_IP_URL`];
    ///   blank values are ignored
    pub fn new(transport: Arc<dyn Transport>, url_override: Option<String>) -> Self {
        let url = url_override
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SEEK_IP_URL.to_string());

        Self { url, transport }
    }

    /// Endpoint this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Strip leading and trailing line breaks, nothing else
fn trim_line_breaks(body: &[u8]) -> &[u8] {
    let is_break = |b: &u8| *b == b'\n' || *b == b'\r';
    let start = body.iter().position(|b| !is_break(b)).unwrap_or(body.len());
    let end = body.iter().rposition(|b| !is_break(b)).map_or(start, |i| i + 1);
    &body[start..end]
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<ResolvedAddress> {
        let body = self
            .transport
            .get(&self.url, &[])
            .await
            .map_err(|e| Error::address_lookup(&self.url, e))?;

        let candidate = std::str::from_utf8(trim_line_breaks(&body)).map_err(|e| {
            Error::invalid_address(String::from_utf8_lossy(trim_line_breaks(&body)), e.to_string())
        })?;

        let address: ResolvedAddress = candidate.parse()?;
        tracing::debug!("{} answered {}", self.url, address);
        Ok(address)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
