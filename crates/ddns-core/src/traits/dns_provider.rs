// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via provider APIs.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordRequest, SearchOutcome};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     match provider.search_record("zone-id", "home.example.com").await? {
//         SearchOutcome::Found(record) => { /* update_record(...) */ }
//         SearchOutcome::NotFound => { /* create_record(...) */ }
//         SearchOutcome::Ambiguous(_) => { /* leave it alone */ }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Record type written by the engine
pub const ADDRESS_RECORD_TYPE: &str = "A";

/// TTL sent when the configured TTL is zero or negative
pub const DEFAULT_TTL: u32 = 120;

/// A zone as returned by the provider's zone listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSummary {
    /// Zone identifier
    pub id: String,
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// The provider's view of an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Record identifier
    pub id: String,
    /// Zone the record belongs to (may be empty if the provider omits it)
    pub zone_id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type ("A", "AAAA", ...)
    pub record_type: String,
    /// Current content, i.e. the IP the provider serves
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Whether traffic is proxied through the provider's edge
    pub proxied: bool,
    /// Last modification time, when reported
    pub modified_on: Option<DateTime<Utc>>,
}

/// Result of searching a zone for a hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Exactly one record matched
    Found(RemoteRecord),
    /// No record matched; the engine will create one
    NotFound,
    /// More than one record matched; nothing is returned
    Ambiguous(usize),
}

/// Body of a create or update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRequest {
    /// IP address the record should point at
    pub content: String,
    /// Fully-qualified record name
    pub name: String,
    /// Proxy through the provider's edge
    pub proxied: bool,
    /// Always "A"
    #[serde(rename = "type")]
    pub record_type: &'static str,
    /// Record comment
    pub comment: String,
    /// Record tags
    pub tags: Option<Vec<String>>,
    /// Time-to-live in seconds, always positive
    pub ttl: u32,
}

impl RecordRequest {
    /// Build an address record body
    ///
    /// `ttl` is used as given; normalization is the engine's job.
    pub fn address(name: impl Into<String>, content: impl Into<String>, ttl: u32, proxied: bool) -> Self {
        Self {
            content: content.into(),
            name: name.into(),
            proxied,
            record_type: ADDRESS_RECORD_TYPE,
            comment: String::new(),
            tags: None,
            ttl,
        }
    }
}

/// A single provider-reported message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    /// Provider error code
    pub code: i64,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for ProviderMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Decoded outcome of a create or update call
///
/// A write that reached the provider and was decoded comes back as `Ok`
/// even when the provider rejected it; check [`WriteResult::success`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Provider's success flag
    pub success: bool,
    /// Provider-reported errors
    pub errors: Vec<ProviderMessage>,
    /// The record as stored by the provider
    pub record: Option<RemoteRecord>,
}

impl WriteResult {
    /// Render the provider errors for logging
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "provider reported failure without details".to_string();
        }
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe; the engine shares one provider
/// between all concurrent domain tasks.
///
/// # Single-shot
///
/// Every method issues at most one request. Providers do not retry, back
/// off or cache: the engine makes one attempt per record and reports it.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the zones visible to the configured credentials
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>, crate::Error>;

    /// Search a zone for records named `hostname`
    ///
    /// # Returns
    ///
    /// - `Ok(SearchOutcome)`: zero, one or several matches
    /// - `Err(Error::NoRouteMatches)`: the provider reported a failure
    /// - `Err(Error::ProviderRequestFailed)`: transport or decode failure
    async fn search_record(
        &self,
        zone_id: &str,
        hostname: &str,
    ) -> Result<SearchOutcome, crate::Error>;

    /// Create a record in a zone
    async fn create_record(
        &self,
        zone_id: &str,
        body: &RecordRequest,
    ) -> Result<WriteResult, crate::Error>;

    /// Update an existing record
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        body: &RecordRequest,
    ) -> Result<WriteResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
