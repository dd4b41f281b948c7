// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 implementation of `DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per trait call, through the injected `Transport`
// - No retries, no backoff, no caching
// - Provider-reported failures are decoded from the JSON envelope, whatever
//   the HTTP status
// - Dry-run mode performs every GET but only logs the writes
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?per_page=50`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

pub mod types;

use async_trait::async_trait;
use ddns_core::traits::{
    ADDRESS_RECORD_TYPE, DnsProvider, Header, RecordRequest, SearchOutcome, Transport,
    WriteResult, ZoneSummary,
};
use ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub use types::{CloudflareDnsRecord, CloudflareError, CloudflareResponse, CloudflareZone};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Largest page the zones endpoint accepts
pub const MAX_ZONES_PER_PAGE: u32 = 50;

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone listing, record search)
/// - Log the intended POST/PATCH payload
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL, overridable for tests
    base_url: String,

    /// Shared HTTP transport
    transport: Arc<dyn Transport>,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `transport`: shared HTTP transport
    /// - `dry_run`: If true, perform GET requests but skip writes
    ///
    /// # Errors
    ///
    /// `Error::Config` when the token is empty.
    pub fn new(
        api_token: impl Into<String>,
        transport: Arc<dyn Transport>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            transport,
            dry_run,
        })
    }

    /// Create a new Cloudflare provider (production/live mode)
    pub fn new_live(api_token: impl Into<String>, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::new(api_token, transport, false)
    }

    /// Create a new Cloudflare provider (dry-run mode)
    pub fn new_dry_run(api_token: impl Into<String>, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::new(api_token, transport, true)
    }

    /// Point the provider at another API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn headers(&self) -> [Header; 2] {
        [Header::json_content_type(), Header::bearer(&self.api_token)]
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    /// GET and decode an envelope
    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &str,
    ) -> Result<CloudflareResponse<T>> {
        tracing::debug!("GET {}", url);
        let body = self
            .transport
            .get(url, &self.headers())
            .await
            .map_err(|e| Error::provider_request(operation, e.to_string()))?;
        decode(operation, &body)
    }

    /// POST or PATCH a record body and decode the result
    async fn write(
        &self,
        operation: &'static str,
        method: WriteMethod,
        url: &str,
        body: &RecordRequest,
    ) -> Result<WriteResult> {
        let payload = serde_json::to_value(body)?;

        if self.dry_run {
            tracing::warn!(
                "[DRY-RUN] Would send {} request to {} with payload: {}",
                method.as_str(),
                url,
                payload
            );
            return Ok(WriteResult {
                success: true,
                errors: Vec::new(),
                record: None,
            });
        }

        tracing::debug!("{} {}", method.as_str(), url);
        let headers = self.headers();
        let response = match method {
            WriteMethod::Post => self.transport.post(url, &headers, &payload).await,
            WriteMethod::Patch => self.transport.patch(url, &headers, &payload).await,
        }
        .map_err(|e| Error::provider_request(operation, e.to_string()))?;

        let envelope: CloudflareResponse<CloudflareDnsRecord> = decode(operation, &response)?;
        Ok(WriteResult {
            success: envelope.success,
            errors: envelope.errors.into_iter().map(Into::into).collect(),
            record: envelope.result.map(Into::into),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum WriteMethod {
    Post,
    Patch,
}

impl WriteMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<CloudflareResponse<T>> {
    serde_json::from_slice(body).map_err(|e| {
        Error::provider_request(operation, format!("invalid response data format: {}", e))
    })
}

/// Turn a failed envelope into `NoRouteMatches`
fn ensure_success<T>(envelope: &CloudflareResponse<T>) -> Result<()> {
    if envelope.success {
        return Ok(());
    }
    let (code, message) = envelope.first_error();
    Err(Error::no_route_matches(code, message))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>> {
        let url = format!("{}/zones?per_page={}", self.base_url, MAX_ZONES_PER_PAGE);
        let envelope: CloudflareResponse<Vec<CloudflareZone>> = self.get("list_zones", &url).await?;
        ensure_success(&envelope)?;

        let total = envelope.result_info.as_ref().map(|info| info.total_count as usize);
        let zones: Vec<ZoneSummary> = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();

        if let Some(total) = total.filter(|total| *total > zones.len()) {
            tracing::warn!(
                "API token can see {} zones, only the first {} are considered",
                total,
                zones.len()
            );
        }
        tracing::debug!("Listed {} zone(s)", zones.len());
        Ok(zones)
    }

    async fn search_record(&self, zone_id: &str, hostname: &str) -> Result<SearchOutcome> {
        let url = format!(
            "{}?type={}&name={}",
            self.records_url(zone_id),
            ADDRESS_RECORD_TYPE,
            urlencoding::encode(hostname)
        );
        let envelope: CloudflareResponse<Vec<CloudflareDnsRecord>> =
            self.get("search_record", &url).await?;
        ensure_success(&envelope)?;

        let mut records = envelope.result.ok_or_else(|| {
            Error::provider_request("search_record", "response has no result list")
        })?;

        Ok(match records.len() {
            0 => SearchOutcome::NotFound,
            1 => SearchOutcome::Found(records.remove(0).into()),
            n => SearchOutcome::Ambiguous(n),
        })
    }

    async fn create_record(&self, zone_id: &str, body: &RecordRequest) -> Result<WriteResult> {
        let url = self.records_url(zone_id);
        self.write("create_record", WriteMethod::Post, &url, body).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        body: &RecordRequest,
    ) -> Result<WriteResult> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        self.write("update_record", WriteMethod::Patch, &url, body).await
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
