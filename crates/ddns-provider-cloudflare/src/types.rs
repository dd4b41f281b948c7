//! Cloudflare API v4 wire types

use chrono::{DateTime, Utc};
use ddns_core::traits::{ProviderMessage, RemoteRecord, ZoneSummary};
use serde::Deserialize;
use serde_json::Value;

/// Envelope shared by every Cloudflare API v4 response
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    #[serde(default)]
    pub messages: Vec<Value>,
    pub result: Option<T>,
    pub result_info: Option<CloudflareResultInfo>,
}

impl<T> CloudflareResponse<T> {
    /// First reported error, or a placeholder when the provider gave none
    pub fn first_error(&self) -> (i64, String) {
        self.errors
            .first()
            .map(|e| (e.code, e.message.clone()))
            .unwrap_or_else(|| (0, "request failed without error details".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl From<CloudflareError> for ProviderMessage {
    fn from(e: CloudflareError) -> Self {
        Self {
            code: e.code,
            message: e.message,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CloudflareResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
}

/// Zone as returned by `GET /zones`
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl From<CloudflareZone> for ZoneSummary {
    fn from(zone: CloudflareZone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
        }
    }
}

/// DNS record as returned by the `dns_records` endpoints
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    #[serde(default)]
    pub zone_id: String,
    #[serde(default)]
    pub zone_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

impl From<CloudflareDnsRecord> for RemoteRecord {
    fn from(record: CloudflareDnsRecord) -> Self {
        Self {
            id: record.id,
            zone_id: record.zone_id,
            name: record.name,
            record_type: record.record_type,
            content: record.content,
            ttl: record.ttl,
            proxied: record.proxied,
            modified_on: record.modified_on,
        }
    }
}
