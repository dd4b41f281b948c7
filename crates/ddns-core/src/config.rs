//! Configuration types for the DDNS system
//!
//! The configuration is read once from a YAML file, overridden from the
//! environment, validated, and then handed to the engine and the provider as
//! an immutable value.
//!
//! ```yaml
//! cloudflare:
//!   api:
//!     id: <api token>
//!   Domain:
//!     - name: example.com
//!       zone_identifier: 023e105f4ecef8ad9ca31a8372d0c353   # optional
//!       record_name:
//!         - name: home.example.com
//!           ttl: 0            # <= 0 means 120
//!           use_proxy: false
//! seek_ip_url: https://ipv4.icanhazip.com/   # optional
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;

use crate::traits::DEFAULT_TTL;

/// Config file used when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "ddns.yaml";

/// Environment variable overriding `cloudflare.api.id`
pub const ENV_API_TOKEN: &str = "DDNS_CLOUDFLARE_API_TOKEN";

/// Environment variable overriding `seek_ip_url`
pub const ENV_SEEK_IP_URL: &str = "DDNS_SEEK_IP_URL";

/// Environment variable enabling dry-run mode (`DDNS_MODE=dry-run`)
pub const ENV_MODE: &str = "DDNS_MODE";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Cloudflare credentials and managed domains
    pub cloudflare: CloudflareConfig,

    /// Override of the "what is my IP" endpoint
    #[serde(default)]
    pub seek_ip_url: Option<String>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Load configuration from a YAML file, apply environment overrides and validate
    ///
    /// Uses [`DEFAULT_CONFIG_FILE`] in the working directory when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, crate::Error> {
        let path: PathBuf = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            crate::Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml_str(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML without validating it
    pub fn from_yaml_str(contents: &str) -> Result<Self, crate::Error> {
        serde_yaml::from_str(contents)
            .map_err(|e| crate::Error::config(format!("Invalid YAML configuration: {}", e)))
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.is_empty()) {
            self.cloudflare.api.id = token;
        }

        if let Some(url) = lookup(ENV_SEEK_IP_URL).filter(|u| !u.is_empty()) {
            self.seek_ip_url = Some(url);
        }

        if let Some(mode) = lookup(ENV_MODE) {
            if mode.eq_ignore_ascii_case("dry-run") {
                self.engine.dry_run = true;
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.cloudflare.api.id.trim().is_empty() {
            return Err(crate::Error::config(
                "cloudflare.api.id must be not null or empty",
            ));
        }

        if self.cloudflare.domains.is_empty() {
            return Err(crate::Error::config(
                "cloudflare.Domain must be not null or empty",
            ));
        }

        for (index, domain) in self.cloudflare.domains.iter().enumerate() {
            domain.validate(index)?;
        }

        if let Some(ref url) = self.seek_ip_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "seek_ip_url must use HTTP or HTTPS scheme. Got: {}",
                    url
                )));
            }
        }

        self.engine.validate()?;

        Ok(())
    }

    /// Total number of configured records across all domains
    pub fn record_count(&self) -> usize {
        self.cloudflare.domains.iter().map(|d| d.records.len()).sum()
    }
}

/// Cloudflare section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// API credentials
    pub api: ApiConfig,

    /// Domains to reconcile
    #[serde(rename = "Domain", alias = "domain", alias = "domains", default)]
    pub domains: Vec<DomainTarget>,
}

/// API credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Cloudflare API token (sent as a bearer token)
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub id: String,
}

impl ApiConfig {
    /// Create credentials from a token
    pub fn new(token: impl Into<String>) -> Self {
        Self { id: token.into() }
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("id", &"<REDACTED>")
            .finish()
    }
}

/// A domain and the hostnames managed in its zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainTarget {
    /// Domain (zone) name, e.g. "example.com"
    pub name: String,

    /// Zone ID; when empty it is resolved by listing zones and matching `name`
    #[serde(default)]
    pub zone_identifier: String,

    /// Records to keep pointed at the current address, in processing order
    #[serde(rename = "record_name", default)]
    pub records: Vec<RecordTarget>,
}

impl DomainTarget {
    /// Create a domain with no records
    pub fn new(name: impl Into<String>, zone_identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_identifier: zone_identifier.into(),
            records: Vec::new(),
        }
    }

    /// Append a record
    pub fn with_record(mut self, record: RecordTarget) -> Self {
        self.records.push(record);
        self
    }

    /// Whether the zone ID has to be looked up
    pub fn needs_zone_lookup(&self) -> bool {
        self.zone_identifier.trim().is_empty()
    }

    fn validate(&self, index: usize) -> Result<(), crate::Error> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "cloudflare.Domain[{}].name must be not null or empty",
                index
            )));
        }

        if self.records.is_empty() {
            return Err(crate::Error::config(format!(
                "cloudflare.Domain[{}].record_name must be not null or empty",
                index
            )));
        }

        for (record_index, record) in self.records.iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "cloudflare.Domain[{}].record_name[{}].name must be not null or empty",
                    index, record_index
                )));
            }
        }

        Ok(())
    }
}

/// A single hostname to keep up to date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTarget {
    /// Fully-qualified hostname, e.g. "home.example.com"
    pub name: String,

    /// TTL in seconds; zero or negative means the provider default
    #[serde(default)]
    pub ttl: i64,

    /// Route traffic through the provider's edge
    #[serde(default)]
    pub use_proxy: bool,
}

impl RecordTarget {
    /// Create a record with the default TTL and no proxying
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: 0,
            use_proxy: false,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable proxying
    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// TTL to send: [`DEFAULT_TTL`] for zero or negative values
    pub fn effective_ttl(&self) -> u32 {
        if self.ttl <= 0 {
            DEFAULT_TTL
        } else {
            u32::try_from(self.ttl).unwrap_or(u32::MAX)
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on domains reconciled at the same time (unbounded when unset)
    #[serde(default)]
    pub max_concurrent_domains: Option<usize>,

    /// HTTP timeout applied by the transport (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Perform lookups but only log the writes that would be sent
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self.max_concurrent_domains {
            Some(0) => {
                return Err(crate::Error::config(
                    "engine.max_concurrent_domains must be > 0",
                ));
            }
            Some(n) if n > Semaphore::MAX_PERMITS => {
                return Err(crate::Error::config(format!(
                    "engine.max_concurrent_domains must be <= {}",
                    Semaphore::MAX_PERMITS
                )));
            }
            _ => {}
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("engine.http_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_domains: None,
            http_timeout_secs: default_http_timeout_secs(),
            dry_run: false,
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    30
}
