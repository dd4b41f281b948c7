//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the current public IP once per run via IpSource
//! - Resolving blank zone identifiers through the provider's zone listing
//! - Reconciling every configured record via DnsProvider
//! - Reporting a per-record outcome
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │─── ResolvedAddress ──┐
//! └─────────────┘                      │
//!                                      ▼
//!                             ┌──────────────┐
//!                             │ DdnsEngine   │
//!                             └──────────────┘
//!                                      │ one task per domain
//!         ┌────────────────────────────┼────────────────────────────┐
//!         ▼                            ▼                            ▼
//! ┌──────────────┐            ┌──────────────┐            ┌──────────────┐
//! │ example.com  │            │ example.org  │            │     ...      │
//! │ search →     │            │ search →     │            │              │
//! │ create/update│            │ create/update│            │              │
//! └──────────────┘            └──────────────┘            └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Resolve the current address; abort the run if that fails
//! 2. List zones once if any domain has a blank zone identifier
//! 3. Spawn one task per domain; records inside a domain run in order
//! 4. Per record: search, then update (one A match), create (no A match) or skip
//! 5. Join every task and return the report

pub mod report;

pub use report::{
    DomainReport, DomainStatus, ReconciliationOutcome, RecordReport, RunReport, RunSummary,
};

use crate::config::{DdnsConfig, DomainTarget, EngineConfig, RecordTarget};
use crate::error::Result;
use crate::traits::{
    ADDRESS_RECORD_TYPE, DnsProvider, IpSource, RecordRequest, RemoteRecord, ResolvedAddress,
    SearchOutcome,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Zone ID per domain, or the reason it could not be determined
type ZoneResolution = std::result::Result<String, String>;

/// Core DDNS engine
///
/// The engine runs a single reconciliation pass per call to [`DdnsEngine::run`].
/// It holds no state between runs.
///
/// ## Threading
///
/// Each domain is reconciled on its own tokio task. Tasks share the provider
/// and the resolved address and nothing else. Within a domain, record N+1 is
/// not searched before record N's write attempt has finished.
pub struct DdnsEngine {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider shared by all domain tasks
    provider: Arc<dyn DnsProvider>,

    /// Domains to reconcile, in configuration order
    domains: Vec<DomainTarget>,

    /// Optional bound on concurrently reconciled domains
    max_concurrent_domains: Option<usize>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// Domains are taken as given: a domain without records is skipped at run
    /// time rather than rejected here. A concurrency bound outside
    /// `1..=Semaphore::MAX_PERMITS` is clamped into that range.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Arc<dyn DnsProvider>,
        domains: Vec<DomainTarget>,
        engine: &EngineConfig,
    ) -> Self {
        Self {
            ip_source,
            provider,
            domains,
            max_concurrent_domains: engine
                .max_concurrent_domains
                .map(|n| n.clamp(1, Semaphore::MAX_PERMITS)),
        }
    }

    /// Create an engine from a loaded configuration, validating it first
    pub fn from_config(
        ip_source: Box<dyn IpSource>,
        provider: Arc<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(
            ip_source,
            provider,
            config.cloudflare.domains.clone(),
            &config.engine,
        ))
    }

    /// Domains this engine reconciles
    pub fn domains(&self) -> &[DomainTarget] {
        &self.domains
    }

    /// Run one reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: the address was resolved; per-record failures are in the report
    /// - `Err(Error)`: the address could not be resolved and nothing was attempted
    pub async fn run(&self) -> Result<RunReport> {
        let address = self.ip_source.current().await?;
        info!(
            "Current IP address is {} (from {})",
            address,
            self.ip_source.describe()
        );

        let zones = self.resolve_zone_ids().await;
        let semaphore = self.max_concurrent_domains.map(|n| Arc::new(Semaphore::new(n)));

        let mut handles = Vec::with_capacity(self.domains.len());
        for (domain, zone) in self.domains.iter().cloned().zip(zones) {
            let provider = Arc::clone(&self.provider);
            let semaphore = semaphore.clone();
            let name = domain.name.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                reconcile_domain(provider.as_ref(), &domain, zone, address).await
            });
            handles.push((name, handle));
        }

        let mut domains = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(report) => domains.push(report),
                Err(e) => {
                    error!("Domain task for {} did not complete: {}", name, e);
                    domains.push(DomainReport::skipped(
                        &name,
                        None,
                        DomainStatus::Aborted {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        let report = RunReport { address, domains };
        info!("Reconciliation finished: {}", report.summary());
        Ok(report)
    }

    /// Determine the zone ID of every domain
    ///
    /// The zone listing is requested at most once, and only when a domain that
    /// has records is configured without a zone identifier.
    async fn resolve_zone_ids(&self) -> Vec<ZoneResolution> {
        let needs_listing = self
            .domains
            .iter()
            .any(|d| !d.records.is_empty() && d.needs_zone_lookup());

        let listing = if needs_listing {
            debug!("Listing zones to resolve blank zone identifiers");
            Some(self.provider.list_zones().await)
        } else {
            None
        };

        if let Some(Err(e)) = &listing {
            error!("Failed to list zones: {}", e);
        }

        self.domains
            .iter()
            .map(|domain| {
                if !domain.needs_zone_lookup() {
                    return Ok(domain.zone_identifier.trim().to_string());
                }

                match &listing {
                    None => Err("zone identifier is empty".to_string()),
                    Some(Err(e)) => Err(format!("zone listing failed: {}", e)),
                    Some(Ok(zones)) => zones
                        .iter()
                        .find(|zone| zone.name.eq_ignore_ascii_case(&domain.name))
                        .map(|zone| {
                            debug!("Resolved zone {} for domain {}", zone.id, domain.name);
                            zone.id.clone()
                        })
                        .ok_or_else(|| {
                            format!("no zone named {} is visible to the API token", domain.name)
                        }),
                }
            })
            .collect()
    }
}

/// Reconcile every record of one domain, in order
async fn reconcile_domain(
    provider: &dyn DnsProvider,
    domain: &DomainTarget,
    zone: ZoneResolution,
    address: ResolvedAddress,
) -> DomainReport {
    if domain.records.is_empty() {
        info!("Domain {} has an empty record list, skipping update", domain.name);
        return DomainReport::skipped(&domain.name, None, DomainStatus::NoRecords);
    }

    let zone_id = match zone {
        Ok(zone_id) => zone_id,
        Err(reason) => {
            error!(
                "Skipping domain {}: cannot determine its zone ({})",
                domain.name, reason
            );
            return DomainReport::skipped(
                &domain.name,
                None,
                DomainStatus::ZoneUnresolved { reason },
            );
        }
    };

    info!(
        "Start reconciling {} record(s) of {} in zone {}",
        domain.records.len(),
        domain.name,
        zone_id
    );

    let mut records = Vec::with_capacity(domain.records.len());
    for record in &domain.records {
        let outcome = reconcile_record(provider, &domain.name, &zone_id, record, address).await;
        records.push(RecordReport {
            hostname: record.name.clone(),
            outcome,
        });
    }

    DomainReport {
        domain: domain.name.clone(),
        zone_id: Some(zone_id),
        status: DomainStatus::Reconciled,
        records,
    }
}

/// Search for one record, then create or update it
async fn reconcile_record(
    provider: &dyn DnsProvider,
    domain: &str,
    zone_id: &str,
    record: &RecordTarget,
    address: ResolvedAddress,
) -> ReconciliationOutcome {
    match provider.search_record(zone_id, &record.name).await {
        Ok(SearchOutcome::Found(existing)) if existing.record_type == ADDRESS_RECORD_TYPE => {
            update_record(provider, domain, zone_id, record, existing, address).await
        }
        Ok(SearchOutcome::Found(other)) => {
            debug!(
                "{} has a {} record ({}), leaving it untouched",
                record.name, other.record_type, other.id
            );
            create_record(provider, domain, zone_id, record, address).await
        }
        Ok(SearchOutcome::NotFound) => create_record(provider, domain, zone_id, record, address).await,
        Ok(SearchOutcome::Ambiguous(matches)) => {
            warn!(
                "{} records named {} exist in zone {} ({}), leaving them untouched",
                matches, record.name, zone_id, domain
            );
            ReconciliationOutcome::Ambiguous { matches }
        }
        Err(e) => {
            error!(
                "Search for {} failed (domain: {}, zone: {}, ip: {}): {}",
                record.name, domain, zone_id, address, e
            );
            ReconciliationOutcome::SearchFailed {
                error: e.to_string(),
            }
        }
    }
}

/// Build the write body with a normalized TTL
fn request_for(record: &RecordTarget, address: ResolvedAddress) -> RecordRequest {
    RecordRequest::address(
        &record.name,
        address.to_string(),
        record.effective_ttl(),
        record.use_proxy,
    )
}

async fn create_record(
    provider: &dyn DnsProvider,
    domain: &str,
    zone_id: &str,
    record: &RecordTarget,
    address: ResolvedAddress,
) -> ReconciliationOutcome {
    let body = request_for(record, address);
    debug!("Creating {} in zone {} with ip {}", record.name, zone_id, address);

    match provider.create_record(zone_id, &body).await {
        Ok(result) if result.success => {
            info!(
                "Created A record: {}, zone: {}, ip: {}",
                record.name, zone_id, address
            );
            ReconciliationOutcome::Created {
                record_id: result.record.map(|r| r.id),
            }
        }
        Ok(result) => {
            let error = result.error_summary();
            error!(
                "Provider rejected creation of {} (domain: {}, zone: {}, ip: {}), maybe try creating it manually: {}",
                record.name, domain, zone_id, address, error
            );
            ReconciliationOutcome::WriteFailed { error }
        }
        Err(e) => {
            error!(
                "Failed to create {} (domain: {}, zone: {}, ip: {}), maybe try creating it manually: {}",
                record.name, domain, zone_id, address, e
            );
            ReconciliationOutcome::WriteFailed {
                error: e.to_string(),
            }
        }
    }
}

async fn update_record(
    provider: &dyn DnsProvider,
    domain: &str,
    zone_id: &str,
    record: &RecordTarget,
    existing: RemoteRecord,
    address: ResolvedAddress,
) -> ReconciliationOutcome {
    let body = request_for(record, address);
    let target_zone = if existing.zone_id.is_empty() {
        zone_id
    } else {
        existing.zone_id.as_str()
    };
    debug!(
        "Updating {} (record {}) in zone {} with ip {}",
        record.name, existing.id, target_zone, address
    );

    match provider.update_record(target_zone, &existing.id, &body).await {
        Ok(result) if result.success => {
            info!(
                "Updated A record: {}, zone: {}, new ip: {}, old ip: {}",
                record.name, target_zone, address, existing.content
            );
            ReconciliationOutcome::Updated {
                record_id: existing.id,
                previous_content: existing.content,
            }
        }
        Ok(result) => {
            let error = result.error_summary();
            error!(
                "Provider rejected update of {} (domain: {}, zone: {}, record: {}, ip: {}): {}",
                record.name, domain, target_zone, existing.id, address, error
            );
            ReconciliationOutcome::WriteFailed { error }
        }
        Err(e) => {
            error!(
                "Failed to update {} (domain: {}, zone: {}, record: {}, ip: {}): {}",
                record.name, domain, target_zone, existing.id, address, e
            );
            ReconciliationOutcome::WriteFailed {
                error: e.to_string(),
            }
        }
    }
}
