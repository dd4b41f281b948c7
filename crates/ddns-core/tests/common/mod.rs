//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call so tests can assert on exactly what the
//! engine asked for, in which order.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, IpSource, ProviderMessage, RecordRequest, RemoteRecord, ResolvedAddress,
    SearchOutcome, WriteResult, ZoneSummary,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

/// What the controlled IP source answers
#[derive(Clone)]
enum Answer {
    Address(ResolvedAddress),
    Unreachable,
    Garbage(String),
}

/// An IpSource with a fixed answer that counts lookups
pub struct ControlledIpSource {
    answer: Answer,
    lookups: Arc<AtomicUsize>,
}

impl ControlledIpSource {
    /// Always resolve to `ip`
    pub fn returning(ip: &str) -> Self {
        Self {
            answer: Answer::Address(ip.parse().expect("valid test address")),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fail as if the endpoint were unreachable
    pub fn unreachable() -> Self {
        Self {
            answer: Answer::Unreachable,
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with a body that is not an address
    pub fn answering(body: &str) -> Self {
        Self {
            answer: Answer::Garbage(body.to_string()),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared lookup counter, readable after the source is boxed
    pub fn lookup_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }
}

#[async_trait::async_trait]
impl IpSource for ControlledIpSource {
    async fn current(&self) -> Result<ResolvedAddress> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Address(address) => Ok(*address),
            Answer::Unreachable => Err(Error::address_lookup(
                "https://ip.test/",
                Error::transport("connection refused"),
            )),
            Answer::Garbage(body) => body.parse(),
        }
    }

    fn describe(&self) -> String {
        "controlled test source".to_string()
    }
}

/// A call the engine made against the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListZones,
    Search {
        zone_id: String,
        hostname: String,
    },
    Create {
        zone_id: String,
        body: RecordRequest,
    },
    Update {
        zone_id: String,
        record_id: String,
        body: RecordRequest,
    },
}

impl ProviderCall {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Create { .. } | Self::Update { .. })
    }

    pub fn zone_id(&self) -> Option<&str> {
        match self {
            Self::ListZones => None,
            Self::Search { zone_id, .. }
            | Self::Create { zone_id, .. }
            | Self::Update { zone_id, .. } => Some(zone_id),
        }
    }
}

/// Scripted answer to a search
#[derive(Debug, Clone)]
pub enum SearchScript {
    Found(RemoteRecord),
    NotFound,
    Ambiguous(usize),
    ProviderFailure,
    TransportFailure,
}

/// A DnsProvider whose answers are scripted per hostname
///
/// Unscripted hostnames are not found.
pub struct MockDnsProvider {
    calls: std::sync::Mutex<Vec<ProviderCall>>,
    searches: HashMap<String, SearchScript>,
    zones: Option<Vec<ZoneSummary>>,
    failing_writes: HashSet<String>,
    rejected_writes: HashSet<String>,
    search_delay: Option<Duration>,
    search_barrier: Option<Arc<Barrier>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            searches: HashMap::new(),
            zones: Some(Vec::new()),
            failing_writes: HashSet::new(),
            rejected_writes: HashSet::new(),
            search_delay: None,
            search_barrier: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Script the search result for a hostname
    pub fn with_search(mut self, hostname: &str, script: SearchScript) -> Self {
        self.searches.insert(hostname.to_string(), script);
        self
    }

    /// An existing record for `hostname`
    pub fn with_existing(self, hostname: &str, record_id: &str, zone_id: &str, content: &str) -> Self {
        let record = remote_record(record_id, zone_id, hostname, content);
        self.with_search(hostname, SearchScript::Found(record))
    }

    /// Zones returned by list_zones
    pub fn with_zones(mut self, zones: &[(&str, &str)]) -> Self {
        self.zones = Some(
            zones
                .iter()
                .map(|(id, name)| ZoneSummary {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        );
        self
    }

    /// Make list_zones fail
    pub fn with_failing_zone_listing(mut self) -> Self {
        self.zones = None;
        self
    }

    /// Writes for this hostname fail at the transport level
    pub fn with_failing_write(mut self, hostname: &str) -> Self {
        self.failing_writes.insert(hostname.to_string());
        self
    }

    /// Writes for this hostname are decoded but rejected by the provider
    pub fn with_rejected_write(mut self, hostname: &str) -> Self {
        self.rejected_writes.insert(hostname.to_string());
        self
    }

    /// Sleep inside every search
    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    /// Every search waits on this barrier before answering
    pub fn with_search_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.search_barrier = Some(barrier);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Search { .. }))
            .count()
    }

    pub fn writes(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(ProviderCall::is_write).collect()
    }

    pub fn zone_listings(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::ListZones))
            .count()
    }

    /// Calls made against one zone, in order
    pub fn calls_in_zone(&self, zone_id: &str) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.zone_id() == Some(zone_id))
            .collect()
    }

    /// Highest number of searches observed in flight at once
    pub fn max_concurrent_searches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self, body: &RecordRequest, record_id: &str, zone_id: &str) -> Result<WriteResult> {
        if self.failing_writes.contains(&body.name) {
            return Err(Error::provider_request("write", "connection reset by peer"));
        }
        if self.rejected_writes.contains(&body.name) {
            return Ok(WriteResult {
                success: false,
                errors: vec![ProviderMessage {
                    code: 81057,
                    message: "The record already exists.".to_string(),
                }],
                record: None,
            });
        }
        Ok(WriteResult {
            success: true,
            errors: Vec::new(),
            record: Some(remote_record(record_id, zone_id, &body.name, &body.content)),
        })
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>> {
        self.record(ProviderCall::ListZones);
        self.zones
            .clone()
            .ok_or_else(|| Error::provider_request("list_zones", "connection refused"))
    }

    async fn search_record(&self, zone_id: &str, hostname: &str) -> Result<SearchOutcome> {
        self.record(ProviderCall::Search {
            zone_id: zone_id.to_string(),
            hostname: hostname.to_string(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(barrier) = &self.search_barrier {
            barrier.wait().await;
        }
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.searches.get(hostname).cloned().unwrap_or(SearchScript::NotFound) {
            SearchScript::Found(record) => Ok(SearchOutcome::Found(record)),
            SearchScript::NotFound => Ok(SearchOutcome::NotFound),
            SearchScript::Ambiguous(n) => Ok(SearchOutcome::Ambiguous(n)),
            SearchScript::ProviderFailure => Err(Error::no_route_matches(7003, "Could not route to /zones/bad")),
            SearchScript::TransportFailure => Err(Error::provider_request("search_record", "timed out")),
        }
    }

    async fn create_record(&self, zone_id: &str, body: &RecordRequest) -> Result<WriteResult> {
        self.record(ProviderCall::Create {
            zone_id: zone_id.to_string(),
            body: body.clone(),
        });
        self.write_result(body, "new-record", zone_id)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        body: &RecordRequest,
    ) -> Result<WriteResult> {
        self.record(ProviderCall::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            body: body.clone(),
        });
        self.write_result(body, record_id, zone_id)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build a remote A record
pub fn remote_record(id: &str, zone_id: &str, name: &str, content: &str) -> RemoteRecord {
    RemoteRecord {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        name: name.to_string(),
        record_type: "A".to_string(),
        content: content.to_string(),
        ttl: 1,
        proxied: false,
        modified_on: None,
    }
}
