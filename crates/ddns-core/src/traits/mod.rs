//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Transport`]: Raw HTTP GET/POST/PATCH
//! - [`IpSource`]: Detect the current public IP address
//! - [`DnsProvider`]: Search, create and update DNS records via provider APIs

pub mod transport;
pub mod ip_source;
pub mod dns_provider;

pub use transport::{Header, Transport};
pub use ip_source::{IpSource, ResolvedAddress};
pub use dns_provider::{
    DnsProvider, ProviderMessage, RecordRequest, RemoteRecord, SearchOutcome, WriteResult,
    ZoneSummary, ADDRESS_RECORD_TYPE, DEFAULT_TTL,
};
