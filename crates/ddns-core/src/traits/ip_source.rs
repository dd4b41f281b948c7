// # IP Source Trait
//
// Defines the interface for detecting the current public IP address.
//
// ## Implementations
//
// - HTTP echo service (icanhazip and friends): `ddns-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let address = source.current().await?;
//     println!("current address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A validated IP address, resolved once per run
///
/// `Copy`, so every concurrent domain task gets its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedAddress(IpAddr);

impl ResolvedAddress {
    /// Wrap an already-parsed address
    pub fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    /// Whether this is an IPv4 address
    pub fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }
}

impl FromStr for ResolvedAddress {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>()
            .map(Self)
            .map_err(|e| crate::Error::invalid_address(s, e.to_string()))
    }
}

impl From<IpAddr> for ResolvedAddress {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trait for IP source implementations
///
/// The engine calls [`IpSource::current`] exactly once per run. Sources must
/// not retry or cache: a failure here aborts the run.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedAddress)`: The current IP address
    /// - `Err(Error::AddressLookupFailed)`: The endpoint could not be reached
    /// - `Err(Error::InvalidAddressFormat)`: The endpoint returned garbage
    async fn current(&self) -> Result<ResolvedAddress, crate::Error>;

    /// Where the address comes from (for logging)
    fn describe(&self) -> String;
}
