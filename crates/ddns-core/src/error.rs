//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! Only address resolution and configuration errors are fatal to a run.
//! Everything a provider reports for an individual record is caught by the
//! engine and recorded in the run report.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// The "what is my IP" endpoint could not be reached
    #[error("Address lookup failed ({url}): {source}")]
    AddressLookupFailed {
        /// Endpoint that was queried
        url: String,
        /// Underlying transport error
        #[source]
        source: Box<Error>,
    },

    /// The lookup endpoint answered with something that is not an IP literal
    #[error("Invalid address format: {candidate:?} ({detail})")]
    InvalidAddressFormat {
        /// Response body after trimming
        candidate: String,
        /// Parser diagnostic
        detail: String,
    },

    /// Transport or decode failure while talking to the DNS provider
    #[error("Provider request failed ({operation}): {message}")]
    ProviderRequestFailed {
        /// Provider operation, e.g. "search_record"
        operation: &'static str,
        /// Error message
        message: String,
    },

    /// The provider answered but reported a business-level failure
    #[error("No route matches (code {code}): {message}")]
    NoRouteMatches {
        /// Provider error code
        code: i64,
        /// Provider error message
        message: String,
    },

    /// HTTP transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an address lookup error wrapping the transport failure
    pub fn address_lookup(url: impl Into<String>, source: Error) -> Self {
        Self::AddressLookupFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Create an invalid address error
    pub fn invalid_address(candidate: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidAddressFormat {
            candidate: candidate.into(),
            detail: detail.into(),
        }
    }

    /// Create a provider request error
    pub fn provider_request(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderRequestFailed {
            operation,
            message: message.into(),
        }
    }

    /// Create a provider business error
    pub fn no_route_matches(code: i64, message: impl Into<String>) -> Self {
        Self::NoRouteMatches {
            code,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
