// # ddns-core
//
// Core library for the DDNS reconciliation engine.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping DNS address
// records pointed at the machine's current public IP:
// - **Transport**: Trait for the raw HTTP layer (GET/POST/PATCH)
// - **IpSource**: Trait for detecting the current public IP
// - **DnsProvider**: Trait for searching, creating and updating DNS records
// - **DdnsEngine**: One reconciliation pass, concurrent across domains
// - **DdnsConfig**: YAML configuration, environment overrides, validation
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Injected Configuration**: No global state; config is passed to constructors
// 3. **Best Effort**: One failing record never stops the others
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Single Attempt**: No retries; operators re-run the tool

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource, ResolvedAddress, Transport};
pub use engine::{DdnsEngine, ReconciliationOutcome, RunReport};
pub use config::{DdnsConfig, DomainTarget, EngineConfig, RecordTarget};
pub use error::{Error, Result};
