//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// Point Cloudflare A records at the public IP of this machine.
///
/// Configuration is read from a YAML file; the API token and the IP lookup
/// endpoint can be overridden with DDNS_CLOUDFLARE_API_TOKEN and
/// DDNS_SEEK_IP_URL.
#[derive(Debug, Parser)]
#[command(name = "ddns", author, version)]
pub struct Cli {
    /// Path to the YAML configuration file [default: ./ddns.yaml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info", env = "DDNS_LOG_LEVEL")]
    pub log_level: Level,

    /// Search records but only log the writes that would be sent
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass over every configured record
    #[command(alias = "update_dns")]
    UpdateDns,

    /// Load and validate the configuration, then print what would be managed
    CheckConfig,
}
