// # ddns - Cloudflare DDNS updater
//
// Thin integration layer: parses the command line, loads the configuration,
// wires the transport, IP source and provider together and runs one
// reconciliation pass. All reconciliation logic lives in ddns-core.
//
// ## Configuration
//
// YAML file (`--config`, default `./ddns.yaml`):
//
// ```yaml
// cloudflare:
//   api:
//     id: "<api token>"
//   Domain:
//     - name: "example.com"
//       zone_identifier: "023e105f4ecef8ad9ca31a8372d0c353"
//       record_name:
//         - name: "home.example.com"
//           ttl: 0
//           use_proxy: false
// seek_ip_url: "https://ipv4.icanhazip.com/"
// ```
//
// Environment overrides:
// - `DDNS_CLOUDFLARE_API_TOKEN`: API token
// - `DDNS_SEEK_IP_URL`: "what is my IP" endpoint
// - `DDNS_MODE=dry-run`: only log writes
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export DDNS_CLOUDFLARE_API_TOKEN=your_token
// ddns --config /etc/ddns/ddns.yaml update-dns
// ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_http::{HttpIpSource, ReqwestTransport};
use ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Command};

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (individual record failures are logged, not fatal)
/// - 1: Configuration error
/// - 2: Runtime error (address lookup failed, runtime could not start)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DdnsExitCode {
    /// Exit code for a failed update
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ddns_core::Error>() {
            Some(ddns_core::Error::Config(_)) => Self::ConfigError,
            _ => Self::RuntimeError,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let mut config = match DdnsConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };
    if cli.dry_run {
        config.engine.dry_run = true;
    }

    match cli.command {
        Command::CheckConfig => {
            print_plan(&config);
            DdnsExitCode::Success.into()
        }
        Command::UpdateDns => {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    return DdnsExitCode::RuntimeError.into();
                }
            };

            let code = rt.block_on(async {
                match update_dns(config).await {
                    Ok(()) => DdnsExitCode::Success,
                    Err(e) => {
                        error!("Update failed: {:#}", e);
                        DdnsExitCode::for_error(&e)
                    }
                }
            });

            code.into()
        }
    }
}

/// Run one reconciliation pass
async fn update_dns(config: DdnsConfig) -> Result<()> {
    let transport = Arc::new(
        ReqwestTransport::new(Duration::from_secs(config.engine.http_timeout_secs))
            .context("failed to build HTTP transport")?,
    );

    let ip_source = HttpIpSource::new(transport.clone(), config.seek_ip_url.clone());
    let provider = CloudflareProvider::new(
        config.cloudflare.api.id.clone(),
        transport,
        config.engine.dry_run,
    )?;

    info!(
        "Starting DNS update: {} domain(s), {} record(s), address from {}",
        config.cloudflare.domains.len(),
        config.record_count(),
        ip_source.url()
    );

    let engine = DdnsEngine::from_config(Box::new(ip_source), Arc::new(provider), &config)?;
    let report = engine
        .run()
        .await
        .context("could not determine the public IP address")?;

    if report.has_failures() {
        warn!(
            "Some records could not be reconciled ({}), see errors above",
            report.summary()
        );
    } else {
        info!("All records point at {}", report.address);
    }

    Ok(())
}

/// Print the domains and records a run would manage
fn print_plan(config: &DdnsConfig) {
    println!(
        "Configuration OK: {} domain(s), {} record(s){}",
        config.cloudflare.domains.len(),
        config.record_count(),
        if config.engine.dry_run { " [dry-run]" } else { "" }
    );
    for domain in &config.cloudflare.domains {
        let zone = if domain.needs_zone_lookup() {
            "<looked up by name>"
        } else {
            domain.zone_identifier.as_str()
        };
        println!("{} (zone: {})", domain.name, zone);
        for record in &domain.records {
            println!(
                "  {} ttl={} proxied={}",
                record.name,
                record.effective_ttl(),
                record.use_proxy
            );
        }
    }
}
