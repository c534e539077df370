// # fortisync - DHCP to DNS sync runner
//
// Runs one sync of an appliance's DHCP leases into its DNS zone database and
// exits. Schedule it externally (cron, systemd timer, Kubernetes CronJob).
//
// The runner is a thin integration layer:
// 1. Resolve configuration from environment variables and secret files
// 2. Initialize logging
// 3. Build the reqwest transport and the pipeline
// 4. Run once and map the outcome to an exit code
//
// ## Configuration
//
// Each setting may also be given as `<NAME>_FILE` (path to a file holding the
// value) or as a file `/secrets/<name>`; see `config.rs`.
//
// - `FGT_API_KEY`: REST API token (required)
// - `FGT_HOST`: appliance address (default `192.168.1.99`)
// - `FGT_PORT`: REST API port (default `443`)
// - `FGT_VERIFY_TLS`: verify the appliance certificate (default `true`)
// - `FGT_ZONE`: DNS database zone to replace (default `dhcp.internal`)
// - `FGT_VDOM`: virtual domain (default `root`)
// - `FGT_IPV6`: include IPv6 leases (default `true`)
// - `FGT_TTL`: TTL written on each entry (default `0`)
// - `FGT_LOG_RECORDS`: log the full record set before upload (default `false`)
// - `FGT_TIMEOUT_SECS`: per-request timeout (default `30`)
// - `FGT_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//
// ## Example
//
// ```bash
// export FGT_HOST=192.168.1.99
// export FGT_API_KEY_FILE=/run/secrets/fortigate-api-key
// export FGT_ZONE=dhcp.internal
// export FGT_TTL=300
//
// fortisync
// ```

mod config;

use config::Config;
use fortisync_core::{SyncPipeline, SyncReport};
use fortisync_http::ReqwestTransport;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible run outcomes
///
/// - 0: Zone updated
/// - 1: Configuration error, nothing was contacted
/// - 2: Run failed (fetch, transform or upload)
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// The record set was accepted
    Synced = 0,
    /// Configuration error
    ConfigError = 1,
    /// Runtime error
    RunFailed = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    // Stages run strictly in sequence; one thread is all a run needs
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RunFailed.into();
        }
    };

    let code = rt.block_on(async {
        match sync(config).await {
            Ok(report) => {
                info!(
                    "Synced {} record(s) from {} lease(s) via {} in {} ms",
                    report.published,
                    report.fetched,
                    report.outcome.method(),
                    report.elapsed().num_milliseconds()
                );
                SyncExitCode::Synced
            }
            Err(e) if e.is_config() => {
                error!("{}", e);
                SyncExitCode::ConfigError
            }
            Err(e) => {
                error!("Sync failed: {}", e);
                SyncExitCode::RunFailed
            }
        }
    });

    code.into()
}

/// Build the transport and pipeline, then run once
async fn sync(config: Config) -> fortisync_core::Result<SyncReport> {
    let transport = ReqwestTransport::new(&config.sync.appliance)?;
    let (pipeline, _events) = SyncPipeline::new(Box::new(transport), config.sync)?;

    pipeline.run().await
}
