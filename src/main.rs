//! CrowdSec bouncer for a reverse proxy (v0.1)
//!
//! Answers the host proxy's sniff callback with an accept/skip verdict based
//! on CrowdSec decisions for the request's client address, and serves the
//! 403 for requests it accepted.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    CROWDSEC GATE                      │
//!  Host proxy         │  ┌─────────┐   ┌──────────┐   ┌────────────────────┐  │
//!  POST /d_sniff ─────┼─▶│  http   │──▶│ security │──▶│     bouncer        │  │
//!                     │  │ server  │   │client_ip │   │    evaluator       │  │
//!  200 / 501 ◀────────┼──│         │◀──┴──────────┴───│ (10s deadline)     │  │
//!                     │  └─────────┘                  └─────────┬──────────┘  │
//!  /d_capture ───────▶│  403 Forbidden                          │             │
//!                     │                                ┌────────▼──────────┐  │   CrowdSec
//!                     │                                │    decisions      │──┼─▶ Local API
//!                     │                                │   LapiClient      │  │
//!                     │                                └───────────────────┘  │
//!                     │  ┌─────────────────────────────────────────────────┐  │
//!                     │  │ observability: logging, per-origin counters,     │  │
//!                     │  │ usage-metrics push, optional Prometheus          │  │
//!                     │  └─────────────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use crowdsec_gate::config::load_config;
use crowdsec_gate::lifecycle::startup;
use crowdsec_gate::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "crowdsec-gate")]
#[command(about = "CrowdSec bouncer for reverse proxy sniff/capture hooks", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "./config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration first; logging depends on it.
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", cli.config.display(), e);
            return Err(e.into());
        }
    };

    init_logging(&config.observability.log_level);
    tracing::info!("crowdsec-gate v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
