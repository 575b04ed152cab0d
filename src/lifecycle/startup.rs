//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the decision client, metrics registry and evaluator
//! - Start background tasks (usage reporter, Prometheus endpoint)
//! - Bind the listener and serve until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::bouncer::RequestEvaluator;
use crate::config::BouncerConfig;
use crate::decisions::{DecisionError, LapiClient};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::exporter::UsageReporter;
use crate::observability::metrics::MetricsAggregator;
use crate::observability::prometheus;

/// Fatal errors before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("unable to initialize decision client: {0}")]
    DecisionSource(#[from] DecisionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The assembled bouncer, ready to serve.
pub struct Bouncer {
    config: BouncerConfig,
    lapi: Arc<LapiClient>,
    aggregator: Arc<MetricsAggregator>,
    evaluator: RequestEvaluator,
}

impl Bouncer {
    /// Initialize subsystems in dependency order.
    pub fn build(config: BouncerConfig) -> Result<Self, StartupError> {
        let lapi = Arc::new(LapiClient::new(&config.crowdsec)?);
        let aggregator = Arc::new(MetricsAggregator::with_policy(config.usage_metrics.policy()));
        let evaluator = RequestEvaluator::new(lapi.clone(), aggregator.clone());

        Ok(Self {
            config,
            lapi,
            aggregator,
            evaluator,
        })
    }

    pub fn aggregator(&self) -> &Arc<MetricsAggregator> {
        &self.aggregator
    }

    /// Start background tasks and serve on `listener` until `shutdown` fires.
    pub async fn serve(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), StartupError> {
        if self.config.observability.prometheus_enabled {
            match self.config.observability.prometheus_address.parse::<SocketAddr>() {
                Ok(addr) => prometheus::init_metrics(addr),
                Err(_) => tracing::error!(
                    prometheus_address = %self.config.observability.prometheus_address,
                    "Failed to parse Prometheus address"
                ),
            }
        }

        if self.config.usage_metrics.enabled {
            let reporter = UsageReporter::new(
                self.aggregator.clone(),
                self.lapi.clone(),
                Duration::from_secs(self.config.usage_metrics.push_interval_secs),
            );
            tokio::spawn(reporter.run(shutdown.subscribe()));
        } else {
            tracing::info!("Usage metrics push disabled");
        }

        let state = AppState {
            evaluator: self.evaluator,
            proxied_behind_edge_cdn: self.config.trust.proxied_behind_edge_cdn,
        };
        HttpServer::new(state).run(listener, shutdown.subscribe()).await?;
        Ok(())
    }
}

/// Run the bouncer until SIGTERM/SIGINT.
pub async fn run(config: BouncerConfig) -> Result<(), StartupError> {
    tracing::info!(
        agent_url = %config.crowdsec.agent_url,
        bind_address = %config.listener.bind_address,
        proxied_behind_edge_cdn = config.trust.proxied_behind_edge_cdn,
        "Configuration loaded"
    );

    let bind_address = config.listener.bind_address.clone();
    let bouncer = Bouncer::build(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for sniff and capture requests");

    let shutdown = Arc::new(Shutdown::new());
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(signal) => tracing::warn!(signal, "Received signal, shutting down"),
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler, shutting down"),
        }
        trigger.trigger();
    });

    bouncer.serve(listener, &shutdown).await
}
