//! kubepulsed — the kubepulse daemon.
//!
//! Single binary that assembles the kubepulse subsystems:
//! - Kubernetes status source
//! - Cluster health loop
//! - Autoscale decision loop
//! - Gauge registry + /metrics endpoint
//!
//! # Usage
//!
//! ```text
//! kubepulsed run --config /etc/kubepulse/kubepulse.toml --metrics-port 2112
//! kubepulsed config --config /etc/kubepulse/kubepulse.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};

use kubepulse_core::{ClusterStatusSource, LoadSampler, MetricsSink, PulseConfig};

#[derive(Parser)]
#[command(name = "kubepulsed", about = "kubepulse cluster health and autoscale daemon")]
struct Cli {
    /// Path to kubepulse.toml. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the health and autoscale loops and serve /metrics.
    Run {
        /// Port for the metrics endpoint (overrides metrics.port).
        #[arg(long)]
        metrics_port: Option<u16>,

        /// Kubeconfig path (overrides cluster.kubeconfig).
        #[arg(long)]
        kubeconfig: Option<PathBuf>,
    },
    /// Print the effective configuration and exit.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = match &cli.config {
        Some(path) => PulseConfig::from_file(path)?,
        None => PulseConfig::default(),
    };

    match cli.command {
        Command::Run {
            metrics_port,
            kubeconfig,
        } => {
            if let Some(port) = metrics_port {
                config.metrics.port = port;
            }
            if kubeconfig.is_some() {
                config.cluster.kubeconfig = kubeconfig;
            }
            config.validate()?;
            run(config).await
        }
        Command::Config => {
            config.validate()?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,kubepulsed=debug,kubepulse=debug"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: PulseConfig) -> anyhow::Result<()> {
    info!("kubepulse daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let registry = Arc::new(kubepulse_metrics::GaugeRegistry::new());
    let sink: Arc<dyn MetricsSink> = registry.clone();

    let source: Arc<dyn ClusterStatusSource> = Arc::new(
        kubepulse_kube::KubeStatusSource::connect(
            config.cluster.kubeconfig.as_deref(),
            config.cluster.query_timeout(),
        )
        .await?,
    );

    let mut health_monitor = kubepulse_health::HealthMonitor::new(
        source,
        sink.clone(),
        config.health.interval(),
        config.health.max_backoff(),
    );
    let health = health_monitor.handle();
    info!(
        interval_secs = config.health.interval().as_secs(),
        "health monitor initialized"
    );

    let autoscaler = Arc::new(kubepulse_autoscale::AutoscaleEngine::from_config(
        &config.autoscale,
        sink,
    )?);
    let sampler: Arc<dyn LoadSampler> = Arc::new(kubepulse_autoscale::RandomLoadSampler::default());
    info!(
        interval_secs = config.autoscale.interval().as_secs(),
        initial = config.autoscale.initial_replicas,
        "autoscaler initialized"
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let health_shutdown = shutdown_rx.clone();
    let autoscale_shutdown = shutdown_rx.clone();

    // ── Start background tasks ─────────────────────────────────

    let health_handle = tokio::spawn(async move {
        health_monitor.run(health_shutdown).await;
    });

    let autoscale_engine = autoscaler.clone();
    let autoscale_interval = config.autoscale.interval();
    let autoscale_handle = tokio::spawn(async move {
        autoscale_engine
            .run(sampler, autoscale_interval, autoscale_shutdown)
            .await;
    });

    // ── Start metrics server ───────────────────────────────────

    let router = kubepulse_api::build_router(kubepulse_api::ApiState {
        registry,
        health,
        autoscaler,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics.port));

    info!(%addr, "metrics server starting on /metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for background tasks.
    if let Err(e) = health_handle.await {
        error!(error = %e, "health loop ended abnormally");
    }
    if let Err(e) = autoscale_handle.await {
        error!(error = %e, "autoscale loop ended abnormally");
    }

    info!("kubepulse daemon stopped");
    Ok(())
}
