//! Binary entry point for the rategate proxy.
//!
//! # Responsibilities
//! - Parse command-line flags and the optional TOML config file
//! - Initialize logging and the metrics exporter
//! - Wire the admission controller, sweeper, and HTTP server together
//! - Coordinate graceful shutdown on Ctrl+C / SIGTERM

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rategate::admission::AdmissionController;
use rategate::config::{load_config, validate_config, Algorithm, ProxyConfig};
use rategate::http::HttpServer;
use rategate::lifecycle::{wait_for_signal, Shutdown};
use rategate::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "rategate", version, about = "Rate-limiting reverse proxy")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rate limiting algorithm: token_bucket, leaky_bucket, fixed_window,
    /// sliding_window, or no_rate_limit
    #[arg(long, value_parser = Algorithm::from_str)]
    algorithm: Option<Algorithm>,

    /// Sustained admissions per second
    #[arg(long)]
    rate: Option<u32>,

    /// Burst capacity for the bucket algorithms
    #[arg(long)]
    burst: Option<u32>,

    /// Window length in seconds for the window algorithms
    #[arg(long)]
    window_secs: Option<u64>,

    /// Upstream base URL, e.g. http://127.0.0.1:8081
    #[arg(long)]
    backend: Option<String>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<String>,
}

/// Command-line flags win over the config file, which wins over defaults.
fn apply_overrides(config: &mut ProxyConfig, cli: &Cli) {
    if let Some(algorithm) = cli.algorithm {
        config.rate_limit.algorithm = algorithm;
    }
    if let Some(rate) = cli.rate {
        config.rate_limit.requests_per_second = rate;
    }
    if let Some(burst) = cli.burst {
        config.rate_limit.burst_size = burst;
    }
    if let Some(window_secs) = cli.window_secs {
        config.rate_limit.window_secs = window_secs;
    }
    if let Some(backend) = &cli.backend {
        config.backend.url = backend.clone();
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    logging::init(&config.observability.log_level);

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err("configuration validation failed".into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.url,
        algorithm = %config.rate_limit.algorithm,
        requests_per_second = config.rate_limit.requests_per_second,
        burst_size = config.rate_limit.burst_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let controller = Arc::new(AdmissionController::new(config.rate_limit.clone()));
    let shutdown = Shutdown::new();

    let sweeper = controller.sweeper(&config.sweeper);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, Arc::clone(&controller));
    let server_handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    server_handle.await??;
    sweeper_handle.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
