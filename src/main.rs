//! Process entry point: CLI parsing, configuration, startup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use regproxy::config::{load_config, validate_config, ProxyConfig};
use regproxy::http::HttpServer;
use regproxy::lifecycle::{signals, Shutdown};
use regproxy::observability::metrics;
use regproxy::registry::Registry;

/// Registering fan-out reverse proxy: forwards every request to all
/// registered upstreams in parallel and returns the last response.
#[derive(Debug, Parser)]
#[command(name = "regproxy", version)]
struct Args {
    /// The host to bind to.
    #[arg(long)]
    host: Option<String>,

    /// The port to bind to.
    #[arg(short = 'p', long = "reg-port")]
    port: Option<u16>,

    /// The connection timeout in milliseconds for upstreams.
    #[arg(short = 'c', long = "connect-timeout")]
    connect_timeout_ms: Option<u64>,

    /// The read timeout in milliseconds for upstreams.
    #[arg(short = 'r', long = "read-timeout")]
    read_timeout_ms: Option<u64>,

    /// Optional TOML configuration file; CLI flags win over file values.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.timeouts.connect_ms = ms;
        }
        if let Some(ms) = self.read_timeout_ms {
            config.timeouts.read_ms = ms;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Malformed flags: clap prints usage and exits before anything binds.
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    args.apply(&mut config);

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config error: {}", error);
        }
        return Err("invalid configuration".into());
    }

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "regproxy={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("regproxy v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        connect_timeout_ms = config.timeouts.connect_ms,
        read_timeout_ms = config.timeouts.read_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Bind before constructing the server; a bind failure exits without
    // ever accepting traffic.
    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let registry = Arc::new(Registry::new());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::listen(shutdown));

    let server = HttpServer::new(config, registry);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
