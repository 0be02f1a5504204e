//! market-cache-proxy binary.
//!
//! - `serve`: run the HTTP listener until Ctrl+C
//! - `invoke`: push one request descriptor through the pipeline
//! - `check-config`: validate a config file and print it resolved

use clap::{Parser, Subcommand};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use market_cache_proxy::config::{resolve_config, ProxyConfig};
use market_cache_proxy::lifecycle::{self, build_pipeline, Shutdown};
use market_cache_proxy::observability::{logging, metrics};
use market_cache_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "market-cache-proxy")]
#[command(about = "Caching proxy for financial-data HTTP APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests over HTTP
    Serve {
        /// Path to a TOML config file (built-in defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Handle a single request descriptor and print the response as JSON
    Invoke {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file with `rawPath` and `queryStringParameters` (stdin when omitted)
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Validate a config file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = resolve_config(config.as_deref())?;
            logging::init_logging(&config.observability);
            serve(config).await?;
        }
        Commands::Invoke { config, event } => {
            let config = resolve_config(config.as_deref())?;
            logging::init_logging(&config.observability);
            invoke(config, event).await?;
        }
        Commands::CheckConfig { config } => {
            let config = resolve_config(Some(config.as_path()))?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn serve(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("market-cache-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        upstream_timeout_secs = config.upstream.timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let (pipeline, store) = build_pipeline(&config)?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let flusher = tokio::spawn(store.run_flusher(
        Duration::from_secs(config.cache.flush_interval_secs),
        shutdown.subscribe(),
    ));

    let server = HttpServer::new(config, pipeline);
    let result = server.serve(shutdown.subscribe()).await;

    // Stop the flusher even if the server failed to start.
    shutdown.trigger();
    if let Err(e) = flusher.await {
        tracing::error!(error = %e, "Cache flusher task failed");
    }

    result?;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn invoke(config: ProxyConfig, event: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match event {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let response = lifecycle::invoke(&config, &raw).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
