//! netaware: command-line front end for the connectivity-aware client.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──▶ ResilientPipeline ──▶ Transport (reqwest) ──▶ network
//!                 │      ▲
//!       pre-flight│      │reprobe between attempts
//!                 ▼      │
//!             ConnectivityOracle ◀── ConnectivityMonitor ◀── probes / platform signal
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use netaware_client::config::{load_config, ClientConfig};
use netaware_client::connectivity::{build_probe, ConnectivityMonitor, ConnectivityOracle};
use netaware_client::lifecycle::{signals, Shutdown};
use netaware_client::observability::{logging, metrics};
use netaware_client::{HttpTransport, ResilientPipeline, TransportRequest};

#[derive(Parser)]
#[command(name = "netaware")]
#[command(about = "Connectivity-aware HTTP client with retries", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one request through the resilient pipeline
    Fetch {
        url: Url,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request body.
        #[arg(short, long)]
        data: Option<String>,

        /// Extra header as `name: value`, repeatable.
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Send at most once.
        #[arg(long)]
        no_retry: bool,
    },
    /// Probe reachability once and print the result
    Probe,
    /// Print reachability transitions until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_ctrl_c(shutdown.clone()));

    let oracle = Arc::new(ConnectivityOracle::new(build_probe(&config.connectivity), &config.connectivity));

    match cli.command {
        Commands::Fetch {
            url,
            method,
            data,
            headers,
            no_retry,
        } => {
            let request = build_request(url, &method, data, &headers, no_retry)?;
            fetch(&config, oracle, request, &shutdown).await
        }
        Commands::Probe => {
            let reachable = oracle.probe_reachability().await;
            let snapshot = oracle.snapshot();
            let report = serde_json::json!({
                "reachable": reachable,
                "version": snapshot.version,
                "source": snapshot.source.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Watch => {
            watch(&config, oracle, &shutdown).await;
            Ok(())
        }
    }
}

fn build_request(
    url: Url,
    method: &str,
    data: Option<String>,
    headers: &[String],
    no_retry: bool,
) -> Result<TransportRequest, Box<dyn Error>> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
    let mut request = TransportRequest::new(method, url);

    for raw in headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not in 'name: value' form", raw))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())?;
        let value = HeaderValue::from_str(value.trim())?;
        request = request.with_header(name, value);
    }
    if let Some(body) = data {
        request = request.with_body(body);
    }
    if no_retry {
        request = request.without_retry();
    }
    Ok(request)
}

async fn fetch(
    config: &ClientConfig,
    oracle: Arc<ConnectivityOracle>,
    request: TransportRequest,
    shutdown: &Shutdown,
) -> Result<(), Box<dyn Error>> {
    if config.connectivity.probe_on_start {
        oracle.probe_reachability().await;
    }

    let transport = HttpTransport::new(&config.transport)?;
    let pipeline = ResilientPipeline::from_config(transport, oracle, config);

    let response = pipeline.execute(&request, &shutdown.request_token()).await?;
    eprintln!("HTTP {}", response.status);
    println!("{}", response.text());
    Ok(())
}

async fn watch(config: &ClientConfig, oracle: Arc<ConnectivityOracle>, shutdown: &Shutdown) {
    let mut changes = oracle.subscribe();
    let mut stop = shutdown.subscribe();
    let monitor = ConnectivityMonitor::new(oracle.clone(), config.connectivity.clone())
        .spawn(shutdown.subscribe());

    println!("reachable={} (initial)", oracle.is_reachable_now());

    loop {
        tokio::select! {
            _ = stop.recv() => break,
            change = changes.recv() => match change {
                Some(change) => println!(
                    "reachable={} version={} source={}",
                    change.reachable, change.version, change.source
                ),
                None => break,
            },
        }
    }

    monitor.shutdown().await;
}
