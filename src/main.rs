//! Locale routing gateway.
//!
//! Sits in front of a web application and resolves the locale of every
//! request before forwarding it.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                  LOCALE GATEWAY                      │
//!                     │                                                      │
//!   Client Request    │  ┌─────────┐   ┌─────────┐   ┌──────────┐            │
//!   ──────────────────┼─▶│  http   │──▶│ matcher │──▶│ resolver │            │
//!                     │  │ server  │   │host/path│   │ cascade  │            │
//!                     │  └─────────┘   └─────────┘   └────┬─────┘            │
//!                     │                                   ▼                  │
//!                     │                            ┌────────────┐            │
//!   307 Redirect      │                            │  decision  │            │
//!   ◀─────────────────┼────────────────────────────│ + links    │            │
//!                     │                            └────┬───────┘            │
//!                     │                                 ▼ rewrite / pass     │
//!   Client Response   │  ┌─────────┐              ┌────────────┐            │
//!   ◀─────────────────┼──│response │◀─────────────│  upstream  │◀───────────┼── App
//!                     │  │ headers │              │   client   │            │
//!                     │  └─────────┘              └────────────┘            │
//!                     │                                                      │
//!                     │   config + hot reload │ observability │ lifecycle    │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use locale_router::config::watcher::ConfigWatcher;
use locale_router::config::{load_config, ServiceConfig};
use locale_router::lifecycle::{wait_for_termination, Shutdown};
use locale_router::observability::{logging, metrics};
use locale_router::HttpServer;

#[derive(Parser)]
#[command(name = "locale-router")]
#[command(about = "Locale-aware routing gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the routing section when the configuration file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "locale-router starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        locales = ?config.routing.locales,
        default_locale = %config.routing.default_locale,
        locale_prefix = config.routing.locale_prefix.as_str(),
        domains = config.routing.domains.len(),
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

    // The watcher must stay alive for updates to flow.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_termination().await;
        shutdown.trigger();
    });

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
            server.run_tls(addr, rustls, config_updates, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
