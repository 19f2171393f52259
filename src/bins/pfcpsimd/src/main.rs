//! pfcpsimd - PFCP peer simulator daemon.
//!
//! Hosts the simulation engine behind an HTTP control API. Operators
//! normally drive it with pfcpctl; any HTTP client works.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use pfcpsimd::{api, SimContext};

/// PFCP control-plane peer simulator
#[derive(Parser, Debug)]
#[command(name = "pfcpsimd")]
#[command(author = "NextGCore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "PFCP peer simulator for N4 conformance and load testing", long_about = None)]
struct Args {
    /// Control API bind address
    #[arg(short = 'a', long, default_value = "127.0.0.1")]
    api_addr: String,

    /// Control API port
    #[arg(short = 'p', long, default_value = "54321")]
    api_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'e', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    log::info!("pfcpsimd v{} starting...", env!("CARGO_PKG_VERSION"));

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        log::info!("received shutdown signal");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("failed to set signal handler")?;

    let api_addr: SocketAddr = format!("{}:{}", args.api_addr, args.api_port)
        .parse()
        .context("invalid control API address")?;

    let ctx = Arc::new(SimContext::new());

    let server_ctx = ctx.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = api::serve(server_ctx, api_addr).await {
            log::error!("control API server failed: {}", e);
        }
    });

    log::info!("pfcpsimd ready");

    let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(100));
    loop {
        interval.tick().await;
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
    }

    log::info!("shutting down...");
    server.abort();

    // Close whatever transport is still open; the association state dies
    // with the process either way.
    ctx.peer.disconnect().await;

    log::info!("pfcpsimd stopped");
    Ok(())
}
