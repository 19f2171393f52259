//! pfcpctl - operator CLI for the PFCP peer simulator.
//!
//! Talks JSON to a running pfcpsimd control API and prints the outcome of
//! each command. Exits non-zero when the daemon reports a failure so the
//! tool composes with shell scripting.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpStream;

use pfcpsimd::api::{
    ConfigureRequest, CreateSessionRequest, DeleteSessionRequest, ModifySessionRequest,
};
use pfcpsimd::CommandOutcome;

/// Default filter installed when a create carries none: match-all, open
/// gate, baseline precedence.
const DEFAULT_APP_FILTER: &str = "ip:any:any:allow:100";

/// Control client for the PFCP peer simulator
#[derive(Parser, Debug)]
#[command(name = "pfcpctl")]
#[command(author = "NextGCore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drive a running pfcpsimd instance", long_about = None)]
struct Args {
    /// pfcpsimd control API endpoint
    #[arg(short = 's', long, default_value = "127.0.0.1:54321", global = true)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configure the remote peer and local N3 addresses
    Configure {
        /// Remote PFCP peer address (ip or ip:port)
        #[arg(long)]
        remote_peer_addr: String,
        /// Local N3 address advertised in uplink rules
        #[arg(long)]
        n3_addr: String,
    },
    /// Set up the PFCP association
    Associate,
    /// Tear down the PFCP association
    Disassociate,
    /// Bulk session operations
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Establish count sessions starting at base-id
    Create {
        #[arg(long)]
        base_id: u64,
        #[arg(long)]
        count: u64,
        /// UE address pool CIDR, e.g. 10.1.0.0/24
        #[arg(long)]
        ue_pool: String,
        /// QoS flow identifier
        #[arg(long, default_value = "0")]
        qfi: u8,
        /// Application filter, repeatable:
        /// proto:cidr:ports:action[:precedence]
        #[arg(long = "app-filter")]
        app_filters: Vec<String>,
    },
    /// Rebuild the downlink FARs of count sessions starting at base-id
    Modify {
        #[arg(long)]
        base_id: u64,
        #[arg(long)]
        count: u64,
        /// Downlink node address for the rebuilt FARs
        #[arg(long)]
        node_b_addr: String,
        /// Buffer downlink traffic
        #[arg(long)]
        buffer: bool,
        /// Notify the control plane about buffered traffic
        #[arg(long)]
        notify_cp: bool,
        /// Application filter, repeatable; should match the create call
        #[arg(long = "app-filter")]
        app_filters: Vec<String>,
    },
    /// Delete count sessions starting at base-id
    Delete {
        #[arg(long)]
        base_id: u64,
        #[arg(long)]
        count: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let outcome = match args.command {
        Command::Configure {
            remote_peer_addr,
            n3_addr,
        } => {
            post(
                &args.server,
                "/v1/configure",
                &ConfigureRequest {
                    remote_peer_addr,
                    n3_addr,
                },
            )
            .await?
        }
        Command::Associate => post(&args.server, "/v1/associate", &()).await?,
        Command::Disassociate => post(&args.server, "/v1/disassociate", &()).await?,
        Command::Session(SessionCommand::Create {
            base_id,
            count,
            ue_pool,
            qfi,
            mut app_filters,
        }) => {
            if app_filters.is_empty() {
                app_filters.push(DEFAULT_APP_FILTER.to_string());
            }
            post(
                &args.server,
                "/v1/sessions/create",
                &CreateSessionRequest {
                    base_id,
                    count,
                    ue_address_pool: ue_pool,
                    qfi,
                    app_filters,
                },
            )
            .await?
        }
        Command::Session(SessionCommand::Modify {
            base_id,
            count,
            node_b_addr,
            buffer,
            notify_cp,
            mut app_filters,
        }) => {
            if app_filters.is_empty() {
                app_filters.push(DEFAULT_APP_FILTER.to_string());
            }
            post(
                &args.server,
                "/v1/sessions/modify",
                &ModifySessionRequest {
                    base_id,
                    count,
                    node_b_addr,
                    buffer,
                    notify_cp,
                    app_filters,
                },
            )
            .await?
        }
        Command::Session(SessionCommand::Delete { base_id, count }) => {
            post(
                &args.server,
                "/v1/sessions/delete",
                &DeleteSessionRequest { base_id, count },
            )
            .await?
        }
    };

    println!("[{}] {}", outcome.status, outcome.message);
    if !outcome.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}

/// One JSON POST to the daemon.
async fn post<T: Serialize>(server: &str, path: &str, body: &T) -> Result<CommandOutcome> {
    let stream = TcpStream::connect(server)
        .await
        .with_context(|| format!("could not connect to {}", server))?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .context("HTTP handshake failed")?;
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let payload = serde_json::to_vec(body).context("could not encode request")?;
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(hyper::header::HOST, server)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(payload)))
        .context("could not build request")?;

    let response = sender
        .send_request(request)
        .await
        .context("request failed")?;
    if response.status() != hyper::StatusCode::OK {
        anyhow::bail!("server answered {}", response.status());
    }

    let body = response
        .into_body()
        .collect()
        .await
        .context("could not read response")?
        .to_bytes();
    serde_json::from_slice(&body).context("could not decode response")
}
