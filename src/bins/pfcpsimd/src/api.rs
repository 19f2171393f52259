//! HTTP control API.
//!
//! Thin JSON adapter over the control service; the engine never sees the
//! transport. Six POST routes, one per command, each answering 200 with a
//! `{status, message}` body whose status carries the real outcome.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::context::SimContext;
use crate::service::{status, CommandOutcome, ControlService};

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigureRequest {
    pub remote_peer_addr: String,
    pub n3_addr: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub base_id: u64,
    pub count: u64,
    pub ue_address_pool: String,
    #[serde(default)]
    pub qfi: u8,
    #[serde(default)]
    pub app_filters: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModifySessionRequest {
    pub base_id: u64,
    pub count: u64,
    pub node_b_addr: String,
    #[serde(default)]
    pub buffer: bool,
    #[serde(default)]
    pub notify_cp: bool,
    #[serde(default)]
    pub app_filters: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteSessionRequest {
    pub base_id: u64,
    pub count: u64,
}

/// Serves the control API until the process exits.
pub async fn serve(ctx: Arc<SimContext>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("control API listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(ctx.clone(), req));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                log::debug!("connection from {} ended: {}", peer_addr, e);
            }
        });
    }
}

async fn handle_request(
    ctx: Arc<SimContext>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Ok(outcome_response(&CommandOutcome {
                status: status::ABORTED,
                message: format!("could not read request body: {}", e),
            }));
        }
    };

    if parts.method != Method::POST {
        return Ok(not_found());
    }

    let outcome = match parts.uri.path() {
        "/v1/configure" => match parse_body::<ConfigureRequest>(&body) {
            Ok(req) => {
                ControlService::configure(ctx.as_ref(), &req.remote_peer_addr, &req.n3_addr).await
            }
            Err(outcome) => outcome,
        },
        "/v1/associate" => ControlService::associate(ctx.as_ref()).await,
        "/v1/disassociate" => ControlService::disassociate(ctx.as_ref()).await,
        "/v1/sessions/create" => match parse_body::<CreateSessionRequest>(&body) {
            Ok(req) => {
                ctx.create_session(
                    req.base_id,
                    req.count,
                    &req.ue_address_pool,
                    req.qfi,
                    &req.app_filters,
                )
                .await
            }
            Err(outcome) => outcome,
        },
        "/v1/sessions/modify" => match parse_body::<ModifySessionRequest>(&body) {
            Ok(req) => {
                ctx.modify_session(
                    req.base_id,
                    req.count,
                    &req.node_b_addr,
                    req.buffer,
                    req.notify_cp,
                    &req.app_filters,
                )
                .await
            }
            Err(outcome) => outcome,
        },
        "/v1/sessions/delete" => match parse_body::<DeleteSessionRequest>(&body) {
            Ok(req) => ctx.delete_session(req.base_id, req.count).await,
            Err(outcome) => outcome,
        },
        path => {
            log::warn!("unknown control endpoint: POST {}", path);
            return Ok(not_found());
        }
    };

    Ok(outcome_response(&outcome))
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &Bytes) -> Result<T, CommandOutcome> {
    serde_json::from_slice(body).map_err(|e| CommandOutcome {
        status: status::ABORTED,
        message: format!("invalid request body: {}", e),
    })
}

fn outcome_response(outcome: &CommandOutcome) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(outcome).unwrap_or_default();
    Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .expect("static response parts")
}

fn not_found() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new(Bytes::from_static(b"unknown endpoint")))
        .expect("static response parts")
}
