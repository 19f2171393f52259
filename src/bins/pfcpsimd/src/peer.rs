//! PFCP transport to the remote peer.
//!
//! One UDP socket per association, one request/response exchange in flight
//! at a time, matched by sequence number. A missing reply times out after
//! [`RESPONSE_TIMEOUT`] and surfaces as a transport failure; a reply with
//! a non-accept cause surfaces as a peer rejection. Exchanges are never
//! retried here.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::timeout;

use pfcp::message::{
    build_message, parse_message, AssociationReleaseRequest, AssociationSetupRequest,
    HeartbeatResponse, PfcpMessage, SessionDeletionRequest, SessionEstablishmentRequest,
    SessionModificationRequest,
};
use pfcp::types::{FSeid, NodeId, UpdateFar};
use pfcp::{PfcpError, PFCP_UDP_PORT};

use crate::error::{SimError, SimResult};
use crate::rules::SessionRuleSet;

/// How long one exchange may wait for the peer's reply.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_PFCP_DATAGRAM: usize = 8192;

/// Where the peer lives and how we identify ourselves to it.
#[derive(Debug, Clone, Copy)]
struct PeerTarget {
    remote: SocketAddr,
    node_addr: Ipv4Addr,
}

/// Live transport state, present only while connected.
struct PeerIo {
    socket: UdpSocket,
    next_seq: u32,
    recovery_time_stamp: u32,
}

/// Async PFCP client owning the transport lifecycle end to end.
pub struct PfcpPeer {
    target: std::sync::RwLock<Option<PeerTarget>>,
    io: Mutex<Option<PeerIo>>,
}

impl PfcpPeer {
    pub fn new() -> Self {
        Self {
            target: std::sync::RwLock::new(None),
            io: Mutex::new(None),
        }
    }

    /// Records the remote endpoint and the local node address advertised
    /// in every message. Called at configure time, before any connect.
    pub fn set_target(&self, remote: SocketAddr, node_addr: Ipv4Addr) {
        *self.target.write().expect("peer target lock poisoned") = Some(PeerTarget {
            remote,
            node_addr,
        });
    }

    fn target(&self) -> SimResult<PeerTarget> {
        self.target
            .read()
            .expect("peer target lock poisoned")
            .ok_or(SimError::NotConfigured)
    }

    fn node_id(&self) -> SimResult<NodeId> {
        Ok(NodeId::Ipv4(self.target()?.node_addr.octets()))
    }

    pub async fn is_connected(&self) -> bool {
        self.io.lock().await.is_some()
    }

    /// Opens the UDP socket toward the configured peer. A no-op if a
    /// connection already exists, so re-associating never leaks sockets.
    pub async fn connect(&self) -> SimResult<()> {
        let target = self.target()?;
        let mut io = self.io.lock().await;
        if io.is_some() {
            return Ok(());
        }

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(target.remote).await?;
        log::info!(
            "PFCP transport open: {} -> {}",
            socket.local_addr()?,
            target.remote
        );

        let recovery_time_stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        *io = Some(PeerIo {
            socket,
            next_seq: 1,
            recovery_time_stamp,
        });
        Ok(())
    }

    /// Drops the socket. Best effort; the association state is the
    /// caller's concern.
    pub async fn disconnect(&self) {
        let mut io = self.io.lock().await;
        if io.take().is_some() {
            log::info!("PFCP transport closed");
        }
    }

    /// Runs the Association Setup exchange.
    pub async fn setup_association(&self) -> SimResult<()> {
        let node_id = self.node_id()?;
        let recovery = {
            let io = self.io.lock().await;
            io.as_ref().map(|io| io.recovery_time_stamp)
        }
        .ok_or_else(not_connected)?;

        let request = PfcpMessage::AssociationSetupRequest(AssociationSetupRequest::new(
            node_id, recovery,
        ));

        match self.transact(&request, None).await? {
            PfcpMessage::AssociationSetupResponse(resp) if resp.cause.is_success() => Ok(()),
            PfcpMessage::AssociationSetupResponse(resp) => Err(SimError::PeerRejected {
                operation: "association setup",
                cause: resp.cause.name(),
            }),
            _ => Err(SimError::UnexpectedReply("association setup")),
        }
    }

    /// Runs the Association Release exchange.
    pub async fn teardown_association(&self) -> SimResult<()> {
        let node_id = self.node_id()?;
        let request =
            PfcpMessage::AssociationReleaseRequest(AssociationReleaseRequest::new(node_id));

        match self.transact(&request, None).await? {
            PfcpMessage::AssociationReleaseResponse(resp) if resp.cause.is_success() => Ok(()),
            PfcpMessage::AssociationReleaseResponse(resp) => Err(SimError::PeerRejected {
                operation: "association release",
                cause: resp.cause.name(),
            }),
            _ => Err(SimError::UnexpectedReply("association release")),
        }
    }

    /// Establishes one session; returns the SEID the peer assigned.
    pub async fn establish_session(
        &self,
        local_seid: u64,
        rules: SessionRuleSet,
    ) -> SimResult<u64> {
        let target = self.target()?;
        let mut request = SessionEstablishmentRequest::new(
            NodeId::Ipv4(target.node_addr.octets()),
            FSeid::new_ipv4(local_seid, target.node_addr.octets()),
        );
        request.create_pdrs = rules.pdrs;
        request.create_fars = rules.fars;
        request.create_qers = rules.qers;

        // SEID 0 in the header: the peer has not assigned one yet
        let reply = self
            .transact(&PfcpMessage::SessionEstablishmentRequest(request), Some(0))
            .await?;

        match reply {
            PfcpMessage::SessionEstablishmentResponse(resp) if resp.cause.is_success() => resp
                .up_f_seid
                .map(|fseid| fseid.seid)
                .ok_or(SimError::Protocol(PfcpError::MissingMandatoryIe("UP F-SEID"))),
            PfcpMessage::SessionEstablishmentResponse(resp) => Err(SimError::PeerRejected {
                operation: "session establishment",
                cause: resp.cause.name(),
            }),
            _ => Err(SimError::UnexpectedReply("session establishment")),
        }
    }

    /// Applies FAR updates to an established session.
    pub async fn modify_session(
        &self,
        peer_seid: u64,
        update_fars: Vec<UpdateFar>,
    ) -> SimResult<()> {
        let mut request = SessionModificationRequest::new();
        request.update_fars = update_fars;

        let reply = self
            .transact(
                &PfcpMessage::SessionModificationRequest(request),
                Some(peer_seid),
            )
            .await?;

        match reply {
            PfcpMessage::SessionModificationResponse(resp) if resp.cause.is_success() => Ok(()),
            PfcpMessage::SessionModificationResponse(resp) => Err(SimError::PeerRejected {
                operation: "session modification",
                cause: resp.cause.name(),
            }),
            _ => Err(SimError::UnexpectedReply("session modification")),
        }
    }

    /// Tears down an established session.
    pub async fn delete_session(&self, peer_seid: u64) -> SimResult<()> {
        let reply = self
            .transact(
                &PfcpMessage::SessionDeletionRequest(SessionDeletionRequest::new()),
                Some(peer_seid),
            )
            .await?;

        match reply {
            PfcpMessage::SessionDeletionResponse(resp) if resp.cause.is_success() => Ok(()),
            PfcpMessage::SessionDeletionResponse(resp) => Err(SimError::PeerRejected {
                operation: "session deletion",
                cause: resp.cause.name(),
            }),
            _ => Err(SimError::UnexpectedReply("session deletion")),
        }
    }

    /// One request/response exchange.
    ///
    /// Replies are matched on sequence number. Heartbeat requests from the
    /// peer are answered inline so a probing UPF never stalls a bulk run;
    /// anything else with a stale sequence number is dropped.
    async fn transact(&self, request: &PfcpMessage, seid: Option<u64>) -> SimResult<PfcpMessage> {
        let mut io_guard = self.io.lock().await;
        let io = io_guard.as_mut().ok_or_else(not_connected)?;

        let seq = io.next_seq;
        io.next_seq = (io.next_seq + 1) & 0x00FF_FFFF; // 24-bit field

        let buf = build_message(request, seq, seid);
        io.socket.send(&buf).await?;
        log::debug!(
            "sent {} ({} bytes, seq {})",
            request.message_type().name(),
            buf.len(),
            seq
        );

        let mut recv_buf = vec![0u8; MAX_PFCP_DATAGRAM];
        let reply = timeout(RESPONSE_TIMEOUT, async {
            loop {
                let len = io.socket.recv(&mut recv_buf).await?;
                let mut bytes = Bytes::copy_from_slice(&recv_buf[..len]);
                let (header, message) = match parse_message(&mut bytes) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        log::warn!("dropping malformed datagram: {}", e);
                        continue;
                    }
                };

                match message {
                    PfcpMessage::HeartbeatRequest(_) => {
                        let pong = PfcpMessage::HeartbeatResponse(HeartbeatResponse::new(
                            io.recovery_time_stamp,
                        ));
                        let pong_buf = build_message(&pong, header.sequence_number, None);
                        io.socket.send(&pong_buf).await?;
                    }
                    _ if header.sequence_number != seq => {
                        log::debug!(
                            "dropping {} with stale seq {} (expected {})",
                            header.message_type.name(),
                            header.sequence_number,
                            seq
                        );
                    }
                    message => return Ok::<_, SimError>(message),
                }
            }
        })
        .await
        .map_err(|_| {
            SimError::Transport(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no reply to {} within {:?}", request.message_type().name(), RESPONSE_TIMEOUT),
            ))
        })??;

        log::debug!("received {} (seq {})", reply.message_type().name(), seq);
        Ok(reply)
    }
}

impl Default for PfcpPeer {
    fn default() -> Self {
        Self::new()
    }
}

fn not_connected() -> SimError {
    SimError::Transport(io::Error::new(
        io::ErrorKind::NotConnected,
        "no transport connection to the remote peer",
    ))
}

/// Parses an operator-supplied peer address, accepting a bare IP (the
/// default PFCP port is appended) or an explicit `ip:port`.
pub fn parse_peer_addr(addr: &str) -> SimResult<SocketAddr> {
    if let Ok(sockaddr) = addr.parse::<SocketAddr>() {
        return Ok(sockaddr);
    }
    addr.parse::<std::net::IpAddr>()
        .map(|ip| SocketAddr::new(ip, PFCP_UDP_PORT))
        .map_err(|_| SimError::InvalidAddress(addr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_peer_addr_forms() {
        assert_eq!(
            parse_peer_addr("10.0.0.1").unwrap(),
            "10.0.0.1:8805".parse().unwrap()
        );
        assert_eq!(
            parse_peer_addr("10.0.0.1:9805").unwrap(),
            "10.0.0.1:9805".parse().unwrap()
        );
        assert!(matches!(
            parse_peer_addr("upf.invalid"),
            Err(SimError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_without_connect_fails() {
        let peer = PfcpPeer::new();
        peer.set_target(
            "127.0.0.1:8805".parse().unwrap(),
            Ipv4Addr::new(127, 0, 0, 1),
        );
        let err = peer.setup_association().await.unwrap_err();
        assert!(matches!(err, SimError::Transport(_)));
    }

    #[tokio::test]
    async fn test_connect_requires_target() {
        let peer = PfcpPeer::new();
        assert!(matches!(
            peer.connect().await,
            Err(SimError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let peer = PfcpPeer::new();
        peer.set_target(
            "127.0.0.1:8805".parse().unwrap(),
            Ipv4Addr::new(127, 0, 0, 1),
        );
        peer.connect().await.unwrap();
        assert!(peer.is_connected().await);
        peer.connect().await.unwrap();
        assert!(peer.is_connected().await);
        peer.disconnect().await;
        assert!(!peer.is_connected().await);
    }
}
