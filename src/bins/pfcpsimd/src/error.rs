//! Engine error taxonomy.
//!
//! Precondition and caller-input errors are recoverable by issuing the
//! right prior command or fixing the request; transport and protocol
//! errors mean the peer or the network misbehaved mid-exchange. The
//! control facade maps the former to an aborted status and the latter to
//! an internal status. Nothing here is retried.

use thiserror::Error;

/// Errors surfaced by the session simulation engine.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("server is not configured")]
    NotConfigured,

    #[error("server is not associated")]
    NotAssociated,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid application filter '{filter}': {reason}")]
    InvalidFilterSyntax { filter: String, reason: String },

    #[error("could not parse UE address pool '{0}'")]
    AddressPoolParse(String),

    #[error("too many application filters: {count} provided, {max} supported")]
    TooManyFilters { count: usize, max: usize },

    #[error("not enough sessions: {available} active, {requested} requested")]
    NotEnoughSessions { available: usize, requested: usize },

    #[error("could not retrieve session with key {0}; check the base id")]
    SessionNotFound(u64),

    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("peer rejected {operation}: {cause}")]
    PeerRejected {
        operation: &'static str,
        cause: &'static str,
    },

    #[error("unexpected reply to {0}")]
    UnexpectedReply(&'static str),

    #[error("protocol error: {0}")]
    Protocol(#[from] pfcp::PfcpError),
}

impl SimError {
    /// Whether this error was caused by the remote peer or the network
    /// rather than by the caller's request or the engine's state.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::PeerRejected { .. } | Self::UnexpectedReply(_) | Self::Protocol(_)
        )
    }
}

pub type SimResult<T> = Result<T, SimError>;
