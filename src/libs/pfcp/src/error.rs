//! PFCP codec error types.

use thiserror::Error;

/// Errors raised while encoding or decoding PFCP messages.
#[derive(Debug, Error)]
pub enum PfcpError {
    /// Buffer ended before a complete field could be read
    #[error("buffer too short: needed {needed} bytes, available {available}")]
    BufferTooShort { needed: usize, available: usize },

    /// Unknown or unsupported message type octet
    #[error("invalid message type: {0}")]
    InvalidMessageType(u8),

    /// Unknown cause value
    #[error("invalid cause value: {0}")]
    InvalidCause(u8),

    /// Unknown node ID type
    #[error("invalid node ID type: {0}")]
    InvalidNodeIdType(u8),

    /// Interface value outside the TS 29.244 range
    #[error("invalid interface type: {0}")]
    InvalidInterfaceType(u8),

    /// A grouped IE is missing a mandatory member
    #[error("missing mandatory IE: {0}")]
    MissingMandatoryIe(&'static str),

    /// Header carried an unsupported protocol version
    #[error("PFCP version not supported: {0}")]
    VersionNotSupported(u8),
}

pub type PfcpResult<T> = Result<T, PfcpError>;
