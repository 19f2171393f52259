//! PFCP message header (TS 29.244 Section 7.2).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PfcpError, PfcpResult};

/// PFCP protocol version carried in every header.
pub const PFCP_VERSION: u8 = 1;

/// Header length without SEID (8 bytes).
pub const PFCP_HEADER_LEN: usize = 8;

/// Header length with SEID (16 bytes).
pub const PFCP_HEADER_LEN_WITH_SEID: usize = 16;

/// Message types exchanged between a CP peer and a UP function.
///
/// Node messages (1..=10) travel without a SEID; session messages
/// (50..=55) carry the peer's SEID in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PfcpMessageType {
    HeartbeatRequest = 1,
    HeartbeatResponse = 2,
    AssociationSetupRequest = 5,
    AssociationSetupResponse = 6,
    AssociationReleaseRequest = 9,
    AssociationReleaseResponse = 10,
    SessionEstablishmentRequest = 50,
    SessionEstablishmentResponse = 51,
    SessionModificationRequest = 52,
    SessionModificationResponse = 53,
    SessionDeletionRequest = 54,
    SessionDeletionResponse = 55,
}

impl TryFrom<u8> for PfcpMessageType {
    type Error = PfcpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::HeartbeatRequest),
            2 => Ok(Self::HeartbeatResponse),
            5 => Ok(Self::AssociationSetupRequest),
            6 => Ok(Self::AssociationSetupResponse),
            9 => Ok(Self::AssociationReleaseRequest),
            10 => Ok(Self::AssociationReleaseResponse),
            50 => Ok(Self::SessionEstablishmentRequest),
            51 => Ok(Self::SessionEstablishmentResponse),
            52 => Ok(Self::SessionModificationRequest),
            53 => Ok(Self::SessionModificationResponse),
            54 => Ok(Self::SessionDeletionRequest),
            55 => Ok(Self::SessionDeletionResponse),
            _ => Err(PfcpError::InvalidMessageType(value)),
        }
    }
}

impl PfcpMessageType {
    /// Whether this message type carries a SEID in its header.
    pub fn has_seid(&self) -> bool {
        *self as u8 >= 50
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HeartbeatRequest => "Heartbeat Request",
            Self::HeartbeatResponse => "Heartbeat Response",
            Self::AssociationSetupRequest => "Association Setup Request",
            Self::AssociationSetupResponse => "Association Setup Response",
            Self::AssociationReleaseRequest => "Association Release Request",
            Self::AssociationReleaseResponse => "Association Release Response",
            Self::SessionEstablishmentRequest => "Session Establishment Request",
            Self::SessionEstablishmentResponse => "Session Establishment Response",
            Self::SessionModificationRequest => "Session Modification Request",
            Self::SessionModificationResponse => "Session Modification Response",
            Self::SessionDeletionRequest => "Session Deletion Request",
            Self::SessionDeletionResponse => "Session Deletion Response",
        }
    }
}

/// PFCP header.
///
/// The length field counts everything after the first 4 bytes; the
/// sequence number occupies 3 bytes followed by a spare octet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PfcpHeader {
    pub version: u8,
    pub message_type: PfcpMessageType,
    /// Message length excluding the first 4 header bytes
    pub length: u16,
    /// Present only for session-scoped messages
    pub seid: Option<u64>,
    pub sequence_number: u32,
}

impl PfcpHeader {
    /// Header for a node-scoped message (no SEID).
    pub fn new(message_type: PfcpMessageType, sequence_number: u32) -> Self {
        Self {
            version: PFCP_VERSION,
            message_type,
            length: 0,
            seid: None,
            sequence_number,
        }
    }

    /// Header for a session-scoped message.
    pub fn new_with_seid(message_type: PfcpMessageType, seid: u64, sequence_number: u32) -> Self {
        Self {
            version: PFCP_VERSION,
            message_type,
            length: 0,
            seid: Some(seid),
            sequence_number,
        }
    }

    pub fn header_len(&self) -> usize {
        if self.seid.is_some() {
            PFCP_HEADER_LEN_WITH_SEID
        } else {
            PFCP_HEADER_LEN
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        // version (3 bits) | spare (2) | FO | MP | S
        let first = ((self.version & 0x07) << 5) | self.seid.is_some() as u8;
        buf.put_u8(first);
        buf.put_u8(self.message_type as u8);
        buf.put_u16(self.length);
        if let Some(seid) = self.seid {
            buf.put_u64(seid);
        }
        let seq = self.sequence_number.to_be_bytes();
        buf.put_slice(&seq[1..4]);
        buf.put_u8(0); // spare
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 4 {
            return Err(PfcpError::BufferTooShort {
                needed: 4,
                available: buf.remaining(),
            });
        }

        let first = buf.get_u8();
        let version = (first >> 5) & 0x07;
        let seid_present = first & 0x01 != 0;

        if version != PFCP_VERSION {
            return Err(PfcpError::VersionNotSupported(version));
        }

        let message_type = PfcpMessageType::try_from(buf.get_u8())?;
        let length = buf.get_u16();

        let rest = if seid_present { 12 } else { 4 };
        if buf.remaining() < rest {
            return Err(PfcpError::BufferTooShort {
                needed: rest,
                available: buf.remaining(),
            });
        }

        let seid = if seid_present { Some(buf.get_u64()) } else { None };

        let mut seq = [0u8; 4];
        buf.copy_to_slice(&mut seq[1..4]);
        let sequence_number = u32::from_be_bytes(seq);
        buf.advance(1); // spare

        Ok(Self {
            version,
            message_type,
            length,
            seid,
            sequence_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip_no_seid() {
        let header = PfcpHeader::new(PfcpMessageType::HeartbeatRequest, 12345);
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), PFCP_HEADER_LEN);

        let mut bytes = buf.freeze();
        let decoded = PfcpHeader::decode(&mut bytes).unwrap();
        assert_eq!(decoded.message_type, PfcpMessageType::HeartbeatRequest);
        assert_eq!(decoded.sequence_number, 12345);
        assert!(decoded.seid.is_none());
    }

    #[test]
    fn test_header_round_trip_with_seid() {
        let header = PfcpHeader::new_with_seid(
            PfcpMessageType::SessionEstablishmentRequest,
            0x1122334455667788,
            0xABCDEF,
        );
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), PFCP_HEADER_LEN_WITH_SEID);

        let mut bytes = buf.freeze();
        let decoded = PfcpHeader::decode(&mut bytes).unwrap();
        assert_eq!(decoded.seid, Some(0x1122334455667788));
        assert_eq!(decoded.sequence_number, 0xABCDEF);
    }

    #[test]
    fn test_session_types_carry_seid() {
        assert!(!PfcpMessageType::HeartbeatRequest.has_seid());
        assert!(!PfcpMessageType::AssociationSetupRequest.has_seid());
        assert!(PfcpMessageType::SessionEstablishmentRequest.has_seid());
        assert!(PfcpMessageType::SessionDeletionResponse.has_seid());
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        assert!(matches!(
            PfcpMessageType::try_from(42),
            Err(PfcpError::InvalidMessageType(42))
        ));
    }
}
