//! PFCP messages: typed request/response bodies plus framing helpers.
//!
//! [`build_message`] prepends the header to an encoded body and fixes up
//! the length field; [`parse_message`] is its inverse. Decoders skip IEs
//! they do not recognize.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PfcpError, PfcpResult};
use crate::header::{PfcpHeader, PfcpMessageType};
use crate::ie::{encode_grouped_ie, encode_u32_ie, encode_u8_ie, IeHeader, IeType, RawIe};
use crate::types::{
    CreateFar, CreatePdr, CreateQer, FSeid, NodeId, PfcpCause, UpdateFar,
};

/// Heartbeat Request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatRequest {
    pub recovery_time_stamp: u32,
}

impl HeartbeatRequest {
    pub fn new(recovery_time_stamp: u32) -> Self {
        Self {
            recovery_time_stamp,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u32_ie(buf, IeType::RecoveryTimeStamp, self.recovery_time_stamp);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut recovery_time_stamp = 0u32;
        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            if ie.ie_type == IeType::RecoveryTimeStamp as u16 && ie.data.len() >= 4 {
                let mut data = ie.data;
                recovery_time_stamp = data.get_u32();
            }
        }
        Ok(Self {
            recovery_time_stamp,
        })
    }
}

/// Heartbeat Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatResponse {
    pub recovery_time_stamp: u32,
}

impl HeartbeatResponse {
    pub fn new(recovery_time_stamp: u32) -> Self {
        Self {
            recovery_time_stamp,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u32_ie(buf, IeType::RecoveryTimeStamp, self.recovery_time_stamp);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let req = HeartbeatRequest::decode(buf)?;
        Ok(Self {
            recovery_time_stamp: req.recovery_time_stamp,
        })
    }
}

/// Association Setup Request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSetupRequest {
    pub node_id: NodeId,
    pub recovery_time_stamp: u32,
}

impl AssociationSetupRequest {
    pub fn new(node_id: NodeId, recovery_time_stamp: u32) -> Self {
        Self {
            node_id,
            recovery_time_stamp,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_grouped_ie(buf, IeType::NodeId, |b| self.node_id.encode(b));
        encode_u32_ie(buf, IeType::RecoveryTimeStamp, self.recovery_time_stamp);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut node_id = None;
        let mut recovery_time_stamp = 0u32;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::NodeId as u16 => {
                    let mut data = ie.data;
                    node_id = Some(NodeId::decode(&mut data)?);
                }
                t if t == IeType::RecoveryTimeStamp as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        recovery_time_stamp = data.get_u32();
                    }
                }
                _ => {}
            }
        }

        let node_id = node_id.ok_or(PfcpError::MissingMandatoryIe("Node ID"))?;
        Ok(Self {
            node_id,
            recovery_time_stamp,
        })
    }
}

/// Association Setup Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSetupResponse {
    pub node_id: NodeId,
    pub cause: PfcpCause,
    pub recovery_time_stamp: u32,
}

impl AssociationSetupResponse {
    pub fn new(node_id: NodeId, cause: PfcpCause, recovery_time_stamp: u32) -> Self {
        Self {
            node_id,
            cause,
            recovery_time_stamp,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_grouped_ie(buf, IeType::NodeId, |b| self.node_id.encode(b));
        encode_u8_ie(buf, IeType::Cause, self.cause as u8);
        encode_u32_ie(buf, IeType::RecoveryTimeStamp, self.recovery_time_stamp);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut node_id = None;
        let mut cause = PfcpCause::RequestAccepted;
        let mut recovery_time_stamp = 0u32;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::NodeId as u16 => {
                    let mut data = ie.data;
                    node_id = Some(NodeId::decode(&mut data)?);
                }
                t if t == IeType::Cause as u16 => {
                    if !ie.data.is_empty() {
                        cause = PfcpCause::try_from(ie.data[0])?;
                    }
                }
                t if t == IeType::RecoveryTimeStamp as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        recovery_time_stamp = data.get_u32();
                    }
                }
                _ => {}
            }
        }

        let node_id = node_id.ok_or(PfcpError::MissingMandatoryIe("Node ID"))?;
        Ok(Self {
            node_id,
            cause,
            recovery_time_stamp,
        })
    }
}

/// Association Release Request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationReleaseRequest {
    pub node_id: NodeId,
}

impl AssociationReleaseRequest {
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_grouped_ie(buf, IeType::NodeId, |b| self.node_id.encode(b));
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut node_id = None;
        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            if ie.ie_type == IeType::NodeId as u16 {
                let mut data = ie.data;
                node_id = Some(NodeId::decode(&mut data)?);
            }
        }
        let node_id = node_id.ok_or(PfcpError::MissingMandatoryIe("Node ID"))?;
        Ok(Self { node_id })
    }
}

/// Association Release Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationReleaseResponse {
    pub node_id: NodeId,
    pub cause: PfcpCause,
}

impl AssociationReleaseResponse {
    pub fn new(node_id: NodeId, cause: PfcpCause) -> Self {
        Self { node_id, cause }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_grouped_ie(buf, IeType::NodeId, |b| self.node_id.encode(b));
        encode_u8_ie(buf, IeType::Cause, self.cause as u8);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut node_id = None;
        let mut cause = PfcpCause::RequestAccepted;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::NodeId as u16 => {
                    let mut data = ie.data;
                    node_id = Some(NodeId::decode(&mut data)?);
                }
                t if t == IeType::Cause as u16 => {
                    if !ie.data.is_empty() {
                        cause = PfcpCause::try_from(ie.data[0])?;
                    }
                }
                _ => {}
            }
        }

        let node_id = node_id.ok_or(PfcpError::MissingMandatoryIe("Node ID"))?;
        Ok(Self { node_id, cause })
    }
}

/// Session Establishment Request (TS 29.244 Section 7.5.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEstablishmentRequest {
    pub node_id: NodeId,
    pub cp_f_seid: FSeid,
    pub create_pdrs: Vec<CreatePdr>,
    pub create_fars: Vec<CreateFar>,
    pub create_qers: Vec<CreateQer>,
}

impl SessionEstablishmentRequest {
    pub fn new(node_id: NodeId, cp_f_seid: FSeid) -> Self {
        Self {
            node_id,
            cp_f_seid,
            create_pdrs: Vec::new(),
            create_fars: Vec::new(),
            create_qers: Vec::new(),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_grouped_ie(buf, IeType::NodeId, |b| self.node_id.encode(b));
        encode_grouped_ie(buf, IeType::FSeid, |b| self.cp_f_seid.encode(b));
        for pdr in &self.create_pdrs {
            encode_grouped_ie(buf, IeType::CreatePdr, |b| pdr.encode(b));
        }
        for far in &self.create_fars {
            encode_grouped_ie(buf, IeType::CreateFar, |b| far.encode(b));
        }
        for qer in &self.create_qers {
            encode_grouped_ie(buf, IeType::CreateQer, |b| qer.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut node_id = None;
        let mut cp_f_seid = None;
        let mut create_pdrs = Vec::new();
        let mut create_fars = Vec::new();
        let mut create_qers = Vec::new();

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::NodeId as u16 => {
                    let mut data = ie.data;
                    node_id = Some(NodeId::decode(&mut data)?);
                }
                t if t == IeType::FSeid as u16 => {
                    let mut data = ie.data;
                    cp_f_seid = Some(FSeid::decode(&mut data)?);
                }
                t if t == IeType::CreatePdr as u16 => {
                    let mut data = ie.data;
                    create_pdrs.push(CreatePdr::decode(&mut data)?);
                }
                t if t == IeType::CreateFar as u16 => {
                    let mut data = ie.data;
                    create_fars.push(CreateFar::decode(&mut data)?);
                }
                t if t == IeType::CreateQer as u16 => {
                    let mut data = ie.data;
                    create_qers.push(CreateQer::decode(&mut data)?);
                }
                _ => {}
            }
        }

        let node_id = node_id.ok_or(PfcpError::MissingMandatoryIe("Node ID"))?;
        let cp_f_seid = cp_f_seid.ok_or(PfcpError::MissingMandatoryIe("CP F-SEID"))?;

        Ok(Self {
            node_id,
            cp_f_seid,
            create_pdrs,
            create_fars,
            create_qers,
        })
    }
}

/// Session Establishment Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEstablishmentResponse {
    pub node_id: Option<NodeId>,
    pub cause: PfcpCause,
    pub up_f_seid: Option<FSeid>,
}

impl SessionEstablishmentResponse {
    pub fn new(cause: PfcpCause) -> Self {
        Self {
            node_id: None,
            cause,
            up_f_seid: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        if let Some(node_id) = &self.node_id {
            encode_grouped_ie(buf, IeType::NodeId, |b| node_id.encode(b));
        }
        encode_u8_ie(buf, IeType::Cause, self.cause as u8);
        if let Some(fseid) = &self.up_f_seid {
            encode_grouped_ie(buf, IeType::FSeid, |b| fseid.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut node_id = None;
        let mut cause = PfcpCause::RequestAccepted;
        let mut up_f_seid = None;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::NodeId as u16 => {
                    let mut data = ie.data;
                    node_id = Some(NodeId::decode(&mut data)?);
                }
                t if t == IeType::Cause as u16 => {
                    if !ie.data.is_empty() {
                        cause = PfcpCause::try_from(ie.data[0])?;
                    }
                }
                t if t == IeType::FSeid as u16 => {
                    let mut data = ie.data;
                    up_f_seid = Some(FSeid::decode(&mut data)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            node_id,
            cause,
            up_f_seid,
        })
    }
}

/// Session Modification Request (TS 29.244 Section 7.5.4). The simulator
/// only ever updates FARs in place, so that is all this body carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionModificationRequest {
    pub update_fars: Vec<UpdateFar>,
}

impl SessionModificationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        for far in &self.update_fars {
            encode_grouped_ie(buf, IeType::UpdateFar, |b| far.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut update_fars = Vec::new();
        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            if ie.ie_type == IeType::UpdateFar as u16 {
                let mut data = ie.data;
                update_fars.push(UpdateFar::decode(&mut data)?);
            }
        }
        Ok(Self { update_fars })
    }
}

/// Session Modification Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionModificationResponse {
    pub cause: PfcpCause,
}

impl SessionModificationResponse {
    pub fn new(cause: PfcpCause) -> Self {
        Self { cause }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u8_ie(buf, IeType::Cause, self.cause as u8);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut cause = PfcpCause::RequestAccepted;
        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            if ie.ie_type == IeType::Cause as u16 && !ie.data.is_empty() {
                cause = PfcpCause::try_from(ie.data[0])?;
            }
        }
        Ok(Self { cause })
    }
}

/// Session Deletion Request: no body, the header SEID names the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionDeletionRequest {}

impl SessionDeletionRequest {
    pub fn new() -> Self {
        Self {}
    }

    pub fn encode(&self, _buf: &mut BytesMut) {}

    pub fn decode(_buf: &mut Bytes) -> PfcpResult<Self> {
        Ok(Self {})
    }
}

/// Session Deletion Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDeletionResponse {
    pub cause: PfcpCause,
}

impl SessionDeletionResponse {
    pub fn new(cause: PfcpCause) -> Self {
        Self { cause }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u8_ie(buf, IeType::Cause, self.cause as u8);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut cause = PfcpCause::RequestAccepted;
        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            if ie.ie_type == IeType::Cause as u16 && !ie.data.is_empty() {
                cause = PfcpCause::try_from(ie.data[0])?;
            }
        }
        Ok(Self { cause })
    }
}

/// All message bodies behind one enum so transports can dispatch on type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PfcpMessage {
    HeartbeatRequest(HeartbeatRequest),
    HeartbeatResponse(HeartbeatResponse),
    AssociationSetupRequest(AssociationSetupRequest),
    AssociationSetupResponse(AssociationSetupResponse),
    AssociationReleaseRequest(AssociationReleaseRequest),
    AssociationReleaseResponse(AssociationReleaseResponse),
    SessionEstablishmentRequest(SessionEstablishmentRequest),
    SessionEstablishmentResponse(SessionEstablishmentResponse),
    SessionModificationRequest(SessionModificationRequest),
    SessionModificationResponse(SessionModificationResponse),
    SessionDeletionRequest(SessionDeletionRequest),
    SessionDeletionResponse(SessionDeletionResponse),
}

impl PfcpMessage {
    pub fn message_type(&self) -> PfcpMessageType {
        match self {
            Self::HeartbeatRequest(_) => PfcpMessageType::HeartbeatRequest,
            Self::HeartbeatResponse(_) => PfcpMessageType::HeartbeatResponse,
            Self::AssociationSetupRequest(_) => PfcpMessageType::AssociationSetupRequest,
            Self::AssociationSetupResponse(_) => PfcpMessageType::AssociationSetupResponse,
            Self::AssociationReleaseRequest(_) => PfcpMessageType::AssociationReleaseRequest,
            Self::AssociationReleaseResponse(_) => PfcpMessageType::AssociationReleaseResponse,
            Self::SessionEstablishmentRequest(_) => PfcpMessageType::SessionEstablishmentRequest,
            Self::SessionEstablishmentResponse(_) => PfcpMessageType::SessionEstablishmentResponse,
            Self::SessionModificationRequest(_) => PfcpMessageType::SessionModificationRequest,
            Self::SessionModificationResponse(_) => PfcpMessageType::SessionModificationResponse,
            Self::SessionDeletionRequest(_) => PfcpMessageType::SessionDeletionRequest,
            Self::SessionDeletionResponse(_) => PfcpMessageType::SessionDeletionResponse,
        }
    }

    pub fn encode_body(&self, buf: &mut BytesMut) {
        match self {
            Self::HeartbeatRequest(msg) => msg.encode(buf),
            Self::HeartbeatResponse(msg) => msg.encode(buf),
            Self::AssociationSetupRequest(msg) => msg.encode(buf),
            Self::AssociationSetupResponse(msg) => msg.encode(buf),
            Self::AssociationReleaseRequest(msg) => msg.encode(buf),
            Self::AssociationReleaseResponse(msg) => msg.encode(buf),
            Self::SessionEstablishmentRequest(msg) => msg.encode(buf),
            Self::SessionEstablishmentResponse(msg) => msg.encode(buf),
            Self::SessionModificationRequest(msg) => msg.encode(buf),
            Self::SessionModificationResponse(msg) => msg.encode(buf),
            Self::SessionDeletionRequest(msg) => msg.encode(buf),
            Self::SessionDeletionResponse(msg) => msg.encode(buf),
        }
    }

    pub fn decode_body(message_type: PfcpMessageType, buf: &mut Bytes) -> PfcpResult<Self> {
        match message_type {
            PfcpMessageType::HeartbeatRequest => {
                Ok(Self::HeartbeatRequest(HeartbeatRequest::decode(buf)?))
            }
            PfcpMessageType::HeartbeatResponse => {
                Ok(Self::HeartbeatResponse(HeartbeatResponse::decode(buf)?))
            }
            PfcpMessageType::AssociationSetupRequest => Ok(Self::AssociationSetupRequest(
                AssociationSetupRequest::decode(buf)?,
            )),
            PfcpMessageType::AssociationSetupResponse => Ok(Self::AssociationSetupResponse(
                AssociationSetupResponse::decode(buf)?,
            )),
            PfcpMessageType::AssociationReleaseRequest => Ok(Self::AssociationReleaseRequest(
                AssociationReleaseRequest::decode(buf)?,
            )),
            PfcpMessageType::AssociationReleaseResponse => Ok(Self::AssociationReleaseResponse(
                AssociationReleaseResponse::decode(buf)?,
            )),
            PfcpMessageType::SessionEstablishmentRequest => Ok(Self::SessionEstablishmentRequest(
                SessionEstablishmentRequest::decode(buf)?,
            )),
            PfcpMessageType::SessionEstablishmentResponse => {
                Ok(Self::SessionEstablishmentResponse(
                    SessionEstablishmentResponse::decode(buf)?,
                ))
            }
            PfcpMessageType::SessionModificationRequest => Ok(Self::SessionModificationRequest(
                SessionModificationRequest::decode(buf)?,
            )),
            PfcpMessageType::SessionModificationResponse => {
                Ok(Self::SessionModificationResponse(
                    SessionModificationResponse::decode(buf)?,
                ))
            }
            PfcpMessageType::SessionDeletionRequest => Ok(Self::SessionDeletionRequest(
                SessionDeletionRequest::decode(buf)?,
            )),
            PfcpMessageType::SessionDeletionResponse => Ok(Self::SessionDeletionResponse(
                SessionDeletionResponse::decode(buf)?,
            )),
        }
    }
}

/// Build a complete on-the-wire message: header plus body with the length
/// field filled in.
pub fn build_message(message: &PfcpMessage, sequence_number: u32, seid: Option<u64>) -> BytesMut {
    let message_type = message.message_type();

    let mut body = BytesMut::new();
    message.encode_body(&mut body);

    let mut header = match seid {
        Some(seid) => PfcpHeader::new_with_seid(message_type, seid, sequence_number),
        None => PfcpHeader::new(message_type, sequence_number),
    };
    // length counts everything after the first 4 header bytes
    header.length = (body.len() + header.header_len() - 4) as u16;

    let mut buf = BytesMut::new();
    header.encode(&mut buf);
    buf.put_slice(&body);
    buf
}

/// Parse one complete message off the buffer.
pub fn parse_message(buf: &mut Bytes) -> PfcpResult<(PfcpHeader, PfcpMessage)> {
    let header = PfcpHeader::decode(buf)?;

    let body_len = (header.length as usize).saturating_sub(header.header_len() - 4);
    if buf.remaining() < body_len {
        return Err(PfcpError::BufferTooShort {
            needed: body_len,
            available: buf.remaining(),
        });
    }

    let mut body = buf.split_to(body_len);
    let message = PfcpMessage::decode_body(header.message_type, &mut body)?;
    Ok((header, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApplyAction, GateStatus, Pdi, SourceInterface};

    #[test]
    fn test_heartbeat_round_trip() {
        let msg = PfcpMessage::HeartbeatRequest(HeartbeatRequest::new(0xDEADBEEF));
        let buf = build_message(&msg, 7, None);

        let mut bytes = buf.freeze();
        let (header, decoded) = parse_message(&mut bytes).unwrap();
        assert_eq!(header.message_type, PfcpMessageType::HeartbeatRequest);
        assert_eq!(header.sequence_number, 7);
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_association_setup_round_trip() {
        let msg = PfcpMessage::AssociationSetupRequest(AssociationSetupRequest::new(
            NodeId::Ipv4([10, 0, 0, 2]),
            1234,
        ));
        let buf = build_message(&msg, 1, None);

        let mut bytes = buf.freeze();
        let (header, decoded) = parse_message(&mut bytes).unwrap();
        assert!(header.seid.is_none());
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_establishment_request_round_trip_with_rules() {
        let mut req = SessionEstablishmentRequest::new(
            NodeId::Ipv4([10, 0, 0, 2]),
            FSeid::new_ipv4(42, [10, 0, 0, 2]),
        );
        req.create_pdrs.push({
            let mut pdr = CreatePdr::new(1, 100, Pdi::new(SourceInterface::Access));
            pdr.far_id = Some(1);
            pdr.qer_ids = vec![0];
            pdr
        });
        req.create_fars
            .push(CreateFar::new(1, ApplyAction::forward()));
        req.create_qers.push(CreateQer::new(0, GateStatus::open()));

        let msg = PfcpMessage::SessionEstablishmentRequest(req);
        let buf = build_message(&msg, 2, Some(0));

        let mut bytes = buf.freeze();
        let (header, decoded) = parse_message(&mut bytes).unwrap();
        assert_eq!(header.seid, Some(0));
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_modification_request_round_trip() {
        let mut req = SessionModificationRequest::new();
        let mut far = UpdateFar::new(11);
        far.apply_action = Some(ApplyAction::buffer_notify());
        req.update_fars.push(far);

        let msg = PfcpMessage::SessionModificationRequest(req);
        let buf = build_message(&msg, 9, Some(0x55));

        let mut bytes = buf.freeze();
        let (header, decoded) = parse_message(&mut bytes).unwrap();
        assert_eq!(header.seid, Some(0x55));
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_deletion_request_has_empty_body() {
        let msg = PfcpMessage::SessionDeletionRequest(SessionDeletionRequest::new());
        let buf = build_message(&msg, 3, Some(77));
        // header only: 16 bytes with SEID
        assert_eq!(buf.len(), 16);

        let mut bytes = buf.freeze();
        let (header, _) = parse_message(&mut bytes).unwrap();
        assert_eq!(header.seid, Some(77));
    }

    #[test]
    fn test_truncated_message_rejected() {
        let msg = PfcpMessage::HeartbeatRequest(HeartbeatRequest::new(1));
        let buf = build_message(&msg, 1, None);
        let mut truncated = buf.freeze().slice(0..6);
        assert!(parse_message(&mut truncated).is_err());
    }
}
