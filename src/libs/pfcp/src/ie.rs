//! Information element framing (TS 29.244 Section 8.1).
//!
//! Every IE is a 4-byte type/length header followed by its value. Grouped
//! IEs nest further IEs inside the value; [`RawIe`] walks one level so
//! callers can dispatch on the type without committing to a layout.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PfcpError, PfcpResult};

/// IE type values used by the simulator (subset of TS 29.244 Section 8.1.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum IeType {
    CreatePdr = 1,
    Pdi = 2,
    CreateFar = 3,
    ForwardingParameters = 4,
    CreateQer = 7,
    CreatedPdr = 8,
    UpdateFar = 10,
    UpdateForwardingParameters = 11,
    Cause = 19,
    SourceInterface = 20,
    FTeid = 21,
    NetworkInstance = 22,
    SdfFilter = 23,
    GateStatus = 25,
    Mbr = 26,
    Precedence = 29,
    DestinationInterface = 42,
    ApplyAction = 44,
    PdrId = 56,
    FSeid = 57,
    NodeId = 60,
    OuterHeaderCreation = 84,
    UeIpAddress = 93,
    OuterHeaderRemoval = 95,
    RecoveryTimeStamp = 96,
    FarId = 108,
    QerId = 109,
    Qfi = 124,
}

/// IE type/length header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeHeader {
    pub ie_type: u16,
    pub length: u16,
}

impl IeHeader {
    pub const LEN: usize = 4;

    pub fn new(ie_type: u16, length: u16) -> Self {
        Self { ie_type, length }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.ie_type);
        buf.put_u16(self.length);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < Self::LEN {
            return Err(PfcpError::BufferTooShort {
                needed: Self::LEN,
                available: buf.remaining(),
            });
        }
        Ok(Self {
            ie_type: buf.get_u16(),
            length: buf.get_u16(),
        })
    }
}

/// One undecoded IE: its type and value bytes.
///
/// Decode loops pull `RawIe`s off the buffer and match on `ie_type`;
/// unknown types are simply dropped, which keeps the decoder tolerant of
/// peers sending IEs the simulator does not model.
#[derive(Debug, Clone)]
pub struct RawIe {
    pub ie_type: u16,
    pub data: Bytes,
}

impl RawIe {
    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let header = IeHeader::decode(buf)?;
        let len = header.length as usize;
        if buf.remaining() < len {
            return Err(PfcpError::BufferTooShort {
                needed: len,
                available: buf.remaining(),
            });
        }
        Ok(Self {
            ie_type: header.ie_type,
            data: buf.split_to(len),
        })
    }
}

pub fn encode_u8_ie(buf: &mut BytesMut, ie_type: IeType, value: u8) {
    IeHeader::new(ie_type as u16, 1).encode(buf);
    buf.put_u8(value);
}

pub fn encode_u16_ie(buf: &mut BytesMut, ie_type: IeType, value: u16) {
    IeHeader::new(ie_type as u16, 2).encode(buf);
    buf.put_u16(value);
}

pub fn encode_u32_ie(buf: &mut BytesMut, ie_type: IeType, value: u32) {
    IeHeader::new(ie_type as u16, 4).encode(buf);
    buf.put_u32(value);
}

pub fn encode_bytes_ie(buf: &mut BytesMut, ie_type: IeType, value: &[u8]) {
    IeHeader::new(ie_type as u16, value.len() as u16).encode(buf);
    buf.put_slice(value);
}

/// Encode a grouped IE: the member encoder writes into a scratch buffer so
/// the enclosing header carries the final length.
pub fn encode_grouped_ie<F>(buf: &mut BytesMut, ie_type: IeType, encode_members: F)
where
    F: FnOnce(&mut BytesMut),
{
    let mut inner = BytesMut::new();
    encode_members(&mut inner);
    IeHeader::new(ie_type as u16, inner.len() as u16).encode(buf);
    buf.put_slice(&inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ie_header_round_trip() {
        let mut buf = BytesMut::new();
        IeHeader::new(IeType::FarId as u16, 4).encode(&mut buf);
        buf.put_u32(7);

        let mut bytes = buf.freeze();
        let ie = RawIe::decode(&mut bytes).unwrap();
        assert_eq!(ie.ie_type, IeType::FarId as u16);
        assert_eq!(ie.data.len(), 4);
        assert_eq!(bytes.remaining(), 0);
    }

    #[test]
    fn test_raw_ie_truncated_value() {
        let mut buf = BytesMut::new();
        IeHeader::new(IeType::Precedence as u16, 4).encode(&mut buf);
        buf.put_u8(0); // only 1 of 4 promised bytes

        let mut bytes = buf.freeze();
        assert!(matches!(
            RawIe::decode(&mut bytes),
            Err(PfcpError::BufferTooShort { needed: 4, .. })
        ));
    }

    #[test]
    fn test_grouped_ie_length_covers_members() {
        let mut buf = BytesMut::new();
        encode_grouped_ie(&mut buf, IeType::CreateFar, |inner| {
            encode_u32_ie(inner, IeType::FarId, 9);
            encode_u16_ie(inner, IeType::ApplyAction, 0x0002);
        });

        let mut bytes = buf.freeze();
        let outer = RawIe::decode(&mut bytes).unwrap();
        assert_eq!(outer.ie_type, IeType::CreateFar as u16);

        let mut members = outer.data;
        let first = RawIe::decode(&mut members).unwrap();
        let second = RawIe::decode(&mut members).unwrap();
        assert_eq!(first.ie_type, IeType::FarId as u16);
        assert_eq!(second.ie_type, IeType::ApplyAction as u16);
        assert_eq!(members.remaining(), 0);
    }
}
