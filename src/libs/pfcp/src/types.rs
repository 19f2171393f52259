//! PFCP type definitions: causes, addresses, and the grouped rule IEs
//! (PDR / FAR / QER) exchanged during session management.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PfcpError, PfcpResult};
use crate::ie::{
    encode_bytes_ie, encode_grouped_ie, encode_u16_ie, encode_u32_ie, encode_u8_ie, IeHeader,
    IeType, RawIe,
};

/// PFCP UDP port (TS 29.244 Section 4).
pub const PFCP_UDP_PORT: u16 = 8805;

/// Encoded MBR length: 5 bytes uplink + 5 bytes downlink.
pub const PFCP_BITRATE_LEN: usize = 10;

/// Cause values (TS 29.244 Section 8.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PfcpCause {
    RequestAccepted = 1,
    RequestRejected = 64,
    SessionContextNotFound = 65,
    MandatoryIeMissing = 66,
    InvalidLength = 68,
    NoEstablishedPfcpAssociation = 72,
    RuleCreationModificationFailure = 73,
    NoResourcesAvailable = 75,
    ServiceNotSupported = 76,
    SystemFailure = 77,
}

impl TryFrom<u8> for PfcpCause {
    type Error = PfcpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::RequestAccepted),
            64 => Ok(Self::RequestRejected),
            65 => Ok(Self::SessionContextNotFound),
            66 => Ok(Self::MandatoryIeMissing),
            68 => Ok(Self::InvalidLength),
            72 => Ok(Self::NoEstablishedPfcpAssociation),
            73 => Ok(Self::RuleCreationModificationFailure),
            75 => Ok(Self::NoResourcesAvailable),
            76 => Ok(Self::ServiceNotSupported),
            77 => Ok(Self::SystemFailure),
            _ => Err(PfcpError::InvalidCause(value)),
        }
    }
}

impl PfcpCause {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::RequestAccepted)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestAccepted => "Request Accepted",
            Self::RequestRejected => "Request Rejected",
            Self::SessionContextNotFound => "Session Context Not Found",
            Self::MandatoryIeMissing => "Mandatory IE Missing",
            Self::InvalidLength => "Invalid Length",
            Self::NoEstablishedPfcpAssociation => "No Established PFCP Association",
            Self::RuleCreationModificationFailure => "Rule Creation/Modification Failure",
            Self::NoResourcesAvailable => "No Resources Available",
            Self::ServiceNotSupported => "Service Not Supported",
            Self::SystemFailure => "System Failure",
        }
    }
}

/// Source Interface values (TS 29.244 Section 8.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SourceInterface {
    #[default]
    Access = 0,
    Core = 1,
    SgiLanN6Lan = 2,
    CpFunction = 3,
}

impl TryFrom<u8> for SourceInterface {
    type Error = PfcpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Access),
            1 => Ok(Self::Core),
            2 => Ok(Self::SgiLanN6Lan),
            3 => Ok(Self::CpFunction),
            _ => Err(PfcpError::InvalidInterfaceType(value)),
        }
    }
}

/// Destination Interface values (TS 29.244 Section 8.2.24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DestinationInterface {
    #[default]
    Access = 0,
    Core = 1,
    SgiLanN6Lan = 2,
    CpFunction = 3,
}

impl TryFrom<u8> for DestinationInterface {
    type Error = PfcpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Access),
            1 => Ok(Self::Core),
            2 => Ok(Self::SgiLanN6Lan),
            3 => Ok(Self::CpFunction),
            _ => Err(PfcpError::InvalidInterfaceType(value)),
        }
    }
}

/// Node ID (TS 29.244 Section 8.2.38).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeId {
    Ipv4([u8; 4]),
    Ipv6([u8; 16]),
    Fqdn(String),
}

impl NodeId {
    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::Ipv4(addr) => {
                buf.put_u8(0);
                buf.put_slice(addr);
            }
            Self::Ipv6(addr) => {
                buf.put_u8(1);
                buf.put_slice(addr);
            }
            Self::Fqdn(name) => {
                buf.put_u8(2);
                buf.put_slice(name.as_bytes());
            }
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 1 {
            return Err(PfcpError::BufferTooShort {
                needed: 1,
                available: buf.remaining(),
            });
        }
        match buf.get_u8() & 0x0F {
            0 => {
                if buf.remaining() < 4 {
                    return Err(PfcpError::BufferTooShort {
                        needed: 4,
                        available: buf.remaining(),
                    });
                }
                let mut addr = [0u8; 4];
                buf.copy_to_slice(&mut addr);
                Ok(Self::Ipv4(addr))
            }
            1 => {
                if buf.remaining() < 16 {
                    return Err(PfcpError::BufferTooShort {
                        needed: 16,
                        available: buf.remaining(),
                    });
                }
                let mut addr = [0u8; 16];
                buf.copy_to_slice(&mut addr);
                Ok(Self::Ipv6(addr))
            }
            2 => {
                let name = String::from_utf8_lossy(&buf.copy_to_bytes(buf.remaining())).into_owned();
                Ok(Self::Fqdn(name))
            }
            other => Err(PfcpError::InvalidNodeIdType(other)),
        }
    }
}

/// F-SEID (TS 29.244 Section 8.2.37).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FSeid {
    pub seid: u64,
    pub ipv4_addr: Option<[u8; 4]>,
    pub ipv6_addr: Option<[u8; 16]>,
}

impl FSeid {
    pub fn new_ipv4(seid: u64, addr: [u8; 4]) -> Self {
        Self {
            seid,
            ipv4_addr: Some(addr),
            ipv6_addr: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        let flags =
            ((self.ipv6_addr.is_some() as u8) << 1) | self.ipv4_addr.is_some() as u8;
        buf.put_u8(flags);
        buf.put_u64(self.seid);
        if let Some(addr) = &self.ipv4_addr {
            buf.put_slice(addr);
        }
        if let Some(addr) = &self.ipv6_addr {
            buf.put_slice(addr);
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 9 {
            return Err(PfcpError::BufferTooShort {
                needed: 9,
                available: buf.remaining(),
            });
        }
        let flags = buf.get_u8();
        let seid = buf.get_u64();

        let ipv4_addr = if flags & 0x01 != 0 {
            if buf.remaining() < 4 {
                return Err(PfcpError::BufferTooShort {
                    needed: 4,
                    available: buf.remaining(),
                });
            }
            let mut addr = [0u8; 4];
            buf.copy_to_slice(&mut addr);
            Some(addr)
        } else {
            None
        };

        let ipv6_addr = if flags & 0x02 != 0 {
            if buf.remaining() < 16 {
                return Err(PfcpError::BufferTooShort {
                    needed: 16,
                    available: buf.remaining(),
                });
            }
            let mut addr = [0u8; 16];
            buf.copy_to_slice(&mut addr);
            Some(addr)
        } else {
            None
        };

        Ok(Self {
            seid,
            ipv4_addr,
            ipv6_addr,
        })
    }
}

/// F-TEID (TS 29.244 Section 8.2.3). Only the locally-assigned IPv4 form is
/// used here; the simulator always picks its own TEIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FTeid {
    pub teid: u32,
    pub ipv4_addr: Option<[u8; 4]>,
}

impl FTeid {
    pub fn new_ipv4(teid: u32, addr: [u8; 4]) -> Self {
        Self {
            teid,
            ipv4_addr: Some(addr),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.ipv4_addr.is_some() as u8); // V4 flag
        buf.put_u32(self.teid);
        if let Some(addr) = &self.ipv4_addr {
            buf.put_slice(addr);
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 5 {
            return Err(PfcpError::BufferTooShort {
                needed: 5,
                available: buf.remaining(),
            });
        }
        let flags = buf.get_u8();
        let teid = buf.get_u32();
        let ipv4_addr = if flags & 0x01 != 0 {
            if buf.remaining() < 4 {
                return Err(PfcpError::BufferTooShort {
                    needed: 4,
                    available: buf.remaining(),
                });
            }
            let mut addr = [0u8; 4];
            buf.copy_to_slice(&mut addr);
            Some(addr)
        } else {
            None
        };
        Ok(Self { teid, ipv4_addr })
    }
}

/// UE IP Address (TS 29.244 Section 8.2.62).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeIpAddress {
    pub ipv4_addr: [u8; 4],
    /// S/D bit: set when the address is matched as a source address
    /// (uplink direction), clear for destination (downlink).
    pub is_source: bool,
}

impl UeIpAddress {
    pub fn new_ipv4(addr: [u8; 4], is_source: bool) -> Self {
        Self {
            ipv4_addr: addr,
            is_source,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        let flags = ((self.is_source as u8) << 2) | 0x02; // S/D | V4
        buf.put_u8(flags);
        buf.put_slice(&self.ipv4_addr);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 5 {
            return Err(PfcpError::BufferTooShort {
                needed: 5,
                available: buf.remaining(),
            });
        }
        let flags = buf.get_u8();
        let mut addr = [0u8; 4];
        buf.copy_to_slice(&mut addr);
        Ok(Self {
            ipv4_addr: addr,
            is_source: flags & 0x04 != 0,
        })
    }
}

/// SDF Filter (TS 29.244 Section 8.2.5) carrying a flow description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdfFilter {
    pub flow_description: String,
}

impl SdfFilter {
    pub fn new(flow_description: impl Into<String>) -> Self {
        Self {
            flow_description: flow_description.into(),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(0x01); // FD flag
        buf.put_u8(0); // spare
        let fd = self.flow_description.as_bytes();
        buf.put_u16(fd.len() as u16);
        buf.put_slice(fd);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 4 {
            return Err(PfcpError::BufferTooShort {
                needed: 4,
                available: buf.remaining(),
            });
        }
        let flags = buf.get_u8();
        buf.advance(1); // spare
        let mut flow_description = String::new();
        if flags & 0x01 != 0 {
            let len = buf.get_u16() as usize;
            if buf.remaining() < len {
                return Err(PfcpError::BufferTooShort {
                    needed: len,
                    available: buf.remaining(),
                });
            }
            flow_description =
                String::from_utf8_lossy(&buf.copy_to_bytes(len)).into_owned();
        }
        Ok(Self { flow_description })
    }
}

/// Apply Action flags (TS 29.244 Section 8.2.26).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyAction {
    pub drop: bool,
    pub forw: bool,
    pub buff: bool,
    /// Notify the CP function
    pub nocp: bool,
    pub dupl: bool,
}

impl ApplyAction {
    pub fn forward() -> Self {
        Self {
            forw: true,
            ..Default::default()
        }
    }

    pub fn drop() -> Self {
        Self {
            drop: true,
            ..Default::default()
        }
    }

    /// Buffer with CP notification, the action pair used while a downlink
    /// path is not yet available.
    pub fn buffer_notify() -> Self {
        Self {
            buff: true,
            nocp: true,
            ..Default::default()
        }
    }

    pub fn encode(&self) -> u16 {
        ((self.dupl as u16) << 4)
            | ((self.nocp as u16) << 3)
            | ((self.buff as u16) << 2)
            | ((self.forw as u16) << 1)
            | self.drop as u16
    }

    pub fn decode(value: u16) -> Self {
        Self {
            drop: value & 0x01 != 0,
            forw: value & 0x02 != 0,
            buff: value & 0x04 != 0,
            nocp: value & 0x08 != 0,
            dupl: value & 0x10 != 0,
        }
    }
}

/// Gate Status (TS 29.244 Section 8.2.7). Zero means open per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateStatus {
    pub ul_open: bool,
    pub dl_open: bool,
}

impl GateStatus {
    pub fn open() -> Self {
        Self {
            ul_open: true,
            dl_open: true,
        }
    }

    pub fn closed() -> Self {
        Self {
            ul_open: false,
            dl_open: false,
        }
    }

    pub fn encode(&self) -> u8 {
        let ul = !self.ul_open as u8;
        let dl = !self.dl_open as u8;
        (ul << 2) | dl
    }

    pub fn decode(value: u8) -> Self {
        Self {
            ul_open: (value >> 2) & 0x03 == 0,
            dl_open: value & 0x03 == 0,
        }
    }
}

/// MBR bitrates in kbit/s, encoded as two 5-byte values (TS 29.244
/// Section 8.2.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitrate {
    pub uplink_kbps: u64,
    pub downlink_kbps: u64,
}

impl Bitrate {
    pub fn new(uplink_kbps: u64, downlink_kbps: u64) -> Self {
        Self {
            uplink_kbps,
            downlink_kbps,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8((self.uplink_kbps >> 32) as u8);
        buf.put_u32(self.uplink_kbps as u32);
        buf.put_u8((self.downlink_kbps >> 32) as u8);
        buf.put_u32(self.downlink_kbps as u32);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < PFCP_BITRATE_LEN {
            return Err(PfcpError::BufferTooShort {
                needed: PFCP_BITRATE_LEN,
                available: buf.remaining(),
            });
        }
        let ul = ((buf.get_u8() as u64) << 32) | buf.get_u32() as u64;
        let dl = ((buf.get_u8() as u64) << 32) | buf.get_u32() as u64;
        Ok(Self {
            uplink_kbps: ul,
            downlink_kbps: dl,
        })
    }
}

/// Outer Header Removal description (TS 29.244 Section 8.2.64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OuterHeaderRemoval {
    #[default]
    GtpUUdpIpv4 = 0,
    GtpUUdpIpv6 = 1,
    UdpIpv4 = 2,
    UdpIpv6 = 3,
}

impl OuterHeaderRemoval {
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(*self as u8);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 1 {
            return Err(PfcpError::BufferTooShort {
                needed: 1,
                available: buf.remaining(),
            });
        }
        Ok(match buf.get_u8() {
            1 => Self::GtpUUdpIpv6,
            2 => Self::UdpIpv4,
            3 => Self::UdpIpv6,
            _ => Self::GtpUUdpIpv4,
        })
    }
}

/// Outer Header Creation (TS 29.244 Section 8.2.56), GTP-U/UDP/IPv4 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterHeaderCreation {
    pub teid: u32,
    pub ipv4_addr: [u8; 4],
}

impl OuterHeaderCreation {
    pub fn new_gtpu_ipv4(teid: u32, addr: [u8; 4]) -> Self {
        Self {
            teid,
            ipv4_addr: addr,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(0x0100); // GTP-U/UDP/IPv4
        buf.put_u32(self.teid);
        buf.put_slice(&self.ipv4_addr);
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        if buf.remaining() < 10 {
            return Err(PfcpError::BufferTooShort {
                needed: 10,
                available: buf.remaining(),
            });
        }
        buf.advance(2); // description
        let teid = buf.get_u32();
        let mut addr = [0u8; 4];
        buf.copy_to_slice(&mut addr);
        Ok(Self {
            teid,
            ipv4_addr: addr,
        })
    }
}

/// PDI - grouped IE within a PDR (TS 29.244 Section 7.5.2.2-2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdi {
    pub source_interface: SourceInterface,
    pub local_f_teid: Option<FTeid>,
    pub ue_ip_address: Option<UeIpAddress>,
    pub sdf_filter: Option<SdfFilter>,
}

impl Pdi {
    pub fn new(source_interface: SourceInterface) -> Self {
        Self {
            source_interface,
            local_f_teid: None,
            ue_ip_address: None,
            sdf_filter: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u8_ie(buf, IeType::SourceInterface, self.source_interface as u8);
        if let Some(fteid) = &self.local_f_teid {
            encode_grouped_ie(buf, IeType::FTeid, |b| fteid.encode(b));
        }
        if let Some(ue_ip) = &self.ue_ip_address {
            encode_grouped_ie(buf, IeType::UeIpAddress, |b| ue_ip.encode(b));
        }
        if let Some(sdf) = &self.sdf_filter {
            encode_grouped_ie(buf, IeType::SdfFilter, |b| sdf.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut source_interface = SourceInterface::Access;
        let mut local_f_teid = None;
        let mut ue_ip_address = None;
        let mut sdf_filter = None;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::SourceInterface as u16 => {
                    if !ie.data.is_empty() {
                        source_interface = SourceInterface::try_from(ie.data[0] & 0x0F)?;
                    }
                }
                t if t == IeType::FTeid as u16 => {
                    let mut data = ie.data;
                    local_f_teid = Some(FTeid::decode(&mut data)?);
                }
                t if t == IeType::UeIpAddress as u16 => {
                    let mut data = ie.data;
                    ue_ip_address = Some(UeIpAddress::decode(&mut data)?);
                }
                t if t == IeType::SdfFilter as u16 => {
                    let mut data = ie.data;
                    sdf_filter = Some(SdfFilter::decode(&mut data)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            source_interface,
            local_f_teid,
            ue_ip_address,
            sdf_filter,
        })
    }
}

/// Create PDR - grouped IE (TS 29.244 Section 7.5.2.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePdr {
    pub pdr_id: u16,
    pub precedence: u32,
    pub pdi: Pdi,
    pub outer_header_removal: Option<OuterHeaderRemoval>,
    pub far_id: Option<u32>,
    pub qer_ids: Vec<u32>,
}

impl CreatePdr {
    pub fn new(pdr_id: u16, precedence: u32, pdi: Pdi) -> Self {
        Self {
            pdr_id,
            precedence,
            pdi,
            outer_header_removal: None,
            far_id: None,
            qer_ids: Vec::new(),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u16_ie(buf, IeType::PdrId, self.pdr_id);
        encode_u32_ie(buf, IeType::Precedence, self.precedence);
        encode_grouped_ie(buf, IeType::Pdi, |b| self.pdi.encode(b));
        if let Some(ohr) = &self.outer_header_removal {
            encode_grouped_ie(buf, IeType::OuterHeaderRemoval, |b| ohr.encode(b));
        }
        if let Some(far_id) = self.far_id {
            encode_u32_ie(buf, IeType::FarId, far_id);
        }
        for qer_id in &self.qer_ids {
            encode_u32_ie(buf, IeType::QerId, *qer_id);
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut pdr_id = 0u16;
        let mut precedence = 0u32;
        let mut pdi = None;
        let mut outer_header_removal = None;
        let mut far_id = None;
        let mut qer_ids = Vec::new();

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::PdrId as u16 => {
                    if ie.data.len() >= 2 {
                        let mut data = ie.data;
                        pdr_id = data.get_u16();
                    }
                }
                t if t == IeType::Precedence as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        precedence = data.get_u32();
                    }
                }
                t if t == IeType::Pdi as u16 => {
                    let mut data = ie.data;
                    pdi = Some(Pdi::decode(&mut data)?);
                }
                t if t == IeType::OuterHeaderRemoval as u16 => {
                    let mut data = ie.data;
                    outer_header_removal = Some(OuterHeaderRemoval::decode(&mut data)?);
                }
                t if t == IeType::FarId as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        far_id = Some(data.get_u32());
                    }
                }
                t if t == IeType::QerId as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        qer_ids.push(data.get_u32());
                    }
                }
                _ => {}
            }
        }

        let pdi = pdi.ok_or(PfcpError::MissingMandatoryIe("PDI"))?;

        Ok(Self {
            pdr_id,
            precedence,
            pdi,
            outer_header_removal,
            far_id,
            qer_ids,
        })
    }
}

/// Forwarding Parameters - grouped IE within a FAR (TS 29.244
/// Section 7.5.2.3-2). Also reused as Update Forwarding Parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingParameters {
    pub destination_interface: DestinationInterface,
    pub network_instance: Option<String>,
    pub outer_header_creation: Option<OuterHeaderCreation>,
}

impl ForwardingParameters {
    pub fn new(destination_interface: DestinationInterface) -> Self {
        Self {
            destination_interface,
            network_instance: None,
            outer_header_creation: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u8_ie(
            buf,
            IeType::DestinationInterface,
            self.destination_interface as u8,
        );
        if let Some(ni) = &self.network_instance {
            encode_bytes_ie(buf, IeType::NetworkInstance, ni.as_bytes());
        }
        if let Some(ohc) = &self.outer_header_creation {
            encode_grouped_ie(buf, IeType::OuterHeaderCreation, |b| ohc.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut destination_interface = DestinationInterface::Access;
        let mut network_instance = None;
        let mut outer_header_creation = None;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::DestinationInterface as u16 => {
                    if !ie.data.is_empty() {
                        destination_interface =
                            DestinationInterface::try_from(ie.data[0] & 0x0F)?;
                    }
                }
                t if t == IeType::NetworkInstance as u16 => {
                    network_instance = Some(String::from_utf8_lossy(&ie.data).into_owned());
                }
                t if t == IeType::OuterHeaderCreation as u16 => {
                    let mut data = ie.data;
                    outer_header_creation = Some(OuterHeaderCreation::decode(&mut data)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            destination_interface,
            network_instance,
            outer_header_creation,
        })
    }
}

/// Create FAR - grouped IE (TS 29.244 Section 7.5.2.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFar {
    pub far_id: u32,
    pub apply_action: ApplyAction,
    pub forwarding_parameters: Option<ForwardingParameters>,
}

impl CreateFar {
    pub fn new(far_id: u32, apply_action: ApplyAction) -> Self {
        Self {
            far_id,
            apply_action,
            forwarding_parameters: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u32_ie(buf, IeType::FarId, self.far_id);
        encode_u16_ie(buf, IeType::ApplyAction, self.apply_action.encode());
        if let Some(fp) = &self.forwarding_parameters {
            encode_grouped_ie(buf, IeType::ForwardingParameters, |b| fp.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut far_id = 0u32;
        let mut apply_action = ApplyAction::default();
        let mut forwarding_parameters = None;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::FarId as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        far_id = data.get_u32();
                    }
                }
                t if t == IeType::ApplyAction as u16 => {
                    if ie.data.len() >= 2 {
                        let mut data = ie.data;
                        apply_action = ApplyAction::decode(data.get_u16());
                    }
                }
                t if t == IeType::ForwardingParameters as u16 => {
                    let mut data = ie.data;
                    forwarding_parameters = Some(ForwardingParameters::decode(&mut data)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            far_id,
            apply_action,
            forwarding_parameters,
        })
    }
}

/// Create QER - grouped IE (TS 29.244 Section 7.5.2.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateQer {
    pub qer_id: u32,
    pub gate_status: GateStatus,
    pub maximum_bitrate: Option<Bitrate>,
    pub qfi: Option<u8>,
}

impl CreateQer {
    pub fn new(qer_id: u32, gate_status: GateStatus) -> Self {
        Self {
            qer_id,
            gate_status,
            maximum_bitrate: None,
            qfi: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u32_ie(buf, IeType::QerId, self.qer_id);
        encode_u8_ie(buf, IeType::GateStatus, self.gate_status.encode());
        if let Some(mbr) = &self.maximum_bitrate {
            encode_grouped_ie(buf, IeType::Mbr, |b| mbr.encode(b));
        }
        if let Some(qfi) = self.qfi {
            encode_u8_ie(buf, IeType::Qfi, qfi);
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut qer_id = 0u32;
        let mut gate_status = GateStatus::default();
        let mut maximum_bitrate = None;
        let mut qfi = None;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::QerId as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        qer_id = data.get_u32();
                    }
                }
                t if t == IeType::GateStatus as u16 => {
                    if !ie.data.is_empty() {
                        gate_status = GateStatus::decode(ie.data[0]);
                    }
                }
                t if t == IeType::Mbr as u16 => {
                    let mut data = ie.data;
                    maximum_bitrate = Some(Bitrate::decode(&mut data)?);
                }
                t if t == IeType::Qfi as u16 => {
                    if !ie.data.is_empty() {
                        qfi = Some(ie.data[0]);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            qer_id,
            gate_status,
            maximum_bitrate,
            qfi,
        })
    }
}

/// Update FAR - grouped IE for Session Modification (TS 29.244
/// Section 7.5.4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFar {
    pub far_id: u32,
    pub apply_action: Option<ApplyAction>,
    pub update_forwarding_parameters: Option<ForwardingParameters>,
}

impl UpdateFar {
    pub fn new(far_id: u32) -> Self {
        Self {
            far_id,
            apply_action: None,
            update_forwarding_parameters: None,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u32_ie(buf, IeType::FarId, self.far_id);
        if let Some(aa) = &self.apply_action {
            encode_u16_ie(buf, IeType::ApplyAction, aa.encode());
        }
        if let Some(fp) = &self.update_forwarding_parameters {
            encode_grouped_ie(buf, IeType::UpdateForwardingParameters, |b| fp.encode(b));
        }
    }

    pub fn decode(buf: &mut Bytes) -> PfcpResult<Self> {
        let mut far_id = 0u32;
        let mut apply_action = None;
        let mut update_forwarding_parameters = None;

        while buf.remaining() >= IeHeader::LEN {
            let ie = RawIe::decode(buf)?;
            match ie.ie_type {
                t if t == IeType::FarId as u16 => {
                    if ie.data.len() >= 4 {
                        let mut data = ie.data;
                        far_id = data.get_u32();
                    }
                }
                t if t == IeType::ApplyAction as u16 => {
                    if ie.data.len() >= 2 {
                        let mut data = ie.data;
                        apply_action = Some(ApplyAction::decode(data.get_u16()));
                    }
                }
                t if t == IeType::UpdateForwardingParameters as u16 => {
                    let mut data = ie.data;
                    update_forwarding_parameters =
                        Some(ForwardingParameters::decode(&mut data)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            far_id,
            apply_action,
            update_forwarding_parameters,
        })
    }
}
