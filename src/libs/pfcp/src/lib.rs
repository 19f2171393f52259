//! PFCP codec for the N4 peer simulator.
//!
//! Encoding and decoding of the PFCP message subset a control-plane test
//! peer exchanges with a UPF (3GPP TS 29.244): heartbeat, association
//! setup/release, and session establishment/modification/deletion,
//! together with the PDR / FAR / QER rule IEs those messages carry.
//!
//! # Example
//!
//! ```rust
//! use pfcp::message::{build_message, parse_message, HeartbeatRequest, PfcpMessage};
//!
//! let msg = PfcpMessage::HeartbeatRequest(HeartbeatRequest::new(1234567890));
//! let buf = build_message(&msg, 1, None);
//!
//! let mut bytes = buf.freeze();
//! let (header, decoded) = parse_message(&mut bytes).unwrap();
//! assert_eq!(header.sequence_number, 1);
//! assert_eq!(decoded, msg);
//! ```

pub mod error;
pub mod header;
pub mod ie;
pub mod message;
pub mod types;


pub use error::{PfcpError, PfcpResult};
pub use header::{PfcpHeader, PfcpMessageType, PFCP_HEADER_LEN, PFCP_HEADER_LEN_WITH_SEID};
pub use types::PFCP_UDP_PORT;

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::error::{PfcpError, PfcpResult};
    pub use crate::header::{PfcpHeader, PfcpMessageType};
    pub use crate::ie::{IeHeader, IeType, RawIe};
    pub use crate::message::{
        build_message, parse_message, AssociationReleaseRequest, AssociationReleaseResponse,
        AssociationSetupRequest, AssociationSetupResponse, HeartbeatRequest, HeartbeatResponse,
        PfcpMessage, SessionDeletionRequest, SessionDeletionResponse,
        SessionEstablishmentRequest, SessionEstablishmentResponse, SessionModificationRequest,
        SessionModificationResponse,
    };
    pub use crate::types::{
        ApplyAction, Bitrate, CreateFar, CreatePdr, CreateQer, DestinationInterface, FSeid,
        FTeid, ForwardingParameters, GateStatus, NodeId, OuterHeaderCreation, OuterHeaderRemoval,
        Pdi, PfcpCause, SdfFilter, SourceInterface, UeIpAddress, UpdateFar,
    };
}
