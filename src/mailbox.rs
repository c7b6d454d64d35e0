//! Mailbox sub-protocol decoding (CoE/EoE/FoE/SoE/VoE).
//!
//! EtherCAT carries asynchronous higher-layer messages inside ordinary
//! datagram payloads. There is no explicit marker for mailbox traffic: the
//! classification here is a heuristic over the command code and payload
//! length, tuned to observed traffic. A datagram that fails any field access
//! is simply not mailbox traffic; that is the default, non-error path.

use bytes::Bytes;

use crate::frame::datagram::{is_fixed_address, Datagram};

/// Minimum payload for a mailbox message: 6-byte header + 2 bytes of body.
const MAILBOX_MIN_LEN: usize = 8;

/// Mailbox protocol selected by the low nibble of the type/priority byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailboxProtocol {
    /// CANopen over EtherCAT
    Coe,
    /// Ethernet over EtherCAT
    Eoe,
    /// File Access over EtherCAT
    Foe,
    /// Servo Drive Profile over EtherCAT
    Soe,
    /// Vendor specific over EtherCAT
    Voe,
    /// Unrecognized nibble, preserved verbatim
    Unknown(u8),
}

impl MailboxProtocol {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0x01 => MailboxProtocol::Coe,
            0x02 => MailboxProtocol::Eoe,
            0x03 => MailboxProtocol::Foe,
            0x04 => MailboxProtocol::Soe,
            0x05 => MailboxProtocol::Voe,
            other => MailboxProtocol::Unknown(other),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MailboxProtocol::Coe => "CoE (CANopen over EtherCAT)",
            MailboxProtocol::Eoe => "EoE (Ethernet over EtherCAT)",
            MailboxProtocol::Foe => "FoE (File Access over EtherCAT)",
            MailboxProtocol::Soe => "SoE (Servo Drive Profile over EtherCAT)",
            MailboxProtocol::Voe => "VoE (Vendor specific over EtherCAT)",
            MailboxProtocol::Unknown(_) => "Unknown",
        }
    }
}

/// SDO command specifier, selected by the high nibble of the byte following
/// the CoE header. The code table is nibble-spaced (0x20..0x80 in steps of
/// 0x10), so a 3-bit mask would alias requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdoCommand {
    DownloadRequest,
    DownloadResponse,
    UploadRequest,
    UploadResponse,
    SegmentDownloadRequest,
    SegmentDownloadResponse,
    AbortTransfer,
    Unknown(u8),
}

impl SdoCommand {
    /// Decode from the command-specifier byte (masked to the high nibble).
    pub fn from_specifier(byte: u8) -> Self {
        match byte & 0xF0 {
            0x20 => SdoCommand::DownloadRequest,
            0x30 => SdoCommand::DownloadResponse,
            0x40 => SdoCommand::UploadRequest,
            0x50 => SdoCommand::UploadResponse,
            0x60 => SdoCommand::SegmentDownloadRequest,
            0x70 => SdoCommand::SegmentDownloadResponse,
            0x80 => SdoCommand::AbortTransfer,
            other => SdoCommand::Unknown(other),
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(
            self,
            SdoCommand::DownloadRequest
                | SdoCommand::UploadRequest
                | SdoCommand::SegmentDownloadRequest
        )
    }

    pub fn is_response(&self) -> bool {
        matches!(
            self,
            SdoCommand::DownloadResponse
                | SdoCommand::UploadResponse
                | SdoCommand::SegmentDownloadResponse
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SdoCommand::DownloadRequest => "SDO Download Request",
            SdoCommand::DownloadResponse => "SDO Download Response",
            SdoCommand::UploadRequest => "SDO Upload Request",
            SdoCommand::UploadResponse => "SDO Upload Response",
            SdoCommand::SegmentDownloadRequest => "SDO Segment Download Request",
            SdoCommand::SegmentDownloadResponse => "SDO Segment Download Response",
            SdoCommand::AbortTransfer => "SDO Abort Transfer",
            SdoCommand::Unknown(_) => "SDO Unknown",
        }
    }
}

/// Decoded CoE/SDO fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoeMessage {
    /// Service type, top 4 bits of the CoE header (2 = SDO).
    pub service_type: u8,
    /// Present only for SDO service traffic.
    pub command: Option<SdoCommand>,
    /// Object dictionary index.
    pub object_index: Option<u16>,
    /// Object dictionary subindex.
    pub object_subindex: Option<u8>,
    /// SDO payload after index/subindex (shares the frame buffer).
    pub payload: Bytes,
}

/// One decoded mailbox message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxMessage {
    /// Mailbox header length field (little-endian u16).
    pub length: u16,
    /// Station address from the mailbox header.
    pub station_address: u16,
    /// Protocol selected by the low nibble of the type/priority byte.
    pub protocol: MailboxProtocol,
    /// Priority from the high nibble of the type/priority byte.
    pub priority: u8,
    /// Mailbox sequence counter byte.
    pub counter: u8,
    /// Everything after the 6-byte mailbox header.
    pub body: Bytes,
    /// CoE decoding, when `protocol` is CoE and the body is long enough.
    pub coe: Option<CoeMessage>,
}

impl MailboxMessage {
    /// The SDO command, when this message carries decoded SDO traffic.
    pub fn sdo_command(&self) -> Option<SdoCommand> {
        self.coe.as_ref().and_then(|c| c.command)
    }
}

/// Whether a datagram looks like mailbox traffic: a fixed-address command
/// (FPRD/FPWR/FPRW) carrying at least 8 payload bytes.
pub fn is_mailbox_traffic(datagram: &Datagram) -> bool {
    is_fixed_address(datagram.cmd) && datagram.data_length as usize >= MAILBOX_MIN_LEN
}

/// Decode a datagram's payload as a mailbox message.
///
/// Returns `None` when the datagram is not classified as mailbox traffic or
/// any field would read past the payload; both mean "not mailbox traffic".
pub fn decode_mailbox(datagram: &Datagram) -> Option<MailboxMessage> {
    if !is_mailbox_traffic(datagram) {
        return None;
    }
    let data = &datagram.data;
    if data.len() < MAILBOX_MIN_LEN {
        return None;
    }

    // 6-byte mailbox header: length, station address, type/priority, counter.
    let length = u16::from_le_bytes([data[0], data[1]]);
    let station_address = u16::from_le_bytes([data[2], data[3]]);
    let type_priority = data[4];
    let counter = data[5];

    let protocol = MailboxProtocol::from_nibble(type_priority & 0x0F);
    let priority = (type_priority >> 4) & 0x0F;
    let body = data.slice(6..);

    let coe = match protocol {
        MailboxProtocol::Coe => decode_coe(&body),
        _ => None,
    };

    Some(MailboxMessage {
        length,
        station_address,
        protocol,
        priority,
        counter,
        body,
        coe,
    })
}

/// Decode the CoE header and, for SDO service traffic, the command
/// specifier, object index/subindex, and payload.
fn decode_coe(body: &Bytes) -> Option<CoeMessage> {
    if body.len() < 2 {
        return None;
    }
    // CoE header is a little-endian word; the service nibble is the top of
    // the second byte.
    let service_type = body[1] >> 4;

    let mut msg = CoeMessage {
        service_type,
        command: None,
        object_index: None,
        object_subindex: None,
        payload: Bytes::new(),
    };

    // Service 2 = SDO: command byte, then index (LE) and subindex.
    if service_type == 2 && body.len() >= 3 {
        msg.command = Some(SdoCommand::from_specifier(body[2]));
        if body.len() >= 6 {
            msg.object_index = Some(u16::from_le_bytes([body[3], body[4]]));
            msg.object_subindex = Some(body[5]);
            msg.payload = body.slice(6..);
        }
    }

    Some(msg)
}
