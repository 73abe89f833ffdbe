//! Art-Net 4 wire codec
//!
//! Every packet is decoded and encoded field by field at its wire offset.
//! Multi-byte fields are little-endian for the OpCode and the ArtDmx
//! Port-Address and big-endian (Hi/Lo byte pairs) everywhere else.
//!
//! Decoders borrow from the receive buffer and return `None` for truncated
//! input. Encoders write into a caller-owned [`PacketBuffer`] and return the
//! number of bytes to transmit.

pub mod address;
pub mod dmx;
pub mod ipprog;
pub mod poll;
pub mod rdm;
pub mod timecode;
pub mod tod;

pub use address::{ArtAddress, ArtInput};
pub use dmx::{ArtDmx, ArtSync};
pub use ipprog::{ArtIpProg, ArtIpProgReply};
pub use poll::{ArtDiagData, ArtPoll, PollReply};
pub use rdm::ArtRdm;
pub use timecode::{ArtTimeCode, ArtTimeSync, ArtTrigger, TimeCodeType};
pub use tod::{ArtTodControl, ArtTodData, ArtTodRequest, TodControlCommand};

use std::net::Ipv4Addr;

/// Packet identifier at offset 0 of every Art-Net packet
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// Protocol revision carried in ProtVerLo
pub const PROTOCOL_REVISION: u8 = 14;

/// Art-Net UDP port (0x1936)
pub const UDP_PORT: u16 = 6454;

/// ID + OpCode + ProtVer
pub const HEADER_SIZE: usize = 12;

/// Largest packet this node sends or accepts (a full ArtTodData block)
pub const MAX_PACKET_SIZE: usize = 1280;

/// Reusable transmit buffer
pub type PacketBuffer = [u8; MAX_PACKET_SIZE];

/// Art-Net OpCodes understood by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OpCode {
    Poll = 0x2000,
    PollReply = 0x2100,
    DiagData = 0x2300,
    Dmx = 0x5000,
    Sync = 0x5200,
    Address = 0x6000,
    Input = 0x7000,
    TodRequest = 0x8000,
    TodData = 0x8100,
    TodControl = 0x8200,
    Rdm = 0x8300,
    RdmSub = 0x8400,
    TimeCode = 0x9700,
    TimeSync = 0x9800,
    Trigger = 0x9900,
    IpProg = 0xF800,
    IpProgReply = 0xF900,
}

impl OpCode {
    /// Map a raw OpCode to a known variant
    pub fn from_u16(value: u16) -> Option<Self> {
        let op = match value {
            0x2000 => Self::Poll,
            0x2100 => Self::PollReply,
            0x2300 => Self::DiagData,
            0x5000 => Self::Dmx,
            0x5200 => Self::Sync,
            0x6000 => Self::Address,
            0x7000 => Self::Input,
            0x8000 => Self::TodRequest,
            0x8100 => Self::TodData,
            0x8200 => Self::TodControl,
            0x8300 => Self::Rdm,
            0x8400 => Self::RdmSub,
            0x9700 => Self::TimeCode,
            0x9800 => Self::TimeSync,
            0x9900 => Self::Trigger,
            0xF800 => Self::IpProg,
            0xF900 => Self::IpProgReply,
            _ => return None,
        };
        Some(op)
    }

    /// Raw wire value
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Validate the Art-Net header and return the OpCode
///
/// Returns `None` for anything that is not an Art-Net packet of protocol
/// revision 14, for truncated buffers and for OpCodes the node does not know.
pub fn decode_header(buf: &[u8]) -> Option<OpCode> {
    if buf.len() < HEADER_SIZE {
        return None;
    }
    if &buf[0..8] != ARTNET_ID {
        return None;
    }
    // ProtVerHi / ProtVerLo
    if buf[10] != 0 || buf[11] != PROTOCOL_REVISION {
        return None;
    }
    OpCode::from_u16(u16::from_le_bytes([buf[8], buf[9]]))
}

/// Write ID and OpCode (bytes 0..10)
pub(crate) fn write_id(buf: &mut [u8], op: OpCode) {
    buf[0..8].copy_from_slice(ARTNET_ID);
    buf[8..10].copy_from_slice(&op.as_u16().to_le_bytes());
}

/// Write ID, OpCode and protocol version (bytes 0..12)
pub(crate) fn write_header(buf: &mut [u8], op: OpCode) {
    write_id(buf, op);
    buf[10] = 0;
    buf[11] = PROTOCOL_REVISION;
}

pub(crate) fn read_ip(buf: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    )
}

pub(crate) fn read_u16_be(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

/// Copy `text` into a fixed, NUL-terminated field, truncating if needed
pub(crate) fn write_str(field: &mut [u8], text: &str) {
    field.fill(0);
    let max = field.len().saturating_sub(1);
    let bytes = text.as_bytes();
    let n = bytes.len().min(max);
    field[..n].copy_from_slice(&bytes[..n]);
}

/// Read a NUL-terminated string out of a fixed field
pub(crate) fn read_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
