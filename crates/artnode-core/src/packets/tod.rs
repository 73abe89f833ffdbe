//! ArtTodRequest, ArtTodData and ArtTodControl

use super::{write_header, OpCode, PacketBuffer};
use crate::rdm::Uid;

/// ArtTodRequest asks nodes to send their Table of Devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtTodRequest<'a> {
    pub net: u8,
    pub command: u8,
    /// Low bytes of the requested Port-Addresses
    pub addresses: &'a [u8],
}

/// TodFull: send the entire TOD
pub const TOD_FULL: u8 = 0x00;

impl<'a> ArtTodRequest<'a> {
    pub const HEADER_SIZE: usize = 24;
    pub const MAX_ADDRESSES: usize = 32;

    pub fn decode(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < Self::HEADER_SIZE {
            return None;
        }
        let count = usize::from(buf[23]).min(Self::MAX_ADDRESSES);
        let available = buf.len() - Self::HEADER_SIZE;
        Some(Self {
            net: buf[21],
            command: buf[22],
            addresses: &buf[Self::HEADER_SIZE..Self::HEADER_SIZE + count.min(available)],
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::TodRequest);
        buf[12..21].fill(0);
        buf[21] = self.net;
        buf[22] = self.command;
        let n = self.addresses.len().min(Self::MAX_ADDRESSES);
        buf[23] = n as u8;
        buf[24..24 + n].copy_from_slice(&self.addresses[..n]);
        Self::HEADER_SIZE + n
    }
}

/// ArtTodData carries (part of) a port's Table of Devices
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtTodData {
    pub rdm_version: u8,
    /// Physical port, 1-based
    pub port: u8,
    pub bind_index: u8,
    pub net: u8,
    pub command_response: u8,
    pub address: u8,
    pub uid_total: u16,
    pub block_count: u8,
    pub uids: Vec<Uid>,
}

/// TodFull response: the packet carries the whole table
pub const TOD_RESPONSE_FULL: u8 = 0x00;
/// TodNak: the TOD is not available
pub const TOD_RESPONSE_NAK: u8 = 0xFF;
/// RDM standard version carried in ArtTodData/ArtRdm
pub const RDM_VERSION: u8 = 0x01;

impl ArtTodData {
    pub const HEADER_SIZE: usize = 28;
    /// UIDs that fit in one packet
    pub const MAX_UIDS: usize = 200;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::HEADER_SIZE {
            return None;
        }
        let count = usize::from(buf[27]).min(Self::MAX_UIDS);
        let uids = buf[Self::HEADER_SIZE..]
            .chunks_exact(Uid::SIZE)
            .take(count)
            .filter_map(Uid::from_slice)
            .collect();
        Some(Self {
            rdm_version: buf[12],
            port: buf[13],
            bind_index: buf[20],
            net: buf[21],
            command_response: buf[22],
            address: buf[23],
            uid_total: u16::from_be_bytes([buf[24], buf[25]]),
            block_count: buf[26],
            uids,
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::TodData);
        buf[12] = self.rdm_version;
        buf[13] = self.port;
        buf[14..20].fill(0);
        buf[20] = self.bind_index;
        buf[21] = self.net;
        buf[22] = self.command_response;
        buf[23] = self.address;
        buf[24..26].copy_from_slice(&self.uid_total.to_be_bytes());
        buf[26] = self.block_count;
        let n = self.uids.len().min(Self::MAX_UIDS);
        buf[27] = n as u8;
        for (i, uid) in self.uids.iter().take(n).enumerate() {
            let offset = Self::HEADER_SIZE + i * Uid::SIZE;
            buf[offset..offset + Uid::SIZE].copy_from_slice(uid.as_bytes());
        }
        Self::HEADER_SIZE + n * Uid::SIZE
    }
}

/// ArtTodControl command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodControlCommand {
    None,
    /// Flush the TOD and run full discovery
    Flush,
    /// End discovery
    End,
    /// Enable background incremental discovery
    IncOn,
    /// Disable background incremental discovery
    IncOff,
}

impl TodControlCommand {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::None),
            0x01 => Some(Self::Flush),
            0x02 => Some(Self::End),
            0x03 => Some(Self::IncOn),
            0x04 => Some(Self::IncOff),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Flush => 0x01,
            Self::End => 0x02,
            Self::IncOn => 0x03,
            Self::IncOff => 0x04,
        }
    }
}

/// ArtTodControl request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtTodControl {
    pub net: u8,
    pub command: TodControlCommand,
    pub address: u8,
}

impl ArtTodControl {
    pub const SIZE: usize = 24;

    /// Decode; unknown commands are rejected
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            net: buf[21],
            command: TodControlCommand::from_u8(buf[22])?,
            address: buf[23],
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::TodControl);
        buf[12..21].fill(0);
        buf[21] = self.net;
        buf[22] = self.command.as_u8();
        buf[23] = self.address;
        Self::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::MAX_PACKET_SIZE;

    #[test]
    fn test_tod_data_layout() {
        let data = ArtTodData {
            rdm_version: RDM_VERSION,
            port: 1,
            bind_index: 1,
            net: 0,
            command_response: TOD_RESPONSE_FULL,
            address: 0x12,
            uid_total: 2,
            block_count: 0,
            uids: vec![
                Uid::new([0x7F, 0xF0, 0, 0, 0, 1]),
                Uid::new([0x7F, 0xF0, 0, 0, 0, 2]),
            ],
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = data.encode(&mut buf);
        assert_eq!(n, 28 + 12);
        assert_eq!(buf[12], 0x01);
        assert_eq!(buf[23], 0x12);
        assert_eq!(buf[25], 2);
        assert_eq!(buf[27], 2);
        assert_eq!(&buf[28..34], &[0x7F, 0xF0, 0, 0, 0, 1]);

        assert_eq!(ArtTodData::decode(&buf[..n]).unwrap(), data);
    }

    #[test]
    fn test_tod_data_ignores_partial_uid() {
        let data = ArtTodData {
            rdm_version: RDM_VERSION,
            uids: vec![Uid::new([1, 2, 3, 4, 5, 6])],
            ..Default::default()
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = data.encode(&mut buf);
        // UidCount says 1 but the UID is cut short
        let decoded = ArtTodData::decode(&buf[..n - 1]).unwrap();
        assert!(decoded.uids.is_empty());
    }

    #[test]
    fn test_tod_request_count_bounded_by_buffer() {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = ArtTodRequest {
            net: 0,
            command: TOD_FULL,
            addresses: &[0x01, 0x02, 0x03],
        }
        .encode(&mut buf);
        assert_eq!(n, 27);
        let request = ArtTodRequest::decode(&buf[..26]).unwrap();
        assert_eq!(request.addresses, &[0x01, 0x02]);
    }

    #[test]
    fn test_tod_control_rejects_unknown_command() {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = ArtTodControl {
            net: 0,
            command: TodControlCommand::Flush,
            address: 3,
        }
        .encode(&mut buf);
        assert_eq!(
            ArtTodControl::decode(&buf[..n]).unwrap().command,
            TodControlCommand::Flush
        );
        buf[22] = 0x42;
        assert!(ArtTodControl::decode(&buf[..n]).is_none());
    }
}
