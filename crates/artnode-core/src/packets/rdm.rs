//! ArtRdm

use super::{write_header, OpCode, PacketBuffer};

/// ArtRdm carries one RDM message without its start code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtRdm<'a> {
    pub rdm_version: u8,
    pub net: u8,
    pub command: u8,
    pub address: u8,
    /// RDM message starting at the sub-start code
    pub rdm_packet: &'a [u8],
}

/// ArAcProcess: process the packet
pub const RDM_COMMAND_PROCESS: u8 = 0x00;

impl<'a> ArtRdm<'a> {
    pub const HEADER_SIZE: usize = 24;
    /// Largest RDM message (without start code) including checksum
    pub const MAX_RDM_PACKET: usize = 256;

    pub fn decode(buf: &'a [u8]) -> Option<Self> {
        if buf.len() <= Self::HEADER_SIZE {
            return None;
        }
        let end = buf.len().min(Self::HEADER_SIZE + Self::MAX_RDM_PACKET);
        Some(Self {
            rdm_version: buf[12],
            net: buf[21],
            command: buf[22],
            address: buf[23],
            rdm_packet: &buf[Self::HEADER_SIZE..end],
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Rdm);
        buf[12] = self.rdm_version;
        buf[13..21].fill(0);
        buf[21] = self.net;
        buf[22] = self.command;
        buf[23] = self.address;
        let n = self.rdm_packet.len().min(Self::MAX_RDM_PACKET);
        buf[24..24 + n].copy_from_slice(&self.rdm_packet[..n]);
        Self::HEADER_SIZE + n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::MAX_PACKET_SIZE;

    #[test]
    fn test_rdm_layout() {
        let payload = [0x01, 0x18, 0xAA, 0xBB];
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = ArtRdm {
            rdm_version: 1,
            net: 0,
            command: RDM_COMMAND_PROCESS,
            address: 0x05,
            rdm_packet: &payload,
        }
        .encode(&mut buf);
        assert_eq!(n, 28);
        assert_eq!(buf[12], 1);
        assert_eq!(buf[23], 0x05);
        assert_eq!(&buf[24..28], &payload);

        let decoded = ArtRdm::decode(&buf[..n]).unwrap();
        assert_eq!(decoded.rdm_packet, &payload);
        // Header without payload
        assert!(ArtRdm::decode(&buf[..24]).is_none());
    }
}
