//! ArtDmx and ArtSync

use super::{read_u16_be, write_header, OpCode, PacketBuffer, HEADER_SIZE};
use crate::port::UNIVERSE_SIZE;

/// ArtDmx frame borrowed from a receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtDmx<'a> {
    pub sequence: u8,
    pub physical: u8,
    /// 15-bit Port-Address
    pub port_address: u16,
    pub data: &'a [u8],
}

impl<'a> ArtDmx<'a> {
    pub const HEADER_SIZE: usize = 18;

    /// Decode an ArtDmx packet
    ///
    /// The slot count is the smaller of the Length field, the bytes actually
    /// present and [`UNIVERSE_SIZE`].
    pub fn decode(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < Self::HEADER_SIZE {
            return None;
        }
        let length = usize::from(read_u16_be(buf, 16));
        let available = buf.len() - Self::HEADER_SIZE;
        let n = length.min(available).min(UNIVERSE_SIZE);
        Some(Self {
            sequence: buf[12],
            physical: buf[13],
            port_address: u16::from_le_bytes([buf[14], buf[15]]) & 0x7FFF,
            data: &buf[Self::HEADER_SIZE..Self::HEADER_SIZE + n],
        })
    }

    /// Encode the frame. Odd slot counts are padded to an even length.
    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Dmx);
        buf[12] = self.sequence;
        buf[13] = self.physical;
        buf[14..16].copy_from_slice(&self.port_address.to_le_bytes());

        let n = self.data.len().min(UNIVERSE_SIZE);
        let padded = (n + 1) & !1;
        buf[16..18].copy_from_slice(&(padded as u16).to_be_bytes());
        buf[18..18 + n].copy_from_slice(&self.data[..n]);
        if padded > n {
            buf[18 + n] = 0;
        }
        Self::HEADER_SIZE + padded
    }
}

/// ArtSync carries no payload besides two aux bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtSync;

impl ArtSync {
    pub const SIZE: usize = 14;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        (buf.len() >= HEADER_SIZE).then_some(Self)
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Sync);
        buf[12] = 0;
        buf[13] = 0;
        Self::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::{decode_header, MAX_PACKET_SIZE};

    #[test]
    fn test_dmx_packet_structure() {
        let data = [1u8, 2, 3];
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = ArtDmx {
            sequence: 7,
            physical: 1,
            port_address: 0x0123,
            data: &data,
        }
        .encode(&mut buf);

        assert_eq!(decode_header(&buf[..n]), Some(OpCode::Dmx));
        assert_eq!(buf[12], 7);
        assert_eq!(buf[13], 1);
        // Port-Address little-endian
        assert_eq!(buf[14], 0x23);
        assert_eq!(buf[15], 0x01);
        // Odd length padded to 4, big-endian
        assert_eq!(buf[16], 0x00);
        assert_eq!(buf[17], 0x04);
        assert_eq!(&buf[18..22], &[1, 2, 3, 0]);
        assert_eq!(n, 22);
    }

    #[test]
    fn test_dmx_decode_clamps_length() {
        let mut buf = vec![0u8; 18 + 4];
        buf[0..8].copy_from_slice(b"Art-Net\0");
        buf[8..10].copy_from_slice(&0x5000u16.to_le_bytes());
        buf[11] = 14;
        // Length claims 512 slots, only 4 present
        buf[16] = 0x02;
        buf[17] = 0x00;
        buf[18..22].copy_from_slice(&[9, 8, 7, 6]);

        let dmx = ArtDmx::decode(&buf).unwrap();
        assert_eq!(dmx.data, &[9, 8, 7, 6]);
        assert!(ArtDmx::decode(&buf[..17]).is_none());
    }

    #[test]
    fn test_dmx_decode_masks_port_address() {
        let mut buf = vec![0u8; 20];
        buf[14] = 0xFF;
        buf[15] = 0xFF;
        buf[17] = 2;
        let dmx = ArtDmx::decode(&buf).unwrap();
        assert_eq!(dmx.port_address, 0x7FFF);
    }
}
