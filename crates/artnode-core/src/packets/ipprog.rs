//! ArtIpProg and ArtIpProgReply

use std::net::Ipv4Addr;

use super::{read_ip, read_u16_be, write_header, OpCode, PacketBuffer, UDP_PORT};

/// ArtIpProg command bits
pub mod command {
    /// Any programming at all
    pub const ENABLE_PROGRAMMING: u8 = 1 << 7;
    pub const ENABLE_DHCP: u8 = 1 << 6;
    pub const PROGRAM_GATEWAY: u8 = 1 << 4;
    pub const RESET_TO_DEFAULT: u8 = 1 << 3;
    pub const PROGRAM_IP: u8 = 1 << 2;
    pub const PROGRAM_NETMASK: u8 = 1 << 1;
    pub const PROGRAM_PORT: u8 = 1 << 0;
}

/// ArtIpProg request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtIpProg {
    pub command: u8,
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub port: u16,
    pub gateway: Ipv4Addr,
}

impl ArtIpProg {
    pub const SIZE: usize = 34;
    /// Art-Net 3 controllers omit the gateway
    pub const MIN_SIZE: usize = 26;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::MIN_SIZE {
            return None;
        }
        let gateway = if buf.len() >= 30 {
            read_ip(buf, 26)
        } else {
            Ipv4Addr::UNSPECIFIED
        };
        Some(Self {
            command: buf[14],
            ip: read_ip(buf, 16),
            netmask: read_ip(buf, 20),
            port: read_u16_be(buf, 24),
            gateway,
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::IpProg);
        buf[12..14].fill(0);
        buf[14] = self.command;
        buf[15] = 0;
        buf[16..20].copy_from_slice(&self.ip.octets());
        buf[20..24].copy_from_slice(&self.netmask.octets());
        buf[24..26].copy_from_slice(&self.port.to_be_bytes());
        buf[26..30].copy_from_slice(&self.gateway.octets());
        buf[30..34].fill(0);
        Self::SIZE
    }

    pub fn has(&self, bit: u8) -> bool {
        self.command & command::ENABLE_PROGRAMMING != 0 && self.command & bit != 0
    }
}

/// ArtIpProgReply status bit: DHCP enabled
pub const REPLY_STATUS_DHCP: u8 = 1 << 6;

/// ArtIpProgReply with the node's current settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtIpProgReply {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dhcp: bool,
}

impl ArtIpProgReply {
    pub const SIZE: usize = 34;

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::IpProgReply);
        buf[12..16].fill(0);
        buf[16..20].copy_from_slice(&self.ip.octets());
        buf[20..24].copy_from_slice(&self.netmask.octets());
        buf[24..26].copy_from_slice(&UDP_PORT.to_be_bytes());
        buf[26] = if self.dhcp { REPLY_STATUS_DHCP } else { 0 };
        buf[27] = 0;
        buf[28..32].copy_from_slice(&self.gateway.octets());
        buf[32..34].fill(0);
        Self::SIZE
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            ip: read_ip(buf, 16),
            netmask: read_ip(buf, 20),
            gateway: read_ip(buf, 28),
            dhcp: buf[26] & REPLY_STATUS_DHCP != 0,
        })
    }
}
