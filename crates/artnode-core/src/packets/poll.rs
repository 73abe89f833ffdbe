//! ArtPoll, ArtPollReply and ArtDiagData

use std::net::Ipv4Addr;

use super::{
    read_array, read_ip, read_str, read_u16_be, write_header, write_id, write_str, OpCode,
    PacketBuffer, HEADER_SIZE, UDP_PORT,
};

/// ArtPoll TalkToMe bits
pub mod talk_to_me {
    /// Send ArtPollReply whenever node conditions change
    pub const REPLY_ON_CHANGE: u8 = 1 << 1;
    /// Send diagnostics messages
    pub const DIAG_ENABLE: u8 = 1 << 2;
    /// Diagnostics are unicast to the poller instead of broadcast
    pub const DIAG_UNICAST: u8 = 1 << 3;
}

/// ArtPoll request from a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtPoll {
    pub flags: u8,
    pub diag_priority: u8,
}

impl ArtPoll {
    pub const SIZE: usize = 14;

    /// Decode an ArtPoll. Old controllers omit the priority byte.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE + 1 {
            return None;
        }
        Some(Self {
            flags: buf[12],
            diag_priority: buf.get(13).copied().unwrap_or(0),
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Poll);
        buf[12] = self.flags;
        buf[13] = self.diag_priority;
        Self::SIZE
    }

    pub fn reply_on_change(&self) -> bool {
        self.flags & talk_to_me::REPLY_ON_CHANGE != 0
    }

    pub fn diagnostics(&self) -> bool {
        self.flags & talk_to_me::DIAG_ENABLE != 0
    }

    pub fn diagnostics_unicast(&self) -> bool {
        self.flags & talk_to_me::DIAG_UNICAST != 0
    }
}

/// Snapshot of the fields carried by one ArtPollReply (one bind page)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReply {
    pub ip: Ipv4Addr,
    pub firmware_version: u16,
    pub net_switch: u8,
    pub sub_switch: u8,
    pub oem: u16,
    pub ubea_version: u8,
    pub status1: u8,
    pub esta_manufacturer: u16,
    pub short_name: String,
    pub long_name: String,
    pub node_report: String,
    pub num_ports: u16,
    pub port_types: [u8; 4],
    pub good_input: [u8; 4],
    pub good_output: [u8; 4],
    pub sw_in: [u8; 4],
    pub sw_out: [u8; 4],
    pub acn_priority: u8,
    pub sw_macro: u8,
    pub sw_remote: u8,
    pub style: u8,
    pub mac: [u8; 6],
    pub bind_ip: Ipv4Addr,
    pub bind_index: u8,
    pub status2: u8,
    pub good_output_b: [u8; 4],
    pub status3: u8,
    pub default_responder_uid: [u8; 6],
    pub user: u16,
    pub refresh_rate: u16,
}

impl Default for PollReply {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::UNSPECIFIED,
            firmware_version: 0,
            net_switch: 0,
            sub_switch: 0,
            oem: 0x00FF,
            ubea_version: 0,
            status1: 0,
            esta_manufacturer: 0,
            short_name: String::new(),
            long_name: String::new(),
            node_report: String::new(),
            num_ports: 0,
            port_types: [0; 4],
            good_input: [0; 4],
            good_output: [0; 4],
            sw_in: [0; 4],
            sw_out: [0; 4],
            acn_priority: 100,
            sw_macro: 0,
            sw_remote: 0,
            style: STYLE_NODE,
            mac: [0; 6],
            bind_ip: Ipv4Addr::UNSPECIFIED,
            bind_index: 1,
            status2: 0,
            good_output_b: [0; 4],
            status3: 0,
            default_responder_uid: [0; 6],
            user: 0,
            refresh_rate: 44,
        }
    }
}

/// StNode: a DMX to/from Art-Net device
pub const STYLE_NODE: u8 = 0x00;

impl PollReply {
    pub const SIZE: usize = 239;
    pub const SHORT_NAME_LENGTH: usize = 18;
    pub const LONG_NAME_LENGTH: usize = 64;
    pub const REPORT_LENGTH: usize = 64;

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        let packet = &mut buf[..Self::SIZE];
        packet.fill(0);

        // ArtPollReply has no ProtVer field
        write_id(packet, OpCode::PollReply);
        packet[10..14].copy_from_slice(&self.ip.octets());
        packet[14..16].copy_from_slice(&UDP_PORT.to_le_bytes());
        packet[16..18].copy_from_slice(&self.firmware_version.to_be_bytes());
        packet[18] = self.net_switch;
        packet[19] = self.sub_switch;
        packet[20..22].copy_from_slice(&self.oem.to_be_bytes());
        packet[22] = self.ubea_version;
        packet[23] = self.status1;
        // EstaMan is transmitted low byte first
        packet[24..26].copy_from_slice(&self.esta_manufacturer.to_le_bytes());
        write_str(&mut packet[26..44], &self.short_name);
        write_str(&mut packet[44..108], &self.long_name);
        write_str(&mut packet[108..172], &self.node_report);
        packet[172..174].copy_from_slice(&self.num_ports.to_be_bytes());
        packet[174..178].copy_from_slice(&self.port_types);
        packet[178..182].copy_from_slice(&self.good_input);
        packet[182..186].copy_from_slice(&self.good_output);
        packet[186..190].copy_from_slice(&self.sw_in);
        packet[190..194].copy_from_slice(&self.sw_out);
        packet[194] = self.acn_priority;
        packet[195] = self.sw_macro;
        packet[196] = self.sw_remote;
        // 197..200 spare
        packet[200] = self.style;
        packet[201..207].copy_from_slice(&self.mac);
        packet[207..211].copy_from_slice(&self.bind_ip.octets());
        packet[211] = self.bind_index;
        packet[212] = self.status2;
        packet[213..217].copy_from_slice(&self.good_output_b);
        packet[217] = self.status3;
        packet[218..224].copy_from_slice(&self.default_responder_uid);
        packet[224..226].copy_from_slice(&self.user.to_be_bytes());
        packet[226..228].copy_from_slice(&self.refresh_rate.to_be_bytes());
        // 228..239 filler

        Self::SIZE
    }

    /// Decode a reply sent by another node. Art-Net 3 replies (shorter than
    /// 239 bytes) are accepted as long as the port fields are present.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < 207 {
            return None;
        }
        let at = |offset: usize| buf.get(offset).copied().unwrap_or(0);
        let mut bind_ip = [0u8; 4];
        let mut good_output_b = [0u8; 4];
        let mut uid = [0u8; 6];
        if buf.len() >= Self::SIZE {
            bind_ip = read_array(buf, 207);
            good_output_b = read_array(buf, 213);
            uid = read_array(buf, 218);
        }
        Some(Self {
            ip: read_ip(buf, 10),
            firmware_version: read_u16_be(buf, 16),
            net_switch: buf[18],
            sub_switch: buf[19],
            oem: read_u16_be(buf, 20),
            ubea_version: buf[22],
            status1: buf[23],
            esta_manufacturer: u16::from_le_bytes([buf[24], buf[25]]),
            short_name: read_str(&buf[26..44]),
            long_name: read_str(&buf[44..108]),
            node_report: read_str(&buf[108..172]),
            num_ports: read_u16_be(buf, 172),
            port_types: read_array(buf, 174),
            good_input: read_array(buf, 178),
            good_output: read_array(buf, 182),
            sw_in: read_array(buf, 186),
            sw_out: read_array(buf, 190),
            acn_priority: buf[194],
            sw_macro: buf[195],
            sw_remote: buf[196],
            style: buf[200],
            mac: read_array(buf, 201),
            bind_ip: Ipv4Addr::from(bind_ip),
            bind_index: at(211),
            status2: at(212),
            good_output_b,
            status3: at(217),
            default_responder_uid: uid,
            user: u16::from_be_bytes([at(224), at(225)]),
            refresh_rate: u16::from_be_bytes([at(226), at(227)]),
        })
    }
}

/// ArtDiagData text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDiagData<'a> {
    pub priority: u8,
    pub logical_port: u8,
    pub text: &'a str,
}

/// Diagnostics priority codes
pub mod diag_priority {
    pub const LOW: u8 = 0x10;
    pub const MED: u8 = 0x40;
    pub const HIGH: u8 = 0x80;
    pub const CRITICAL: u8 = 0xE0;
    pub const VOLATILE: u8 = 0xF0;
}

impl ArtDiagData<'_> {
    pub const HEADER_SIZE: usize = 18;
    pub const MAX_DATA: usize = 512;

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::DiagData);
        buf[12] = 0;
        buf[13] = self.priority;
        buf[14] = self.logical_port;
        buf[15] = 0;
        // Text plus terminating NUL
        let bytes = self.text.as_bytes();
        let n = bytes.len().min(Self::MAX_DATA - 1);
        buf[18..18 + n].copy_from_slice(&bytes[..n]);
        buf[18 + n] = 0;
        let length = (n + 1) as u16;
        buf[16..18].copy_from_slice(&length.to_be_bytes());
        Self::HEADER_SIZE + n + 1
    }
}
