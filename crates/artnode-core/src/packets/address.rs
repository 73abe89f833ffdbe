//! ArtAddress and ArtInput

use super::{read_array, read_str, write_header, OpCode, PacketBuffer};

/// Programming value meaning "leave unchanged"
pub const PROGRAM_NO_CHANGE: u8 = 0x7F;
/// Programming value meaning "reset to the physical/default setting"
pub const PROGRAM_DEFAULTS: u8 = 0x00;
/// Bit 7 marks a programming value as a change
pub const PROGRAM_CHANGE_MASK: u8 = 0x80;

/// ArtAddress command byte
pub mod command {
    pub const NONE: u8 = 0x00;
    pub const CANCEL_MERGE: u8 = 0x01;
    pub const LED_NORMAL: u8 = 0x02;
    pub const LED_MUTE: u8 = 0x03;
    pub const LED_LOCATE: u8 = 0x04;
    pub const RESET_RX_FLAGS: u8 = 0x05;
    pub const FAIL_HOLD: u8 = 0x08;
    pub const FAIL_ZERO: u8 = 0x09;
    pub const FAIL_FULL: u8 = 0x0A;
    pub const FAIL_SCENE: u8 = 0x0B;
    pub const FAIL_RECORD: u8 = 0x0C;
    pub const MERGE_LTP_0: u8 = 0x10;
    pub const MERGE_HTP_0: u8 = 0x50;
    pub const ARTNET_SEL_0: u8 = 0x60;
    pub const ACN_SEL_0: u8 = 0x70;
    pub const CLEAR_OP_0: u8 = 0x90;
    pub const STYLE_DELTA_0: u8 = 0xA0;
    pub const STYLE_CONST_0: u8 = 0xB0;
    pub const RDM_ENABLE_0: u8 = 0xC0;
    pub const RDM_DISABLE_0: u8 = 0xD0;
}

/// ArtAddress remote programming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtAddress {
    pub net_switch: u8,
    pub bind_index: u8,
    pub short_name: [u8; 18],
    pub long_name: [u8; 64],
    pub sw_in: [u8; 4],
    pub sw_out: [u8; 4],
    pub sub_switch: u8,
    pub acn_priority: u8,
    pub command: u8,
}

impl Default for ArtAddress {
    fn default() -> Self {
        Self {
            net_switch: PROGRAM_NO_CHANGE,
            bind_index: 0,
            short_name: [0; 18],
            long_name: [0; 64],
            sw_in: [PROGRAM_NO_CHANGE; 4],
            sw_out: [PROGRAM_NO_CHANGE; 4],
            sub_switch: PROGRAM_NO_CHANGE,
            acn_priority: 0xFF,
            command: command::NONE,
        }
    }
}

impl ArtAddress {
    pub const SIZE: usize = 107;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            net_switch: buf[12],
            bind_index: buf[13],
            short_name: read_array(buf, 14),
            long_name: read_array(buf, 32),
            sw_in: read_array(buf, 96),
            sw_out: read_array(buf, 100),
            sub_switch: buf[104],
            acn_priority: buf[105],
            command: buf[106],
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Address);
        buf[12] = self.net_switch;
        buf[13] = self.bind_index;
        buf[14..32].copy_from_slice(&self.short_name);
        buf[32..96].copy_from_slice(&self.long_name);
        buf[96..100].copy_from_slice(&self.sw_in);
        buf[100..104].copy_from_slice(&self.sw_out);
        buf[104] = self.sub_switch;
        buf[105] = self.acn_priority;
        buf[106] = self.command;
        Self::SIZE
    }

    /// Requested short name, `None` when the field is empty
    pub fn short_name(&self) -> Option<String> {
        (self.short_name[0] != 0).then(|| read_str(&self.short_name))
    }

    /// Requested long name, `None` when the field is empty
    pub fn long_name(&self) -> Option<String> {
        (self.long_name[0] != 0).then(|| read_str(&self.long_name))
    }
}

/// Interpretation of a NetSwitch/SubSwitch/SwOut programming byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramValue {
    NoChange,
    Default,
    Set(u8),
}

impl ProgramValue {
    /// Decode a programming byte; `mask` selects the valid value bits
    pub fn decode(value: u8, mask: u8) -> Self {
        if value == PROGRAM_NO_CHANGE {
            Self::NoChange
        } else if value == PROGRAM_DEFAULTS {
            Self::Default
        } else if value & PROGRAM_CHANGE_MASK != 0 {
            Self::Set(value & mask)
        } else {
            Self::NoChange
        }
    }
}

/// ArtInput enables or disables input ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtInput {
    pub bind_index: u8,
    pub num_ports: u16,
    pub input: [u8; 4],
}

/// ArtInput Input[] bit 0 disables the port
pub const INPUT_DISABLE: u8 = 0x01;

impl ArtInput {
    pub const SIZE: usize = 20;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            bind_index: buf[13],
            num_ports: u16::from_be_bytes([buf[14], buf[15]]),
            input: read_array(buf, 16),
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Input);
        buf[12] = 0;
        buf[13] = self.bind_index;
        buf[14..16].copy_from_slice(&self.num_ports.to_be_bytes());
        buf[16..20].copy_from_slice(&self.input);
        Self::SIZE
    }
}
