//! RDM (E1.20) message and discovery-response framing

use super::Uid;

pub const SC_RDM: u8 = 0xCC;
pub const SC_SUB_MESSAGE: u8 = 0x01;

pub const PREAMBLE_BYTE: u8 = 0xFE;
pub const SEPARATOR_BYTE: u8 = 0xAA;

/// Start code through PDL
pub const RDM_HEADER_SIZE: usize = 24;
pub const RDM_CHECKSUM_SIZE: usize = 2;
pub const RDM_MAX_PARAMETER_DATA_LENGTH: usize = 231;
/// Encoded UID plus checksum, without preamble and separator
pub const RDM_DISCOVERY_RESPONSE_SIZE: usize = 16;
/// Including 7 bytes preamble + 1 byte separator
pub const RDM_MAX_DISCOVERY_RESPONSE_SIZE: usize = RDM_DISCOVERY_RESPONSE_SIZE + 8;

pub mod command_class {
    pub const DISCOVERY_COMMAND: u8 = 0x10;
    pub const DISCOVERY_COMMAND_RESPONSE: u8 = 0x11;
    pub const GET_COMMAND: u8 = 0x20;
    pub const GET_COMMAND_RESPONSE: u8 = 0x21;
    pub const SET_COMMAND: u8 = 0x30;
    pub const SET_COMMAND_RESPONSE: u8 = 0x31;
}

pub mod pid {
    pub const DISC_UNIQUE_BRANCH: u16 = 0x0001;
    pub const DISC_MUTE: u16 = 0x0002;
    pub const DISC_UN_MUTE: u16 = 0x0003;
}

/// Response type carried in the PortID field of responses
pub const RESPONSE_TYPE_ACK: u8 = 0x00;

/// A framed RDM message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdmMessage {
    pub destination: Uid,
    pub source: Uid,
    pub transaction: u8,
    /// Port ID in requests, response type in responses
    pub port_id: u8,
    pub message_count: u8,
    pub sub_device: u16,
    pub command_class: u8,
    pub parameter_id: u16,
    pub data: Vec<u8>,
}

impl RdmMessage {
    /// Discovery request without parameter data
    pub fn discovery(destination: Uid, source: Uid, transaction: u8, parameter_id: u16) -> Self {
        Self {
            destination,
            source,
            transaction,
            port_id: 1,
            message_count: 0,
            sub_device: 0,
            command_class: command_class::DISCOVERY_COMMAND,
            parameter_id,
            data: Vec::new(),
        }
    }

    /// DISC_UNIQUE_BRANCH over `[lower, upper]`
    pub fn unique_branch(source: Uid, transaction: u8, lower: Uid, upper: Uid) -> Self {
        let mut msg = Self::discovery(Uid::BROADCAST, source, transaction, pid::DISC_UNIQUE_BRANCH);
        msg.data.extend_from_slice(lower.as_bytes());
        msg.data.extend_from_slice(upper.as_bytes());
        msg
    }

    pub fn is_response(&self) -> bool {
        matches!(
            self.command_class,
            command_class::DISCOVERY_COMMAND_RESPONSE
                | command_class::GET_COMMAND_RESPONSE
                | command_class::SET_COMMAND_RESPONSE
        )
    }

    pub fn is_get_set_response(&self) -> bool {
        matches!(
            self.command_class,
            command_class::GET_COMMAND_RESPONSE | command_class::SET_COMMAND_RESPONSE
        )
    }

    pub fn is_get_set_command(&self) -> bool {
        matches!(
            self.command_class,
            command_class::GET_COMMAND | command_class::SET_COMMAND
        )
    }

    /// Encode with start code and checksum
    pub fn encode(&self) -> Vec<u8> {
        let pdl = self.data.len().min(RDM_MAX_PARAMETER_DATA_LENGTH);
        let length = RDM_HEADER_SIZE + pdl;
        let mut frame = Vec::with_capacity(length + RDM_CHECKSUM_SIZE);
        frame.push(SC_RDM);
        frame.push(SC_SUB_MESSAGE);
        frame.push(length as u8);
        frame.extend_from_slice(self.destination.as_bytes());
        frame.extend_from_slice(self.source.as_bytes());
        frame.push(self.transaction);
        frame.push(self.port_id);
        frame.push(self.message_count);
        frame.extend_from_slice(&self.sub_device.to_be_bytes());
        frame.push(self.command_class);
        frame.extend_from_slice(&self.parameter_id.to_be_bytes());
        frame.push(pdl as u8);
        frame.extend_from_slice(&self.data[..pdl]);
        let sum = checksum(&frame);
        frame.extend_from_slice(&sum.to_be_bytes());
        frame
    }

    /// Decode a frame that starts with the RDM start code
    ///
    /// Returns `None` on framing or checksum errors.
    pub fn decode(frame: &[u8]) -> Option<Self> {
        if frame.len() < RDM_HEADER_SIZE + RDM_CHECKSUM_SIZE
            || frame[0] != SC_RDM
            || frame[1] != SC_SUB_MESSAGE
        {
            return None;
        }
        let length = usize::from(frame[2]);
        let pdl = usize::from(frame[23]);
        if length != RDM_HEADER_SIZE + pdl || frame.len() < length + RDM_CHECKSUM_SIZE {
            return None;
        }
        let expected = u16::from_be_bytes([frame[length], frame[length + 1]]);
        if checksum(&frame[..length]) != expected {
            return None;
        }
        Some(Self {
            destination: Uid::from_slice(&frame[3..9])?,
            source: Uid::from_slice(&frame[9..15])?,
            transaction: frame[15],
            port_id: frame[16],
            message_count: frame[17],
            sub_device: u16::from_be_bytes([frame[18], frame[19]]),
            command_class: frame[20],
            parameter_id: u16::from_be_bytes([frame[21], frame[22]]),
            data: frame[RDM_HEADER_SIZE..length].to_vec(),
        })
    }

    /// Decode a frame as carried by ArtRdm (no start code)
    pub fn decode_without_start_code(packet: &[u8]) -> Option<Self> {
        let mut frame = Vec::with_capacity(packet.len() + 1);
        frame.push(SC_RDM);
        frame.extend_from_slice(packet);
        Self::decode(&frame)
    }

    /// Response to this request with the given command class and data
    pub fn response(&self, source: Uid, data: Vec<u8>) -> Self {
        Self {
            destination: self.source,
            source,
            transaction: self.transaction,
            port_id: RESPONSE_TYPE_ACK,
            message_count: 0,
            sub_device: self.sub_device,
            command_class: self.command_class | 0x01,
            parameter_id: self.parameter_id,
            data,
        }
    }
}

/// 16-bit additive checksum
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Encode a DISC_UNIQUE_BRANCH response for `uid`
pub fn encode_discovery_response(uid: &Uid) -> [u8; RDM_MAX_DISCOVERY_RESPONSE_SIZE] {
    let mut frame = [0u8; RDM_MAX_DISCOVERY_RESPONSE_SIZE];
    frame[..7].fill(PREAMBLE_BYTE);
    frame[7] = SEPARATOR_BYTE;
    for (i, &b) in uid.as_bytes().iter().enumerate() {
        frame[8 + i * 2] = b | 0xAA;
        frame[9 + i * 2] = b | 0x55;
    }
    let sum = checksum(&frame[8..20]);
    let [hi, lo] = sum.to_be_bytes();
    frame[20] = hi | 0xAA;
    frame[21] = hi | 0x55;
    frame[22] = lo | 0xAA;
    frame[23] = lo | 0x55;
    frame
}

/// Decode a DISC_UNIQUE_BRANCH response
///
/// Up to seven preamble bytes may precede the separator. Collisions show up
/// as framing or checksum errors and return `None`.
pub fn decode_discovery_response(frame: &[u8]) -> Option<Uid> {
    let preamble = frame.iter().take_while(|&&b| b == PREAMBLE_BYTE).count();
    if preamble > 7 || frame.get(preamble) != Some(&SEPARATOR_BYTE) {
        return None;
    }
    let body = frame.get(preamble + 1..preamble + 1 + RDM_DISCOVERY_RESPONSE_SIZE)?;

    let mut uid = [0u8; 6];
    for (i, pair) in body[..12].chunks_exact(2).enumerate() {
        uid[i] = pair[0] & pair[1];
    }
    let received = u16::from_be_bytes([body[12] & body[13], body[14] & body[15]]);
    (checksum(&body[..12]) == received).then_some(Uid::new(uid))
}
