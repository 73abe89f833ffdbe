//! ArtTimeCode, ArtTimeSync and ArtTrigger

use serde::{Deserialize, Serialize};

use super::{read_u16_be, write_header, OpCode, PacketBuffer};

/// Frame rate carried in ArtTimeCode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeCodeType {
    /// 24 fps
    Film,
    /// 25 fps
    Ebu,
    /// 29.97 fps drop frame
    Df,
    /// 30 fps
    Smpte,
}

impl TimeCodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Film),
            1 => Some(Self::Ebu),
            2 => Some(Self::Df),
            3 => Some(Self::Smpte),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Film => 0,
            Self::Ebu => 1,
            Self::Df => 2,
            Self::Smpte => 3,
        }
    }

    /// Frames per second, rounded up for drop frame
    pub fn frames_per_second(self) -> u8 {
        match self {
            Self::Film => 24,
            Self::Ebu => 25,
            Self::Df | Self::Smpte => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtTimeCode {
    pub stream_id: u8,
    pub frames: u8,
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub kind: TimeCodeType,
}

impl ArtTimeCode {
    pub const SIZE: usize = 19;

    /// Decode; out-of-range fields are rejected
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        let kind = TimeCodeType::from_u8(buf[18])?;
        let tc = Self {
            stream_id: buf[13],
            frames: buf[14],
            seconds: buf[15],
            minutes: buf[16],
            hours: buf[17],
            kind,
        };
        let valid = tc.frames < kind.frames_per_second()
            && tc.seconds < 60
            && tc.minutes < 60
            && tc.hours < 24;
        valid.then_some(tc)
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::TimeCode);
        buf[12] = 0;
        buf[13] = self.stream_id;
        buf[14] = self.frames;
        buf[15] = self.seconds;
        buf[16] = self.minutes;
        buf[17] = self.hours;
        buf[18] = self.kind.as_u8();
        Self::SIZE
    }
}

/// ArtTimeSync wall-clock distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtTimeSync {
    pub prog: u8,
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub day_of_month: u8,
    /// 0-based month
    pub month: u8,
    /// Years since 1900
    pub year: u16,
    pub weekday: u8,
    pub is_dst: u8,
}

impl ArtTimeSync {
    pub const SIZE: usize = 24;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            prog: buf[14],
            seconds: buf[15],
            minutes: buf[16],
            hours: buf[17],
            day_of_month: buf[18],
            month: buf[19],
            year: read_u16_be(buf, 20),
            weekday: buf[22],
            is_dst: buf[23],
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::TimeSync);
        buf[12] = 0;
        buf[13] = 0;
        buf[14] = self.prog;
        buf[15] = self.seconds;
        buf[16] = self.minutes;
        buf[17] = self.hours;
        buf[18] = self.day_of_month;
        buf[19] = self.month;
        buf[20..22].copy_from_slice(&self.year.to_be_bytes());
        buf[22] = self.weekday;
        buf[23] = self.is_dst;
        Self::SIZE
    }
}

/// OEM code addressing every node in an ArtTrigger
pub const TRIGGER_OEM_ALL: u16 = 0xFFFF;

/// ArtTrigger macro/key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtTrigger<'a> {
    pub oem: u16,
    pub key: u8,
    pub sub_key: u8,
    pub data: &'a [u8],
}

/// Key values defined for OEM code 0xFFFF
pub mod trigger_key {
    pub const ASCII: u8 = 0;
    pub const MACRO: u8 = 1;
    pub const SOFT: u8 = 2;
    pub const SHOW: u8 = 3;
}

impl<'a> ArtTrigger<'a> {
    pub const HEADER_SIZE: usize = 18;
    pub const MAX_DATA: usize = 512;

    pub fn decode(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < Self::HEADER_SIZE {
            return None;
        }
        let end = buf.len().min(Self::HEADER_SIZE + Self::MAX_DATA);
        Some(Self {
            oem: read_u16_be(buf, 14),
            key: buf[16],
            sub_key: buf[17],
            data: &buf[Self::HEADER_SIZE..end],
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> usize {
        write_header(buf, OpCode::Trigger);
        buf[12] = 0;
        buf[13] = 0;
        buf[14..16].copy_from_slice(&self.oem.to_be_bytes());
        buf[16] = self.key;
        buf[17] = self.sub_key;
        let n = self.data.len().min(Self::MAX_DATA);
        buf[18..18 + n].copy_from_slice(&self.data[..n]);
        Self::HEADER_SIZE + n
    }

    /// True when the trigger is for `oem` or for every node
    pub fn is_for(&self, oem: u16) -> bool {
        self.oem == oem || self.oem == TRIGGER_OEM_ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::MAX_PACKET_SIZE;

    #[test]
    fn test_time_code_layout() {
        let tc = ArtTimeCode {
            stream_id: 0,
            frames: 24,
            seconds: 59,
            minutes: 1,
            hours: 23,
            kind: TimeCodeType::Ebu,
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = tc.encode(&mut buf);
        assert_eq!(n, 19);
        assert_eq!(&buf[14..19], &[24, 59, 1, 23, 1]);
        assert_eq!(ArtTimeCode::decode(&buf[..n]), Some(tc));
    }

    #[test]
    fn test_time_code_rejects_invalid_frames() {
        let tc = ArtTimeCode {
            stream_id: 0,
            frames: 24,
            seconds: 0,
            minutes: 0,
            hours: 0,
            kind: TimeCodeType::Film,
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = tc.encode(&mut buf);
        assert_eq!(ArtTimeCode::decode(&buf[..n]), None);
        buf[18] = 9;
        assert_eq!(ArtTimeCode::decode(&buf[..n]), None);
    }

    #[test]
    fn test_time_sync_year() {
        let sync = ArtTimeSync {
            year: 126,
            month: 9,
            day_of_month: 19,
            ..Default::default()
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = sync.encode(&mut buf);
        assert_eq!(n, 24);
        assert_eq!(buf[20], 0);
        assert_eq!(buf[21], 126);
        assert_eq!(ArtTimeSync::decode(&buf[..n]), Some(sync));
    }

    #[test]
    fn test_trigger_oem_filter() {
        let data = [1u8, 2];
        let trigger = ArtTrigger {
            oem: 0x2828,
            key: trigger_key::MACRO,
            sub_key: 5,
            data: &data,
        };
        assert!(trigger.is_for(0x2828));
        assert!(!trigger.is_for(0x00FF));
        let all = ArtTrigger {
            oem: TRIGGER_OEM_ALL,
            ..trigger
        };
        assert!(all.is_for(0x00FF));

        let mut buf = [0u8; MAX_PACKET_SIZE];
        let n = trigger.encode(&mut buf);
        assert_eq!(ArtTrigger::decode(&buf[..n]), Some(trigger));
    }
}
