use std::fmt;

/// 48-bit RDM unique ID: 16-bit manufacturer + 32-bit device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uid([u8; 6]);

impl Uid {
    pub const SIZE: usize = 6;
    pub const BROADCAST: Uid = Uid([0xFF; 6]);
    /// Upper bound of the discovery search space
    pub const MAX_DISCOVERABLE: u64 = 0xFFFF_FFFF_FFFE;

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = bytes.get(..Self::SIZE)?.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn from_u64(value: u64) -> Self {
        let b = value.to_be_bytes();
        Self([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    pub fn as_u64(&self) -> u64 {
        let b = self.0;
        u64::from_be_bytes([0, 0, b[0], b[1], b[2], b[3], b[4], b[5]])
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn manufacturer(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn device(&self) -> u32 {
        u32::from_be_bytes([self.0[2], self.0[3], self.0[4], self.0[5]])
    }

    /// Device broadcast or all-manufacturer broadcast
    pub fn is_broadcast(&self) -> bool {
        self.device() == 0xFFFF_FFFF
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:08x}", self.manufacturer(), self.device())
    }
}
