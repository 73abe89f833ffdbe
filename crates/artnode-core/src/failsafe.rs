//! Network-loss detection and fail-safe frames
//!
//! Recorded frames live in a [`FailSafeStore`] as `MAX_PORTS` consecutive
//! blocks of `UNIVERSE_SIZE` bytes, one per port index.

use std::io;

use serde::{Deserialize, Serialize};

use crate::io::FailSafeStore;
use crate::packets::address::command;
use crate::port::{MAX_PORTS, UNIVERSE_SIZE};
use crate::status::status3;

/// Size of the fail-safe region
pub const FAILSAFE_STORE_SIZE: usize = MAX_PORTS * UNIVERSE_SIZE;

/// Output behaviour when network data is lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailSafe {
    /// Hold the last frame
    #[default]
    Last,
    /// Blackout
    Off,
    /// All slots full
    On,
    /// Replay the recorded scene
    Playback,
    /// Record the current output as the scene. Not a loss action.
    Record,
}

impl FailSafe {
    /// Map an ArtAddress fail-safe command (AcFailHold..AcFailRecord)
    pub fn from_address_command(cmd: u8) -> Option<Self> {
        match cmd {
            command::FAIL_HOLD => Some(Self::Last),
            command::FAIL_ZERO => Some(Self::Off),
            command::FAIL_FULL => Some(Self::On),
            command::FAIL_SCENE => Some(Self::Playback),
            command::FAIL_RECORD => Some(Self::Record),
            _ => None,
        }
    }

    /// Status3 network-loss bits
    pub fn status3_bits(self) -> u8 {
        match self {
            Self::Last | Self::Record => status3::NETWORKLOSS_LAST_STATE,
            Self::Off => status3::NETWORKLOSS_OFF_STATE,
            Self::On => status3::NETWORKLOSS_ON_STATE,
            Self::Playback => status3::NETWORKLOSS_PLAYBACK,
        }
    }
}

/// Watches the time since the last received packet
#[derive(Debug, Clone)]
pub struct NetworkLossMonitor {
    timeout_millis: u32,
    last_packet_millis: u32,
}

impl NetworkLossMonitor {
    /// `timeout_millis == 0` disables detection
    pub fn new(timeout_millis: u32) -> Self {
        Self {
            timeout_millis,
            last_packet_millis: 0,
        }
    }

    pub fn timeout_millis(&self) -> u32 {
        self.timeout_millis
    }

    pub fn set_timeout_millis(&mut self, timeout_millis: u32) {
        self.timeout_millis = timeout_millis;
    }

    /// Record packet activity
    pub fn touch(&mut self, now: u32) {
        self.last_packet_millis = now;
    }

    pub fn is_lost(&self, now: u32) -> bool {
        self.timeout_millis != 0 && now.wrapping_sub(self.last_packet_millis) >= self.timeout_millis
    }
}

/// Persist one frame per port inside a single write transaction
///
/// Frames shorter than a universe are zero padded.
pub fn record<'a>(
    store: &mut dyn FailSafeStore,
    frames: impl IntoIterator<Item = (usize, &'a [u8])>,
) -> io::Result<()> {
    store.write_start()?;
    let mut block = [0u8; UNIVERSE_SIZE];
    for (port, data) in frames {
        if port >= MAX_PORTS {
            continue;
        }
        let n = data.len().min(UNIVERSE_SIZE);
        block[..n].copy_from_slice(&data[..n]);
        block[n..].fill(0);
        store.write(port * UNIVERSE_SIZE, &block)?;
    }
    store.write_end()
}

/// Read back the recorded frame of each requested port
pub fn playback(
    store: &mut dyn FailSafeStore,
    ports: impl IntoIterator<Item = usize>,
    mut apply: impl FnMut(usize, &[u8]),
) -> io::Result<()> {
    store.read_start()?;
    let mut block = [0u8; UNIVERSE_SIZE];
    for port in ports {
        if port >= MAX_PORTS {
            continue;
        }
        store.read(port * UNIVERSE_SIZE, &mut block)?;
        apply(port, &block);
    }
    store.read_end()
}

/// Volatile fail-safe store for hosts without persistent storage
#[derive(Debug, Clone)]
pub struct MemoryFailSafeStore {
    data: Vec<u8>,
    writing: bool,
    reading: bool,
}

impl Default for MemoryFailSafeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFailSafeStore {
    pub fn new() -> Self {
        Self {
            data: vec![0; FAILSAFE_STORE_SIZE],
            writing: false,
            reading: false,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn range(&self, offset: usize, len: usize) -> io::Result<std::ops::Range<usize>> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("fail-safe access out of range: {}+{}", offset, len),
                )
            })?;
        Ok(offset..end)
    }
}

fn not_in_transaction(kind: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("no {} transaction open", kind))
}

impl FailSafeStore for MemoryFailSafeStore {
    fn write_start(&mut self) -> io::Result<()> {
        self.writing = true;
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> io::Result<()> {
        if !self.writing {
            return Err(not_in_transaction("write"));
        }
        let range = self.range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn write_end(&mut self) -> io::Result<()> {
        self.writing = false;
        Ok(())
    }

    fn read_start(&mut self) -> io::Result<()> {
        self.reading = true;
        Ok(())
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        if !self.reading {
            return Err(not_in_transaction("read"));
        }
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn read_end(&mut self) -> io::Result<()> {
        self.reading = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failsafe_from_command() {
        assert_eq!(FailSafe::from_address_command(0x08), Some(FailSafe::Last));
        assert_eq!(FailSafe::from_address_command(0x0B), Some(FailSafe::Playback));
        assert_eq!(FailSafe::from_address_command(0x0C), Some(FailSafe::Record));
        assert_eq!(FailSafe::from_address_command(0x0D), None);
    }

    #[test]
    fn test_status3_bits() {
        assert_eq!(FailSafe::Last.status3_bits(), 0x00);
        assert_eq!(FailSafe::Record.status3_bits(), 0x00);
        assert_eq!(FailSafe::On.status3_bits(), 0x80);
        assert_eq!(FailSafe::Off.status3_bits(), 0x40);
        assert_eq!(FailSafe::Playback.status3_bits(), 0xC0);
    }

    #[test]
    fn test_network_loss_monitor() {
        let mut monitor = NetworkLossMonitor::new(10_000);
        monitor.touch(1_000);
        assert!(!monitor.is_lost(10_999));
        assert!(monitor.is_lost(11_000));
        monitor.touch(11_500);
        assert!(!monitor.is_lost(12_000));

        let disabled = NetworkLossMonitor::new(0);
        assert!(!disabled.is_lost(u32::MAX));
    }

    #[test]
    fn test_record_and_playback() {
        let mut store = MemoryFailSafeStore::new();
        record(&mut store, [(0, &[1u8, 2, 3][..]), (2, &[9u8; UNIVERSE_SIZE][..])]).unwrap();

        let mut seen = Vec::new();
        playback(&mut store, [0, 2], |port, data| seen.push((port, data.to_vec()))).unwrap();
        assert_eq!(seen[0].0, 0);
        assert_eq!(&seen[0].1[..4], &[1, 2, 3, 0]);
        assert_eq!(seen[1].1, vec![9u8; UNIVERSE_SIZE]);
    }

    #[test]
    fn test_memory_store_requires_transaction() {
        let mut store = MemoryFailSafeStore::new();
        assert!(store.write(0, &[1]).is_err());
        store.read_start().unwrap();
        let mut buf = [0u8; 4];
        assert!(store.read(FAILSAFE_STORE_SIZE - 2, &mut buf).is_err());
    }
}
