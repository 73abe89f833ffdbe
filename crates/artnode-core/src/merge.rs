//! Dual-source DMX merge for one output port
//!
//! Slot A holds the first source seen, slot B a second concurrent source.
//! With both slots occupied the port merges: HTP takes the per-slot maximum,
//! LTP outputs the most recent frame unchanged. A third concurrent source is
//! dropped.

use std::net::Ipv4Addr;

use crate::port::{MergeMode, UNIVERSE_SIZE};
use crate::status::good_output;

/// A DMX source feeding a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub ip: Ipv4Addr,
    pub last_seen_millis: u32,
    pub physical: u8,
}

/// What happened to an incoming frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    /// Third concurrent source, frame ignored
    Dropped,
    /// Single source, frame copied to the output
    PassThrough,
    /// Two sources, output recomputed
    Merged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    A,
    B,
}

/// Merge and transmit state of one output port
#[derive(Debug, Clone)]
pub struct OutputPort {
    source_a: Option<Source>,
    source_b: Option<Source>,
    data_a: [u8; UNIVERSE_SIZE],
    data_b: [u8; UNIVERSE_SIZE],
    length_a: usize,
    length_b: usize,
    output: [u8; UNIVERSE_SIZE],
    length: usize,
    pub good_output: u8,
    pub good_output_b: u8,
    pub is_transmitting: bool,
    pub is_data_pending: bool,
    pub rdm_controller_ip: Option<Ipv4Addr>,
}

impl Default for OutputPort {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort {
    pub fn new() -> Self {
        Self {
            source_a: None,
            source_b: None,
            data_a: [0; UNIVERSE_SIZE],
            data_b: [0; UNIVERSE_SIZE],
            length_a: 0,
            length_b: 0,
            output: [0; UNIVERSE_SIZE],
            length: 0,
            good_output: 0,
            good_output_b: 0,
            is_transmitting: false,
            is_data_pending: false,
            rdm_controller_ip: None,
        }
    }

    pub fn source_a(&self) -> Option<&Source> {
        self.source_a.as_ref()
    }

    pub fn source_b(&self) -> Option<&Source> {
        self.source_b.as_ref()
    }

    /// Both slots are held by different sources
    pub fn is_merging(&self) -> bool {
        self.source_a.is_some() && self.source_b.is_some()
    }

    /// True when any source slot is occupied
    pub fn has_source(&self) -> bool {
        self.source_a.is_some() || self.source_b.is_some()
    }

    /// Live output buffer
    pub fn data(&self) -> &[u8] {
        &self.output[..self.length]
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Feed one frame from `ip` into the port
    pub fn accept(
        &mut self,
        ip: Ipv4Addr,
        physical: u8,
        data: &[u8],
        now: u32,
        mode: MergeMode,
    ) -> MergeResult {
        let slot = match (self.source_a, self.source_b) {
            (None, None) => Slot::A,
            (Some(a), None) if a.ip == ip => Slot::A,
            (None, Some(b)) if b.ip == ip => Slot::B,
            (Some(_), None) => Slot::B,
            (None, Some(_)) => Slot::A,
            (Some(a), Some(_)) if a.ip == ip => Slot::A,
            (Some(_), Some(b)) if b.ip == ip => Slot::B,
            _ => return MergeResult::Dropped,
        };

        let n = data.len().min(UNIVERSE_SIZE);
        let source = Some(Source {
            ip,
            last_seen_millis: now,
            physical,
        });
        let buffer = match slot {
            Slot::A => {
                self.source_a = source;
                self.length_a = n;
                &mut self.data_a
            }
            Slot::B => {
                self.source_b = source;
                self.length_b = n;
                &mut self.data_b
            }
        };
        buffer[..n].copy_from_slice(&data[..n]);
        buffer[n..].fill(0);

        if !self.is_merging() {
            self.good_output &= !good_output::MERGE_ACTIVE;
            self.output[..n].copy_from_slice(&data[..n]);
            self.length = n;
            return MergeResult::PassThrough;
        }

        self.good_output |= good_output::MERGE_ACTIVE;
        match mode {
            MergeMode::Htp => {
                self.length = self.length_a.max(self.length_b);
                let slots = self.data_a.iter().zip(self.data_b.iter());
                for (out, (a, b)) in self.output[..self.length].iter_mut().zip(slots) {
                    *out = (*a).max(*b);
                }
            }
            MergeMode::Ltp => {
                self.output[..n].copy_from_slice(&data[..n]);
                self.length = n;
            }
        }
        MergeResult::Merged
    }

    /// Evict sources silent for longer than `timeout_millis`
    ///
    /// Returns true when a slot was evicted.
    pub fn check_merge_timeouts(&mut self, now: u32, timeout_millis: u32) -> bool {
        let expired = |source: &Option<Source>| {
            source.is_some_and(|s| now.wrapping_sub(s.last_seen_millis) > timeout_millis)
        };
        let mut evicted = false;
        if expired(&self.source_a) {
            self.source_a = None;
            evicted = true;
        }
        if expired(&self.source_b) {
            self.source_b = None;
            evicted = true;
        }
        if !self.is_merging() {
            self.good_output &= !good_output::MERGE_ACTIVE;
        }
        evicted
    }

    /// Forget both sources
    pub fn clear_sources(&mut self) {
        self.source_a = None;
        self.source_b = None;
        self.good_output &= !good_output::MERGE_ACTIVE;
    }

    /// Drop the live frame length
    pub fn clear_output(&mut self) {
        self.length = 0;
    }

    /// Replace the live buffer (fail-safe playback, local sources)
    pub fn set_output(&mut self, data: &[u8]) {
        let n = data.len().min(UNIVERSE_SIZE);
        self.output[..n].copy_from_slice(&data[..n]);
        self.length = n;
    }
}
