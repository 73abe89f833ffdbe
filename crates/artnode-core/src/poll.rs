//! ArtPollReply scheduling
//!
//! Replies are rate limited per node: a poll arriving within `reply_delay`
//! of the previous reply is queued (at most [`POLL_REPLY_QUEUE_SIZE`]
//! destinations) and answered once its delay has elapsed.

use std::net::Ipv4Addr;

use tracing::trace;

/// Outstanding replies kept at most
pub const POLL_REPLY_QUEUE_SIZE: usize = 4;

/// Reply delay derived from the low 16 bits of the MAC address
pub fn reply_delay_from_mac(mac: &[u8; 6]) -> u32 {
    u32::from(u16::from_be_bytes([mac[4], mac[5]])) % 1000
}

/// A queued reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    pub destination_ip: Ipv4Addr,
    pub scheduled_at_millis: u32,
}

/// Outcome of a poll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    /// Reply now
    SendNow,
    /// Reply later from the queue
    Queued,
    /// Already queued for this destination
    AlreadyQueued,
    /// Queue full, request dropped
    Dropped,
}

#[derive(Debug, Clone)]
pub struct PollReplyQueue {
    entries: [Option<PendingReply>; POLL_REPLY_QUEUE_SIZE],
    delay_millis: u32,
    last_reply_millis: Option<u32>,
}

impl PollReplyQueue {
    pub fn new(delay_millis: u32) -> Self {
        Self {
            entries: [None; POLL_REPLY_QUEUE_SIZE],
            delay_millis,
            last_reply_millis: None,
        }
    }

    pub fn delay_millis(&self) -> u32 {
        self.delay_millis
    }

    /// Decide how to answer a poll from `destination_ip`
    pub fn request(&mut self, destination_ip: Ipv4Addr, now: u32) -> PollAction {
        let rate_limited = self
            .last_reply_millis
            .is_some_and(|last| now.wrapping_sub(last) < self.delay_millis);
        if !rate_limited && self.is_empty() {
            return PollAction::SendNow;
        }

        if self
            .entries
            .iter()
            .flatten()
            .any(|entry| entry.destination_ip == destination_ip)
        {
            return PollAction::AlreadyQueued;
        }

        match self.entries.iter_mut().find(|entry| entry.is_none()) {
            Some(slot) => {
                *slot = Some(PendingReply {
                    destination_ip,
                    scheduled_at_millis: now,
                });
                trace!("Queued ArtPollReply for {}", destination_ip);
                PollAction::Queued
            }
            None => PollAction::Dropped,
        }
    }

    /// Note that a reply went out
    pub fn mark_sent(&mut self, now: u32) {
        self.last_reply_millis = Some(now);
    }

    /// Remove and return the next entry whose delay has elapsed
    pub fn take_due(&mut self, now: u32) -> Option<Ipv4Addr> {
        let delay = self.delay_millis;
        let slot = self.entries.iter_mut().find(|entry| {
            entry.is_some_and(|e| now.wrapping_sub(e.scheduled_at_millis) > delay)
        })?;
        slot.take().map(|entry| entry.destination_ip)
    }

    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.entries = [None; POLL_REPLY_QUEUE_SIZE];
    }
}
