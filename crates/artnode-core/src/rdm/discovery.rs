//! E1.20 binary-search discovery as a stepped state machine
//!
//! Each [`Discovery::step`] performs at most one bus transaction, so the
//! poll loop is never held longer than the transport's receive timeout.
//!
//! A full pass resets the TOD, un-mutes every responder and searches the
//! whole UID space. An incremental pass keeps the TOD, re-mutes the known
//! devices (dropping those that no longer answer) and then searches for new
//! ones. A range is queried again only after a UID new to the TOD has been
//! muted, which bounds the search.

use tracing::{debug, info, warn};

use super::message::{command_class, decode_discovery_response, pid, RdmMessage};
use super::{Tod, Uid};
use crate::io::RdmTransport;

/// Receive timeout for discovery responses
pub const RECEIVE_TIMEOUT_MICROS: u32 = 2_800;
/// Attempts to mute a single device
pub const MUTE_RETRIES: u8 = 10;
/// Attempts to get an answer to a DISC_UNIQUE_BRANCH
pub const BRANCH_RETRIES: u8 = 3;
/// DISC_UN_MUTE broadcasts sent before searching
const UN_MUTE_REPEATS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Full,
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Branch {
    lower: u64,
    upper: u64,
}

impl Branch {
    const ALL: Branch = Branch {
        lower: 0,
        upper: Uid::MAX_DISCOVERABLE,
    };

    fn contains(&self, uid: &Uid) -> bool {
        (self.lower..=self.upper).contains(&uid.as_u64())
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingMute {
    uid: Uid,
    /// Range the UID was found in, searched again after a successful mute
    branch: Option<Branch>,
    attempts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    UnMute { remaining: u8 },
    MuteKnown { pending: Vec<Uid>, attempts: u8 },
    Search,
    Finished,
}

/// Discovery state of one port
#[derive(Debug, Clone)]
pub struct Discovery {
    source: Uid,
    phase: Phase,
    mode: DiscoveryMode,
    stack: Vec<Branch>,
    pending_mute: Option<PendingMute>,
    branch_attempts: u8,
    transaction: u8,
}

impl Discovery {
    /// `source` is the controller UID put on every request
    pub fn new(source: Uid) -> Self {
        Self {
            source,
            phase: Phase::Idle,
            mode: DiscoveryMode::Full,
            stack: Vec::new(),
            pending_mute: None,
            branch_attempts: 0,
            transaction: 0,
        }
    }

    /// Start a full pass; the TOD is cleared
    pub fn full(&mut self, tod: &mut Tod) {
        tod.reset();
        self.begin(DiscoveryMode::Full);
    }

    /// Start an incremental pass over an existing TOD
    pub fn incremental(&mut self) {
        self.begin(DiscoveryMode::Incremental);
    }

    fn begin(&mut self, mode: DiscoveryMode) {
        self.mode = mode;
        self.phase = Phase::UnMute {
            remaining: UN_MUTE_REPEATS,
        };
        self.stack.clear();
        self.stack.push(Branch::ALL);
        self.pending_mute = None;
        self.branch_attempts = 0;
    }

    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.stack.clear();
        self.pending_mute = None;
    }

    pub fn mode(&self) -> DiscoveryMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Finished)
    }

    /// The last pass ran to completion; stays true until a new pass starts
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Advance by at most one bus transaction
    pub fn step(&mut self, port: usize, transport: &mut dyn RdmTransport, tod: &mut Tod) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        let was_finished = phase == Phase::Finished;
        self.phase = match phase {
            Phase::Idle => Phase::Idle,
            Phase::Finished => Phase::Finished,
            Phase::UnMute { remaining } => {
                let un_mute = RdmMessage::discovery(
                    Uid::BROADCAST,
                    self.source,
                    self.transaction,
                    pid::DISC_UN_MUTE,
                );
                self.send(port, transport, un_mute);
                if remaining > 1 {
                    Phase::UnMute {
                        remaining: remaining - 1,
                    }
                } else if self.mode == DiscoveryMode::Incremental && !tod.is_empty() {
                    Phase::MuteKnown {
                        pending: tod.to_vec(),
                        attempts: 0,
                    }
                } else {
                    Phase::Search
                }
            }
            Phase::MuteKnown {
                mut pending,
                mut attempts,
            } => {
                if let Some(&uid) = pending.last() {
                    if self.mute(port, transport, &uid) {
                        pending.pop();
                        attempts = 0;
                    } else {
                        attempts += 1;
                        if attempts >= MUTE_RETRIES {
                            debug!("RDM port {}: {} no longer responds", port, uid);
                            tod.remove_uid(&uid);
                            pending.pop();
                            attempts = 0;
                        }
                    }
                }
                if pending.is_empty() {
                    Phase::Search
                } else {
                    Phase::MuteKnown { pending, attempts }
                }
            }
            Phase::Search => self.search_step(port, transport, tod),
        };

        if !was_finished && self.phase == Phase::Finished {
            info!(
                "RDM discovery finished on port {}: {} device(s)",
                port,
                tod.len()
            );
        }
    }

    fn search_step(&mut self, port: usize, transport: &mut dyn RdmTransport, tod: &mut Tod) -> Phase {
        if let Some(mut pending) = self.pending_mute.take() {
            if self.mute(port, transport, &pending.uid) {
                let added = tod.add_uid(pending.uid);
                if added {
                    debug!("RDM port {}: found {}", port, pending.uid);
                }
                if let Some(branch) = pending.branch {
                    if added {
                        self.stack.push(branch);
                    } else {
                        self.split(branch);
                    }
                }
            } else {
                pending.attempts += 1;
                if pending.attempts < MUTE_RETRIES {
                    self.pending_mute = Some(pending);
                } else if let Some(branch) = pending.branch {
                    self.split(branch);
                }
            }
        } else if let Some(branch) = self.stack.last().copied() {
            if branch.lower == branch.upper {
                self.stack.pop();
                self.pending_mute = Some(PendingMute {
                    uid: Uid::from_u64(branch.lower),
                    branch: None,
                    attempts: 0,
                });
            } else {
                self.branch(port, transport, branch);
            }
        }

        if self.stack.is_empty() && self.pending_mute.is_none() {
            Phase::Finished
        } else {
            Phase::Search
        }
    }

    fn branch(&mut self, port: usize, transport: &mut dyn RdmTransport, branch: Branch) {
        let request = RdmMessage::unique_branch(
            self.source,
            self.transaction,
            Uid::from_u64(branch.lower),
            Uid::from_u64(branch.upper),
        );
        self.send(port, transport, request);

        match transport.receive_timeout(port, RECEIVE_TIMEOUT_MICROS) {
            None => {
                self.branch_attempts += 1;
                if self.branch_attempts >= BRANCH_RETRIES {
                    self.stack.pop();
                    self.branch_attempts = 0;
                }
            }
            Some(frame) => {
                self.branch_attempts = 0;
                self.stack.pop();
                match decode_discovery_response(&frame) {
                    Some(uid) if branch.contains(&uid) => {
                        self.pending_mute = Some(PendingMute {
                            uid,
                            branch: Some(branch),
                            attempts: 0,
                        });
                    }
                    _ => self.split(branch),
                }
            }
        }
    }

    fn split(&mut self, branch: Branch) {
        if branch.lower >= branch.upper {
            return;
        }
        let mid = branch.lower + (branch.upper - branch.lower) / 2;
        self.stack.push(Branch {
            lower: mid + 1,
            upper: branch.upper,
        });
        self.stack.push(Branch {
            lower: branch.lower,
            upper: mid,
        });
    }

    fn mute(&mut self, port: usize, transport: &mut dyn RdmTransport, uid: &Uid) -> bool {
        let request = RdmMessage::discovery(*uid, self.source, self.transaction, pid::DISC_MUTE);
        self.send(port, transport, request);
        transport
            .receive_timeout(port, RECEIVE_TIMEOUT_MICROS)
            .and_then(|frame| RdmMessage::decode(&frame))
            .is_some_and(|response| {
                response.command_class == command_class::DISCOVERY_COMMAND_RESPONSE
                    && response.parameter_id == pid::DISC_MUTE
                    && response.source == *uid
            })
    }

    fn send(&mut self, port: usize, transport: &mut dyn RdmTransport, request: RdmMessage) {
        self.transaction = self.transaction.wrapping_add(1);
        if let Err(e) = transport.send_raw(port, &request.encode()) {
            warn!("RDM port {}: send failed: {}", port, e);
        }
    }
}
