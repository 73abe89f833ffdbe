//! ArtNode Core - Art-Net 4 Node Protocol Engine
//!
//! This crate contains the protocol engine of an Art-Net 4 node:
//! - Wire codec for every supported OpCode
//! - Port table and Port-Address model
//! - Dual-source HTP/LTP merge engine
//! - ArtPollReply generation and the rate-limited reply queue
//! - Network-loss detection and fail-safe record/playback
//! - RDM discovery, Tables of Devices and ArtRdm relay
//!
//! The engine never touches sockets, clocks or hardware directly. Every
//! side effect goes through the collaborator traits in [`io`], so the same
//! node runs on a host, on a test harness or behind any other transport.

pub mod config;
pub mod error;
pub mod failsafe;
pub mod io;
pub mod merge;
pub mod node;
pub mod packets;
pub mod poll;
pub mod port;
pub mod rdm;
pub mod status;

// --- Re-exports grouped by category ---

// Node
pub use node::{
    ArtNetNode, Indicator, InputPort, NodeStatus, DMX_ACTIVITY_TIMEOUT_MILLIS,
    INPUT_KEEPALIVE_MILLIS, SYNC_TIMEOUT_MILLIS,
};

// Configuration & Errors
pub use config::{NodeConfig, PortParams};
pub use error::{NodeError, Result};

// Collaborators
pub use io::{
    DisplayHandler, DmxInput, FailSafeStore, Hardware, LedMode, LightSet, Network, NodeStore,
    RdmTransport, SacnBridge, SocketHandle, TimeCodeHandler, TimeSyncHandler, TriggerHandler,
};

// Ports & Merge
pub use merge::{MergeResult, OutputPort, Source};
pub use port::{
    port_address, split_port_address, MergeMode, OutputStyle, PortConfig, PortDirection,
    PortProtocol, PortTable, MAX_PORTS, MAX_PORT_ADDRESS, UNIVERSE_SIZE,
};

// Fail-safe & Poll
pub use failsafe::{FailSafe, MemoryFailSafeStore, NetworkLossMonitor, FAILSAFE_STORE_SIZE};
pub use poll::{PollAction, PollReplyQueue};

// RDM
pub use rdm::{RdmController, Tod, Uid};
