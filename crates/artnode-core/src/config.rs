//! Node configuration
//!
//! Plain serde data. Missing fields take their defaults so partial params
//! files stay valid across versions.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};
use crate::failsafe::FailSafe;
use crate::packets::PollReply;
use crate::port::{MergeMode, OutputStyle, PortDirection, PortProtocol, MAX_PORTS, MAX_PORT_ADDRESS};

/// Default network data-loss timeout
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u32 = 10;
/// Default silence after which a merge source is evicted
pub const DEFAULT_MERGE_TIMEOUT_SECS: u32 = 10;
/// Default interval between background RDM discovery cycles
pub const DEFAULT_RDM_DISCOVERY_INTERVAL_SECS: u32 = 15 * 60;

/// Settings of one port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortParams {
    pub direction: PortDirection,
    /// 15-bit Port-Address
    pub universe: u16,
    pub protocol: PortProtocol,
    pub merge_mode: MergeMode,
    pub output_style: OutputStyle,
    pub rdm_enabled: bool,
    /// Loop input DMX into the output merge
    pub local_merge: bool,
    /// Where input DMX is sent; broadcast when unset
    pub destination_ip: Option<Ipv4Addr>,
}

impl Default for PortParams {
    fn default() -> Self {
        Self {
            direction: PortDirection::Disabled,
            universe: 0,
            protocol: PortProtocol::ArtNet,
            merge_mode: MergeMode::Htp,
            output_style: OutputStyle::Delta,
            rdm_enabled: false,
            local_merge: false,
            destination_ip: None,
        }
    }
}

/// Node-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub short_name: String,
    pub long_name: String,
    pub oem: u16,
    pub esta_manufacturer: u16,
    pub firmware_version: u16,
    pub failsafe: FailSafe,
    /// 0 disables network-loss detection
    pub network_timeout_secs: u32,
    pub merge_timeout_secs: u32,
    pub disable_merge_timeout: bool,
    /// Global RDM switch; per-port enables still apply
    pub rdm_enabled: bool,
    pub rdm_discovery_interval_secs: u32,
    /// sACN has no universe 0: bridge universe = Port-Address + 1
    pub map_universe0: bool,
    pub acn_priority: u8,
    pub ports: Vec<PortParams>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            short_name: default_short_name(),
            long_name: default_long_name(),
            oem: 0x00FF,
            esta_manufacturer: 0x0000,
            firmware_version: 0x0100,
            failsafe: FailSafe::Last,
            network_timeout_secs: DEFAULT_NETWORK_TIMEOUT_SECS,
            merge_timeout_secs: DEFAULT_MERGE_TIMEOUT_SECS,
            disable_merge_timeout: false,
            rdm_enabled: false,
            rdm_discovery_interval_secs: DEFAULT_RDM_DISCOVERY_INTERVAL_SECS,
            map_universe0: false,
            acn_priority: 100,
            ports: vec![PortParams {
                direction: PortDirection::Output,
                ..PortParams::default()
            }],
        }
    }
}

fn default_short_name() -> String {
    "ArtNode".to_string()
}

fn default_long_name() -> String {
    "ArtNode Art-Net 4 Node".to_string()
}

impl NodeConfig {
    pub fn network_timeout_millis(&self) -> u32 {
        self.network_timeout_secs.saturating_mul(1000)
    }

    pub fn merge_timeout_millis(&self) -> u32 {
        self.merge_timeout_secs.saturating_mul(1000)
    }

    pub fn rdm_discovery_interval_millis(&self) -> u32 {
        self.rdm_discovery_interval_secs.saturating_mul(1000)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ports.len() > MAX_PORTS {
            return Err(NodeError::InvalidConfig(format!(
                "{} ports configured, at most {} supported",
                self.ports.len(),
                MAX_PORTS
            )));
        }
        if let Some((index, port)) = self
            .ports
            .iter()
            .enumerate()
            .find(|(_, port)| port.universe > MAX_PORT_ADDRESS)
        {
            return Err(NodeError::InvalidConfig(format!(
                "port {}: universe {:#06x} exceeds {:#06x}",
                index, port.universe, MAX_PORT_ADDRESS
            )));
        }
        if self.short_name.len() >= PollReply::SHORT_NAME_LENGTH {
            return Err(NodeError::InvalidConfig(format!(
                "short name longer than {} bytes",
                PollReply::SHORT_NAME_LENGTH - 1
            )));
        }
        if self.long_name.len() >= PollReply::LONG_NAME_LENGTH {
            return Err(NodeError::InvalidConfig(format!(
                "long name longer than {} bytes",
                PollReply::LONG_NAME_LENGTH - 1
            )));
        }
        if self.failsafe == FailSafe::Record {
            return Err(NodeError::InvalidConfig(
                "Record is a command, not a fail-safe mode".to_string(),
            ));
        }
        Ok(())
    }
}
