//! Port table and Port-Address arithmetic
//!
//! A Port-Address is 15 bits: Net (7) : Sub-Net (4) : Universe (4). Each
//! port of the node keeps its own switches so ports can live on different
//! nets; ArtPollReply reports one port per bind page.

use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};

/// Number of ports on the node
pub const MAX_PORTS: usize = 4;

/// DMX slots per universe
pub const UNIVERSE_SIZE: usize = 512;

/// Highest valid Port-Address
pub const MAX_PORT_ADDRESS: u16 = 0x7FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortDirection {
    /// DMX into the node, forwarded to the network
    Input,
    /// Network DMX out of the node
    Output,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortProtocol {
    #[default]
    ArtNet,
    Sacn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeMode {
    /// Highest takes precedence, per slot
    #[default]
    Htp,
    /// Latest takes precedence, whole frame
    Ltp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputStyle {
    /// Only transmit when data changes
    #[default]
    Delta,
    /// Transmit continuously
    Constant,
}

/// Compose a Port-Address from its switches
pub fn port_address(net: u8, sub: u8, universe: u8) -> u16 {
    (u16::from(net & 0x7F) << 8) | (u16::from(sub & 0x0F) << 4) | u16::from(universe & 0x0F)
}

/// Split a Port-Address into (net, sub, universe)
pub fn split_port_address(address: u16) -> (u8, u8, u8) {
    (
        ((address >> 8) & 0x7F) as u8,
        ((address >> 4) & 0x0F) as u8,
        (address & 0x0F) as u8,
    )
}

/// Static configuration of one port
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortConfig {
    pub port_address: u16,
    pub net_switch: u8,
    pub sub_switch: u8,
    pub universe_switch: u8,
    pub direction: PortDirection,
    pub protocol: PortProtocol,
    pub merge_mode: MergeMode,
    pub output_style: OutputStyle,
    pub rdm_enabled: bool,
    pub local_merge: bool,
}

impl PortConfig {
    fn recompute(&mut self) {
        self.port_address = port_address(self.net_switch, self.sub_switch, self.universe_switch);
    }

    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }

    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    pub fn is_enabled(&self) -> bool {
        self.direction != PortDirection::Disabled
    }
}

/// Configuration of all ports, indexed `0..MAX_PORTS`
#[derive(Debug, Clone, Default)]
pub struct PortTable {
    ports: [PortConfig; MAX_PORTS],
}

impl PortTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, port: usize) -> Option<&PortConfig> {
        self.ports.get(port)
    }

    pub fn get_mut(&mut self, port: usize) -> Result<&mut PortConfig> {
        self.ports.get_mut(port).ok_or(NodeError::InvalidPort(port))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PortConfig)> {
        self.ports.iter().enumerate()
    }

    /// Assign a full 15-bit universe and a direction to a port
    pub fn set_universe(&mut self, port: usize, direction: PortDirection, universe: u16) -> Result<()> {
        if universe > MAX_PORT_ADDRESS {
            return Err(NodeError::InvalidPortAddress(universe));
        }
        let config = self.get_mut(port)?;
        let (net, sub, universe) = split_port_address(universe);
        config.net_switch = net;
        config.sub_switch = sub;
        config.universe_switch = universe;
        config.direction = direction;
        config.recompute();
        Ok(())
    }

    /// Set the universe nibble only
    pub fn set_universe_switch(&mut self, port: usize, direction: PortDirection, universe: u8) -> Result<()> {
        let config = self.get_mut(port)?;
        config.universe_switch = universe & 0x0F;
        config.direction = direction;
        config.recompute();
        Ok(())
    }

    pub fn set_net_switch(&mut self, port: usize, net: u8) -> Result<()> {
        let config = self.get_mut(port)?;
        config.net_switch = net & 0x7F;
        config.recompute();
        Ok(())
    }

    pub fn set_subnet_switch(&mut self, port: usize, sub: u8) -> Result<()> {
        let config = self.get_mut(port)?;
        config.sub_switch = sub & 0x0F;
        config.recompute();
        Ok(())
    }

    /// Every enabled Art-Net output port listening on `address`
    pub fn output_ports_for(&self, address: u16) -> impl Iterator<Item = usize> + '_ {
        self.ports.iter().enumerate().filter_map(move |(index, config)| {
            (config.is_output()
                && config.protocol == PortProtocol::ArtNet
                && config.port_address == address)
                .then_some(index)
        })
    }

    /// Ports of the given direction whose Port-Address low byte and net match
    /// an RDM request (`ArtTodRequest`, `ArtTodControl`, `ArtRdm`)
    pub fn rdm_ports_for(
        &self,
        direction: PortDirection,
        net: u8,
        address: u8,
    ) -> impl Iterator<Item = usize> + '_ {
        self.ports.iter().enumerate().filter_map(move |(index, config)| {
            (config.direction == direction
                && config.net_switch == (net & 0x7F)
                && (config.port_address & 0xFF) as u8 == address)
                .then_some(index)
        })
    }

    /// True when no port is enabled
    pub fn all_disabled(&self) -> bool {
        self.ports.iter().all(|p| !p.is_enabled())
    }
}
