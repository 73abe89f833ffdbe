//! The Art-Net node
//!
//! [`ArtNetNode`] owns the port table, the per-port merge and input state and
//! every collaborator. [`ArtNetNode::run`] is called from the host's poll
//! loop; it receives at most one packet, dispatches it through
//! [`ArtNetNode::process`] and returns without blocking.

mod address;
mod dmx;
mod dmx_in;
mod failsafe;
mod misc;
mod poll;
mod rdm;

use std::net::Ipv4Addr;

use tracing::{debug, info, trace, warn};

use crate::config::{NodeConfig, PortParams};
use crate::error::{NodeError, Result};
use crate::failsafe::{FailSafe, NetworkLossMonitor};
use crate::io::{
    DisplayHandler, DmxInput, FailSafeStore, Hardware, LedMode, LightSet, Network, NodeStore,
    SacnBridge, SocketHandle, TimeCodeHandler, TimeSyncHandler, TriggerHandler,
};
use crate::merge::OutputPort;
use crate::packets::{decode_header, OpCode, PacketBuffer, MAX_PACKET_SIZE, UDP_PORT};
use crate::poll::{reply_delay_from_mac, PollReplyQueue};
use crate::port::{
    MergeMode, OutputStyle, PortConfig, PortDirection, PortProtocol, PortTable, MAX_PORTS,
};
use crate::rdm::RdmController;
use crate::status::{good_input, good_output, good_output_b, status1, ReportCode};

/// ArtSync keeps the node synchronous for this long
pub const SYNC_TIMEOUT_MILLIS: u32 = 4_000;
/// No ArtDmx for this long ends the "receiving DMX" indication
pub const DMX_ACTIVITY_TIMEOUT_MILLIS: u32 = 1_000;
/// Input ports without updates re-send their last frame at this interval
pub const INPUT_KEEPALIVE_MILLIS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Standby,
    On,
}

/// Front panel indicator requested through ArtAddress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    #[default]
    Normal,
    Mute,
    Locate,
}

impl Indicator {
    fn status1_bits(self) -> u8 {
        match self {
            Self::Normal => status1::INDICATOR_NORMAL_MODE,
            Self::Mute => status1::INDICATOR_MUTE_MODE,
            Self::Locate => status1::INDICATOR_LOCATE_MODE,
        }
    }
}

/// State of a port that forwards local DMX to the network
#[derive(Debug, Clone, Default)]
pub struct InputPort {
    /// Unicast destination; broadcast when `None`
    pub destination_ip: Option<Ipv4Addr>,
    pub sequence: u8,
    pub good_input: u8,
    /// Armed once the input went quiet, drives the keep-alive re-send
    keepalive_millis: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DiagTarget {
    #[default]
    Off,
    Unicast(Ipv4Addr),
    Broadcast,
}

#[derive(Debug, Default)]
struct NodeState {
    status: NodeStatus,
    report_code: ReportCode,
    report_counter: u16,
    is_synchronous_mode: bool,
    sync_millis: u32,
    last_dmx_ip: Option<Ipv4Addr>,
    last_dmx_millis: Option<u32>,
    is_merge_mode: bool,
    is_network_lost: bool,
    is_blackout: bool,
    reply_on_change: bool,
    is_changed: bool,
    diag: DiagTarget,
    diag_priority: u8,
    /// First controller that asked for diagnostics
    diag_poller: Option<Ipv4Addr>,
    /// More than one controller asked for diagnostics
    diag_shared: bool,
    indicator: Indicator,
    led_mode: Option<LedMode>,
}

/// Background discovery cycle over all ports
#[derive(Debug, Default)]
struct RdmCycle {
    running: bool,
    cursor: usize,
    cycle_end_millis: u32,
    started: [bool; MAX_PORTS],
    /// Full discovery requested by ArtTodControl or start-up; the TOD is
    /// sent when it finishes
    tod_pending: [bool; MAX_PORTS],
}

/// Art-Net 4 node protocol engine
pub struct ArtNetNode {
    network: Box<dyn Network>,
    light_set: Box<dyn LightSet>,
    hardware: Box<dyn Hardware>,
    failsafe_store: Option<Box<dyn FailSafeStore>>,
    rdm: Option<RdmController>,
    dmx_input: Option<Box<dyn DmxInput>>,
    sacn: Option<Box<dyn SacnBridge>>,
    store: Option<Box<dyn NodeStore>>,
    display: Option<Box<dyn DisplayHandler>>,
    time_code_handler: Option<Box<dyn TimeCodeHandler>>,
    time_sync_handler: Option<Box<dyn TimeSyncHandler>>,
    trigger_handler: Option<Box<dyn TriggerHandler>>,

    ports: PortTable,
    default_addresses: [u16; MAX_PORTS],
    outputs: [OutputPort; MAX_PORTS],
    inputs: [InputPort; MAX_PORTS],
    state: NodeState,
    rdm_cycle: RdmCycle,
    poll_queue: PollReplyQueue,
    network_loss: NetworkLossMonitor,

    short_name: String,
    long_name: String,
    oem: u16,
    esta_manufacturer: u16,
    firmware_version: u16,
    failsafe: FailSafe,
    merge_timeout_millis: u32,
    disable_merge_timeout: bool,
    rdm_enabled: bool,
    rdm_interval_millis: u32,
    map_universe0: bool,
    acn_priority: u8,

    socket: Option<SocketHandle>,
    rx: Vec<u8>,
    tx: Box<PacketBuffer>,
}

impl ArtNetNode {
    /// Build a node in `Standby` from a validated configuration
    pub fn new(
        config: &NodeConfig,
        network: Box<dyn Network>,
        light_set: Box<dyn LightSet>,
        hardware: Box<dyn Hardware>,
    ) -> Result<Self> {
        config.validate()?;

        let mut node = Self {
            network,
            light_set,
            hardware,
            failsafe_store: None,
            rdm: None,
            dmx_input: None,
            sacn: None,
            store: None,
            display: None,
            time_code_handler: None,
            time_sync_handler: None,
            trigger_handler: None,
            ports: PortTable::new(),
            default_addresses: [0; MAX_PORTS],
            outputs: std::array::from_fn(|_| OutputPort::new()),
            inputs: std::array::from_fn(|_| InputPort::default()),
            state: NodeState::default(),
            rdm_cycle: RdmCycle::default(),
            poll_queue: PollReplyQueue::new(0),
            network_loss: NetworkLossMonitor::new(config.network_timeout_millis()),
            short_name: config.short_name.clone(),
            long_name: config.long_name.clone(),
            oem: config.oem,
            esta_manufacturer: config.esta_manufacturer,
            firmware_version: config.firmware_version,
            failsafe: config.failsafe,
            merge_timeout_millis: config.merge_timeout_millis(),
            disable_merge_timeout: config.disable_merge_timeout,
            rdm_enabled: config.rdm_enabled,
            rdm_interval_millis: config.rdm_discovery_interval_millis(),
            map_universe0: config.map_universe0,
            acn_priority: config.acn_priority,
            socket: None,
            rx: vec![0; MAX_PACKET_SIZE],
            tx: Box::new([0; MAX_PACKET_SIZE]),
        };

        for output in &mut node.outputs {
            output.good_output_b =
                good_output_b::RDM_DISABLED | good_output_b::DISCOVERY_NOT_RUNNING;
        }
        for (port, params) in config.ports.iter().enumerate() {
            node.apply_port_params(port, params)?;
        }
        Ok(node)
    }

    fn apply_port_params(&mut self, port: usize, params: &PortParams) -> Result<()> {
        self.ports.set_universe(port, params.direction, params.universe)?;
        self.default_addresses[port] = params.universe;
        self.ports.get_mut(port)?.local_merge = params.local_merge;
        self.set_port_protocol(port, params.protocol)?;
        self.set_merge_mode(port, params.merge_mode)?;
        self.set_output_style(port, params.output_style)?;
        self.set_rdm(port, params.rdm_enabled)?;
        self.inputs[port].destination_ip = params.destination_ip;
        Ok(())
    }

    pub fn set_failsafe_store(&mut self, store: Box<dyn FailSafeStore>) {
        self.failsafe_store = Some(store);
    }

    pub fn set_rdm_controller(&mut self, controller: RdmController) {
        self.rdm = Some(controller);
    }

    pub fn set_dmx_input(&mut self, input: Box<dyn DmxInput>) {
        self.dmx_input = Some(input);
    }

    /// Attach the sACN bridge and hand it the current port setup
    pub fn set_sacn_bridge(&mut self, mut bridge: Box<dyn SacnBridge>) {
        for (port, config) in self.ports.iter() {
            bridge.set_universe(
                port,
                self.sacn_universe(config.port_address),
                config.is_output() && config.protocol == PortProtocol::Sacn,
            );
            bridge.set_merge_mode(port, config.merge_mode);
            bridge.set_priority(port, self.acn_priority);
        }
        self.sacn = Some(bridge);
    }

    pub fn set_node_store(&mut self, store: Box<dyn NodeStore>) {
        self.store = Some(store);
    }

    pub fn set_display(&mut self, display: Box<dyn DisplayHandler>) {
        self.display = Some(display);
    }

    pub fn set_time_code_handler(&mut self, handler: Box<dyn TimeCodeHandler>) {
        self.time_code_handler = Some(handler);
    }

    pub fn set_time_sync_handler(&mut self, handler: Box<dyn TimeSyncHandler>) {
        self.time_sync_handler = Some(handler);
    }

    pub fn set_trigger_handler(&mut self, handler: Box<dyn TriggerHandler>) {
        self.trigger_handler = Some(handler);
    }

    /// Bind the socket, start the outputs and announce the node
    pub fn start(&mut self) -> Result<()> {
        if self.state.status == NodeStatus::On {
            return Ok(());
        }

        let handle = self.network.begin(UDP_PORT)?;
        self.socket = Some(handle);
        self.poll_queue = PollReplyQueue::new(reply_delay_from_mac(&self.network.mac_address()));

        let now = self.hardware.millis();
        self.network_loss.touch(now);
        self.rdm_cycle = RdmCycle {
            cycle_end_millis: now,
            ..RdmCycle::default()
        };

        for port in 0..MAX_PORTS {
            let Some(config) = self.ports.get(port).cloned() else {
                continue;
            };
            if config.is_output() && config.protocol == PortProtocol::ArtNet {
                self.light_set.set_output_style(port, config.output_style);
            }
            if config.is_input() && config.protocol == PortProtocol::ArtNet {
                if let Some(input) = self.dmx_input.as_mut() {
                    input.start(port);
                }
            }
        }
        if let Some(bridge) = self.sacn.as_mut() {
            bridge.start();
        }

        self.state.status = NodeStatus::On;
        info!(
            "Art-Net node '{}' started on {} ({} port(s) enabled)",
            self.short_name,
            self.network.ip(),
            self.ports.iter().filter(|(_, c)| c.is_enabled()).count()
        );

        self.start_rdm();
        self.send_poll_replies(None);
        Ok(())
    }

    /// Halt all output and RDM activity and release the socket
    pub fn stop(&mut self) {
        if self.state.status == NodeStatus::Standby {
            return;
        }

        for (port, output) in self.outputs.iter_mut().enumerate() {
            if output.is_transmitting {
                self.light_set.stop(port);
                output.is_transmitting = false;
            }
            output.is_data_pending = false;
            output.clear_sources();
        }
        if let Some(input) = self.dmx_input.as_mut() {
            for (port, config) in self.ports.iter() {
                if config.is_input() {
                    input.stop(port);
                }
            }
        }
        if let Some(bridge) = self.sacn.as_mut() {
            bridge.stop();
        }
        if let Some(rdm) = self.rdm.as_mut() {
            rdm.stop_all();
        }
        self.rdm_cycle = RdmCycle::default();
        self.poll_queue.clear();
        self.state.is_merge_mode = false;
        self.state.is_synchronous_mode = false;

        if let Some(handle) = self.socket.take() {
            self.network.end(handle);
        }
        self.state.status = NodeStatus::Standby;
        info!("Art-Net node stopped");
    }

    /// One poll-loop iteration: receive at most one packet and process it
    pub fn run(&mut self) {
        let Some(handle) = self.socket else {
            return;
        };

        let mut rx = std::mem::take(&mut self.rx);
        match self.network.recv_from(handle, &mut rx) {
            Some((len, from, _port)) => self.process(&rx[..len.min(rx.len())], from),
            None => self.process(&[], Ipv4Addr::UNSPECIFIED),
        }
        self.rx = rx;

        if let Some(bridge) = self.sacn.as_mut() {
            bridge.run();
        }
        self.hardware.watchdog_feed();
    }

    /// Process one received packet, or a timer tick when `data` is empty
    ///
    /// Never fails: malformed and foreign packets are dropped silently.
    /// Only datagrams with a valid Art-Net header reset the network-loss
    /// timer, so other UDP traffic on port 6454 does not hold off fail-safe.
    pub fn process(&mut self, data: &[u8], from: Ipv4Addr) {
        if self.state.status != NodeStatus::On {
            return;
        }
        let now = self.hardware.millis();

        if data.is_empty() {
            self.check_network_loss(now);
            self.send_on_change();
        } else {
            if self.state.is_synchronous_mode
                && now.wrapping_sub(self.state.sync_millis) >= SYNC_TIMEOUT_MILLIS
            {
                debug!("ArtSync timed out, leaving synchronous mode");
                self.state.is_synchronous_mode = false;
            }
            if let Some(op) = decode_header(data) {
                self.network_loss.touch(now);
                self.recover_from_network_loss();
                self.dispatch(op, data, from, now);
            }
        }

        self.handle_dmx_in(now);
        self.handle_rdm_background(now);
        self.update_led(now);
        self.drain_poll_replies(now);
    }

    fn dispatch(&mut self, op: OpCode, data: &[u8], from: Ipv4Addr, now: u32) {
        match op {
            OpCode::Poll => self.handle_poll(data, from, now),
            OpCode::Dmx => self.handle_dmx(data, from, now),
            OpCode::Sync => self.handle_sync(from, now),
            OpCode::Address => self.handle_address(data, from),
            OpCode::Input => self.handle_input(data, from),
            OpCode::TimeCode => self.handle_time_code(data),
            OpCode::TimeSync => self.handle_time_sync(data),
            OpCode::TodRequest => self.handle_tod_request(data),
            OpCode::TodData => self.handle_tod_data(data),
            OpCode::TodControl => self.handle_tod_control(data),
            OpCode::Rdm => self.handle_rdm(data, from),
            OpCode::IpProg => self.handle_ip_prog(data, from),
            OpCode::Trigger => self.handle_trigger(data),
            OpCode::PollReply | OpCode::DiagData | OpCode::RdmSub | OpCode::IpProgReply => {
                trace!("Ignoring {:?} from {}", op, from);
            }
        }
    }

    fn send(&mut self, len: usize, ip: Ipv4Addr) {
        let Some(handle) = self.socket else {
            return;
        };
        if let Err(e) = self.network.send_to(handle, &self.tx[..len], ip, UDP_PORT) {
            warn!("Failed to send {} bytes to {}: {}", len, ip, e);
        }
    }

    fn is_receiving_dmx(&self, now: u32) -> bool {
        let output = self
            .state
            .last_dmx_millis
            .is_some_and(|last| now.wrapping_sub(last) < DMX_ACTIVITY_TIMEOUT_MILLIS);
        output
            || self
                .inputs
                .iter()
                .any(|input| input.good_input & good_input::DATA_RECEIVED != 0)
    }

    fn update_led(&mut self, now: u32) {
        let mode = match self.state.indicator {
            Indicator::Locate => LedMode::Fast,
            Indicator::Mute => LedMode::Off,
            Indicator::Normal if self.is_receiving_dmx(now) => LedMode::Data,
            Indicator::Normal => LedMode::Normal,
        };
        if self.state.led_mode != Some(mode) {
            self.hardware.set_led_mode(mode);
            self.state.led_mode = Some(mode);
        }
    }

    fn check_port(port: usize) -> Result<()> {
        if port < MAX_PORTS {
            Ok(())
        } else {
            Err(NodeError::InvalidPort(port))
        }
    }

    fn sacn_universe(&self, port_address: u16) -> u16 {
        if self.map_universe0 {
            port_address.saturating_add(1)
        } else {
            port_address
        }
    }

    /// Push the new Port-Address of `port` everywhere it is mirrored
    fn port_address_changed(&mut self, port: usize) {
        let Some(config) = self.ports.get(port).cloned() else {
            return;
        };
        let universe = self.sacn_universe(config.port_address);
        if let Some(bridge) = self.sacn.as_mut() {
            bridge.set_universe(
                port,
                universe,
                config.is_output() && config.protocol == PortProtocol::Sacn,
            );
        }
        if self.state.status == NodeStatus::On {
            if let Some(store) = self.store.as_mut() {
                store.save_universe(port, config.port_address);
            }
            if let Some(display) = self.display.as_mut() {
                display.show_universe(port, config.port_address);
            }
        }
        self.state.is_changed = true;
    }

    // Port table

    /// Assign a 15-bit universe and direction to a port
    pub fn set_universe(&mut self, port: usize, direction: PortDirection, universe: u16) -> Result<()> {
        self.ports.set_universe(port, direction, universe)?;
        self.port_address_changed(port);
        Ok(())
    }

    pub fn set_net_switch(&mut self, port: usize, net: u8) -> Result<()> {
        self.ports.set_net_switch(port, net)?;
        self.port_address_changed(port);
        Ok(())
    }

    pub fn set_subnet_switch(&mut self, port: usize, sub: u8) -> Result<()> {
        self.ports.set_subnet_switch(port, sub)?;
        self.port_address_changed(port);
        Ok(())
    }

    pub fn set_destination_ip(&mut self, port: usize, ip: Option<Ipv4Addr>) -> Result<()> {
        Self::check_port(port)?;
        self.inputs[port].destination_ip = ip;
        Ok(())
    }

    pub fn set_merge_mode(&mut self, port: usize, mode: MergeMode) -> Result<()> {
        let config = self.ports.get_mut(port)?;
        let changed = config.merge_mode != mode;
        config.merge_mode = mode;

        let output = &mut self.outputs[port];
        match mode {
            MergeMode::Ltp => output.good_output |= good_output::MERGE_MODE_LTP,
            MergeMode::Htp => output.good_output &= !good_output::MERGE_MODE_LTP,
        }
        if let Some(bridge) = self.sacn.as_mut() {
            bridge.set_merge_mode(port, mode);
        }
        if changed && self.state.status == NodeStatus::On {
            if let Some(store) = self.store.as_mut() {
                store.save_merge_mode(port, mode);
            }
            if let Some(display) = self.display.as_mut() {
                display.show_merge_mode(port, mode);
            }
        }
        Ok(())
    }

    pub fn set_port_protocol(&mut self, port: usize, protocol: PortProtocol) -> Result<()> {
        let config = self.ports.get_mut(port)?;
        let changed = config.protocol != protocol;
        config.protocol = protocol;

        let output = &mut self.outputs[port];
        match protocol {
            PortProtocol::Sacn => output.good_output |= good_output::OUTPUT_IS_SACN,
            PortProtocol::ArtNet => output.good_output &= !good_output::OUTPUT_IS_SACN,
        }
        if protocol == PortProtocol::Sacn && output.is_transmitting {
            self.light_set.stop(port);
            output.is_transmitting = false;
        }
        self.port_address_changed(port);
        if changed && self.state.status == NodeStatus::On {
            if let Some(store) = self.store.as_mut() {
                store.save_protocol(port, protocol == PortProtocol::Sacn);
            }
        }
        Ok(())
    }

    pub fn set_output_style(&mut self, port: usize, style: OutputStyle) -> Result<()> {
        let config = self.ports.get_mut(port)?;
        let changed = config.output_style != style;
        config.output_style = style;

        let output = &mut self.outputs[port];
        match style {
            OutputStyle::Constant => output.good_output_b |= good_output_b::STYLE_CONSTANT,
            OutputStyle::Delta => output.good_output_b &= !good_output_b::STYLE_CONSTANT,
        }
        if self.state.status == NodeStatus::On {
            self.light_set.set_output_style(port, style);
            if changed {
                if let Some(store) = self.store.as_mut() {
                    store.save_output_style(port, style);
                }
            }
        }
        Ok(())
    }

    /// Enable or disable RDM on an output port
    pub fn set_rdm(&mut self, port: usize, enabled: bool) -> Result<()> {
        let config = self.ports.get_mut(port)?;
        let changed = config.rdm_enabled != enabled;
        config.rdm_enabled = enabled;

        let output = &mut self.outputs[port];
        if enabled {
            output.good_output_b &= !good_output_b::RDM_DISABLED;
        } else {
            output.good_output_b |= good_output_b::RDM_DISABLED;
        }
        if changed && self.state.status == NodeStatus::On {
            if !enabled {
                self.abandon_discovery(port);
            }
            if let Some(store) = self.store.as_mut() {
                store.save_rdm_enabled(port, enabled);
            }
        }
        Ok(())
    }

    pub fn set_short_name(&mut self, name: &str) {
        self.short_name = truncate(name, crate::packets::PollReply::SHORT_NAME_LENGTH - 1);
        if self.state.status == NodeStatus::On {
            if let Some(store) = self.store.as_mut() {
                store.save_short_name(&self.short_name);
            }
            if let Some(display) = self.display.as_mut() {
                display.show_short_name(&self.short_name);
            }
        }
        self.state.is_changed = true;
    }

    pub fn set_long_name(&mut self, name: &str) {
        self.long_name = truncate(name, crate::packets::PollReply::LONG_NAME_LENGTH - 1);
        if self.state.status == NodeStatus::On {
            if let Some(store) = self.store.as_mut() {
                store.save_long_name(&self.long_name);
            }
            if let Some(display) = self.display.as_mut() {
                display.show_long_name(&self.long_name);
            }
        }
        self.state.is_changed = true;
    }

    pub fn set_disable_merge_timeout(&mut self, disable: bool) {
        self.disable_merge_timeout = disable;
    }

    /// Network data-loss timeout; 0 disables detection
    pub fn set_network_timeout_millis(&mut self, timeout_millis: u32) {
        self.network_loss.set_timeout_millis(timeout_millis);
    }

    pub fn set_indicator(&mut self, indicator: Indicator) {
        self.state.indicator = indicator;
    }

    // Getters

    pub fn status(&self) -> NodeStatus {
        self.state.status
    }

    pub fn ports(&self) -> &PortTable {
        &self.ports
    }

    pub fn port_config(&self, port: usize) -> Option<&PortConfig> {
        self.ports.get(port)
    }

    pub fn output(&self, port: usize) -> Option<&OutputPort> {
        self.outputs.get(port)
    }

    pub fn input(&self, port: usize) -> Option<&InputPort> {
        self.inputs.get(port)
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn failsafe(&self) -> FailSafe {
        self.failsafe
    }

    pub fn report_code(&self) -> ReportCode {
        self.state.report_code
    }

    pub fn indicator(&self) -> Indicator {
        self.state.indicator
    }

    /// Any output port is merging two sources
    pub fn is_merge_mode(&self) -> bool {
        self.state.is_merge_mode
    }

    pub fn is_synchronous_mode(&self) -> bool {
        self.state.is_synchronous_mode
    }

    pub fn is_network_lost(&self) -> bool {
        self.state.is_network_lost
    }

    pub fn pending_poll_replies(&self) -> usize {
        self.poll_queue.len()
    }

    pub fn rdm(&self) -> Option<&RdmController> {
        self.rdm.as_ref()
    }

    /// A background discovery cycle is in progress
    pub fn is_rdm_cycle_running(&self) -> bool {
        self.rdm_cycle.running
    }
}

/// Truncate on a character boundary to at most `max` bytes
fn truncate(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 17), "abc");
        assert_eq!(truncate(&"x".repeat(20), 17).len(), 17);
        // Multi-byte character straddling the limit is dropped
        assert_eq!(truncate("aé", 2), "a");
    }

    #[test]
    fn test_indicator_bits() {
        assert_eq!(Indicator::Normal.status1_bits(), status1::INDICATOR_NORMAL_MODE);
        assert_eq!(Indicator::Locate.status1_bits(), status1::INDICATOR_LOCATE_MODE);
        assert_eq!(Indicator::Mute.status1_bits(), status1::INDICATOR_MUTE_MODE);
    }
}
