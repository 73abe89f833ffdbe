//! RDM coordination: TOD exchange, ArtRdm relay, the input-port proxy and
//! the periodic background discovery cycle.

use std::net::Ipv4Addr;

use tracing::{debug, info, trace, warn};

use super::ArtNetNode;
use crate::packets::rdm::RDM_COMMAND_PROCESS;
use crate::packets::tod::{RDM_VERSION, TOD_FULL, TOD_RESPONSE_FULL};
use crate::packets::{ArtRdm, ArtTodControl, ArtTodData, ArtTodRequest, TodControlCommand};
use crate::port::{PortDirection, MAX_PORTS};
use crate::rdm::message::SC_RDM;
use crate::rdm::{ProxyOutcome, RdmMessage};
use crate::status::good_output_b;

impl ArtNetNode {
    /// Full discovery on every RDM output port, TOD request for every input
    pub(super) fn start_rdm(&mut self) {
        if self.rdm.is_none() {
            return;
        }
        for port in 0..MAX_PORTS {
            let Some(config) = self.ports.get(port) else {
                continue;
            };
            let (is_rdm_output, is_input) = (config.is_output() && config.rdm_enabled, config.is_input());

            if is_rdm_output {
                self.start_full_discovery(port);
            } else if is_input {
                self.send_tod_request(port);
            }
        }
    }

    fn start_full_discovery(&mut self, port: usize) {
        let Some(rdm) = self.rdm.as_mut() else {
            return;
        };
        if let Err(e) = rdm.full(port) {
            warn!("RDM port {}: cannot start full discovery: {}", port, e);
            return;
        }
        self.rdm_cycle.tod_pending[port] = true;
        self.outputs[port].good_output_b &= !good_output_b::DISCOVERY_NOT_RUNNING;
    }

    /// Proxy, discovery steps, pending TODs and the background cycle
    pub(super) fn handle_rdm_background(&mut self, now: u32) {
        if self.rdm.is_none() {
            return;
        }
        self.run_rdm_proxy();
        if let Some(rdm) = self.rdm.as_mut() {
            rdm.run();
        }
        self.send_pending_tods();
        self.run_discovery_cycle(now);
    }

    fn run_rdm_proxy(&mut self) {
        for port in 0..MAX_PORTS {
            if !self.ports.get(port).is_some_and(|config| config.is_input()) {
                continue;
            }
            let Some(rdm) = self.rdm.as_mut() else {
                return;
            };
            let Some(frame) = rdm.receive_timeout(port, 0) else {
                continue;
            };
            if let ProxyOutcome::Forward(request) = rdm.handle_proxy(port, &frame) {
                self.forward_rdm_request(port, &request);
            }
        }
    }

    /// Send a request heard on an input line to the network controller
    fn forward_rdm_request(&mut self, port: usize, request: &RdmMessage) {
        let Some(config) = self.ports.get(port) else {
            return;
        };
        let (net, address) = (config.net_switch, (config.port_address & 0xFF) as u8);
        let frame = request.encode();
        let Some(payload) = frame.get(1..) else {
            return;
        };
        let len = ArtRdm {
            rdm_version: RDM_VERSION,
            net,
            command: RDM_COMMAND_PROCESS,
            address,
            rdm_packet: payload,
        }
        .encode(&mut self.tx);
        let ip = self.inputs[port]
            .destination_ip
            .unwrap_or_else(|| self.network.broadcast_ip());
        trace!("RDM port {}: forwarding request to {}", port, ip);
        self.send(len, ip);
    }

    fn send_pending_tods(&mut self) {
        for port in 0..MAX_PORTS {
            if !self.rdm_cycle.tod_pending[port] {
                continue;
            }
            if self.rdm.as_ref().is_some_and(|rdm| rdm.is_finished(port)) {
                self.rdm_cycle.tod_pending[port] = false;
                self.discovery_done(port);
            }
        }
    }

    fn discovery_done(&mut self, port: usize) {
        self.send_tod(port);
        self.restart_output(port);
        self.outputs[port].good_output_b |= good_output_b::DISCOVERY_NOT_RUNNING;
    }

    /// Port takes part in the background cycle
    fn is_discoverable(&self, port: usize) -> bool {
        self.ports
            .get(port)
            .is_some_and(|config| config.is_output() && config.rdm_enabled)
            && self.outputs[port].good_output_b & good_output_b::DISCOVERY_DISABLED == 0
            && !self.rdm_cycle.tod_pending[port]
    }

    fn run_discovery_cycle(&mut self, now: u32) {
        if !self.rdm_enabled {
            return;
        }
        if !self.rdm_cycle.running {
            if now.wrapping_sub(self.rdm_cycle.cycle_end_millis) < self.rdm_interval_millis {
                return;
            }
            self.rdm_cycle.running = true;
            self.rdm_cycle.cursor = 0;
            self.rdm_cycle.started = [false; MAX_PORTS];
            info!("RDM background discovery started");
        }

        let port = self.rdm_cycle.cursor;
        if port < MAX_PORTS {
            if !self.is_discoverable(port) {
                // A full discovery that took over the port restarts output itself
                if self.rdm_cycle.started[port] && !self.rdm_cycle.tod_pending[port] {
                    self.abandon_discovery(port);
                }
                self.rdm_cycle.started[port] = false;
                self.rdm_cycle.cursor += 1;
            } else {
                let Some(rdm) = self.rdm.as_mut() else {
                    return;
                };
                if !self.rdm_cycle.started[port] {
                    if let Err(e) = rdm.incremental(port) {
                        warn!("RDM port {}: cannot start discovery: {}", port, e);
                        self.rdm_cycle.cursor += 1;
                    } else {
                        self.rdm_cycle.started[port] = true;
                        self.pause_output(port);
                        self.outputs[port].good_output_b &= !good_output_b::DISCOVERY_NOT_RUNNING;
                    }
                } else if !rdm.is_running(port) {
                    // Finished, or stopped through ArtTodControl
                    if rdm.is_finished(port) {
                        self.discovery_done(port);
                    }
                    self.rdm_cycle.cursor += 1;
                }
            }
        }

        if self.rdm_cycle.cursor >= MAX_PORTS {
            self.rdm_cycle.running = false;
            self.rdm_cycle.cycle_end_millis = now;
            info!("RDM background discovery finished");
        }
    }

    /// Stop any discovery on `port` and give the line back to DMX output
    pub(super) fn abandon_discovery(&mut self, port: usize) {
        let in_progress = self.rdm_cycle.tod_pending[port]
            || self.rdm_cycle.started[port]
            || self.rdm.as_ref().is_some_and(|rdm| rdm.is_running(port));
        if let Some(rdm) = self.rdm.as_mut() {
            if let Err(e) = rdm.stop(port) {
                warn!("RDM port {}: {}", port, e);
            }
        }
        self.rdm_cycle.tod_pending[port] = false;
        self.rdm_cycle.started[port] = false;
        if in_progress {
            debug!("RDM port {}: discovery abandoned", port);
            self.restart_output(port);
        }
        self.outputs[port].good_output_b |= good_output_b::DISCOVERY_NOT_RUNNING;
    }

    fn pause_output(&mut self, port: usize) {
        if self.outputs[port].is_transmitting {
            self.light_set.stop(port);
        }
    }

    /// Stop/start so the output resynchronises after bus traffic
    fn restart_output(&mut self, port: usize) {
        if self.outputs[port].is_transmitting {
            self.light_set.stop(port);
            self.light_set.start(port);
        }
    }

    /// Broadcast the TOD of an output port
    fn send_tod(&mut self, port: usize) {
        let Some(config) = self.ports.get(port) else {
            return;
        };
        let uids = self
            .rdm
            .as_ref()
            .and_then(|rdm| rdm.tod(port))
            .map(|tod| tod.to_vec())
            .unwrap_or_default();
        debug!("RDM port {}: sending TOD with {} UID(s)", port, uids.len());

        let packet = ArtTodData {
            rdm_version: RDM_VERSION,
            port: (port & 3) as u8 + 1,
            bind_index: port as u8 + 1,
            net: config.net_switch,
            command_response: TOD_RESPONSE_FULL,
            address: (config.port_address & 0xFF) as u8,
            uid_total: uids.len() as u16,
            block_count: 0,
            uids,
        };
        let len = packet.encode(&mut self.tx);
        let ip = self.network.broadcast_ip();
        self.send(len, ip);
    }

    /// Reset the proxy TOD of an input port and ask the network for it
    fn send_tod_request(&mut self, port: usize) {
        let Some(config) = self.ports.get(port) else {
            return;
        };
        let (net, address) = (config.net_switch, (config.port_address & 0xFF) as u8);
        if let Some(rdm) = self.rdm.as_mut() {
            if let Err(e) = rdm.tod_reset(port) {
                warn!("RDM port {}: TOD reset failed: {}", port, e);
                return;
            }
        }

        let addresses = [address];
        let len = ArtTodRequest {
            net,
            command: TOD_FULL,
            addresses: &addresses,
        }
        .encode(&mut self.tx);
        let ip = self.network.broadcast_ip();
        self.send(len, ip);
    }

    /// RDM output ports matching a request, when RDM is usable on them
    fn rdm_output_ports(&self, net: u8, address: u8) -> Vec<usize> {
        if self.rdm.is_none() {
            return Vec::new();
        }
        self.ports
            .rdm_ports_for(PortDirection::Output, net, address)
            .filter(|&port| self.ports.get(port).is_some_and(|config| config.rdm_enabled))
            .collect()
    }

    pub(super) fn handle_tod_request(&mut self, data: &[u8]) {
        let Some(request) = ArtTodRequest::decode(data) else {
            return;
        };
        let (net, addresses) = (request.net, request.addresses.to_vec());
        for address in addresses {
            for port in self.rdm_output_ports(net, address) {
                self.send_tod(port);
            }
        }
    }

    pub(super) fn handle_tod_data(&mut self, data: &[u8]) {
        let Some(tod) = ArtTodData::decode(data) else {
            return;
        };
        if tod.rdm_version != RDM_VERSION || self.rdm.is_none() {
            return;
        }
        let ports: Vec<usize> = self
            .ports
            .rdm_ports_for(PortDirection::Input, tod.net, tod.address)
            .collect();
        let Some(rdm) = self.rdm.as_mut() else {
            return;
        };
        for port in ports {
            for uid in &tod.uids {
                match rdm.tod_add_uid(port, *uid) {
                    Ok(true) => trace!("RDM port {}: proxy UID {}", port, uid),
                    Ok(false) => {}
                    Err(e) => warn!("RDM port {}: {}", port, e),
                }
            }
        }
    }

    pub(super) fn handle_tod_control(&mut self, data: &[u8]) {
        let Some(control) = ArtTodControl::decode(data) else {
            return;
        };
        for port in self.rdm_output_ports(control.net, control.address) {
            self.tod_control_output(port, control.command);
        }

        if control.command == TodControlCommand::Flush && self.rdm.is_some() {
            let inputs: Vec<usize> = self
                .ports
                .rdm_ports_for(PortDirection::Input, control.net, control.address)
                .collect();
            for port in inputs {
                self.send_tod_request(port);
            }
        }
    }

    fn tod_control_output(&mut self, port: usize, command: TodControlCommand) {
        debug!("RDM port {}: ArtTodControl {:?}", port, command);
        match command {
            TodControlCommand::Flush => {
                self.pause_output(port);
                self.start_full_discovery(port);
            }
            TodControlCommand::End => {
                if let Some(rdm) = self.rdm.as_mut() {
                    if let Err(e) = rdm.stop(port) {
                        warn!("RDM port {}: {}", port, e);
                    }
                }
                self.rdm_cycle.tod_pending[port] = false;
                self.restart_output(port);
                self.outputs[port].good_output_b |= good_output_b::DISCOVERY_NOT_RUNNING;
                self.send_tod(port);
            }
            TodControlCommand::IncOn => {
                self.outputs[port].good_output_b &= !good_output_b::DISCOVERY_DISABLED;
                self.send_tod(port);
            }
            TodControlCommand::IncOff => {
                self.outputs[port].good_output_b |= good_output_b::DISCOVERY_DISABLED;
                self.send_tod(port);
            }
            TodControlCommand::None => self.send_tod(port),
        }
    }

    pub(super) fn handle_rdm(&mut self, data: &[u8], from: Ipv4Addr) {
        let Some(packet) = ArtRdm::decode(data) else {
            return;
        };
        if packet.rdm_version != RDM_VERSION || self.rdm.is_none() {
            return;
        }

        for port in self.rdm_output_ports(packet.net, packet.address) {
            self.relay_rdm_request(port, packet.net, packet.address, packet.rdm_packet, from);
        }

        let inputs: Vec<usize> = self
            .ports
            .rdm_ports_for(PortDirection::Input, packet.net, packet.address)
            .collect();
        if inputs.is_empty() {
            return;
        }
        let is_response = RdmMessage::decode_without_start_code(packet.rdm_packet)
            .is_some_and(|message| message.is_get_set_response());
        if !is_response {
            return;
        }
        let mut frame = Vec::with_capacity(packet.rdm_packet.len() + 1);
        frame.push(SC_RDM);
        frame.extend_from_slice(packet.rdm_packet);
        for port in inputs {
            if let Some(rdm) = self.rdm.as_mut() {
                if let Err(e) = rdm.send_raw(port, &frame) {
                    warn!("RDM port {}: cannot send response: {}", port, e);
                }
            }
        }
    }

    /// One blocking request/response on the line of an output port
    fn relay_rdm_request(&mut self, port: usize, net: u8, address: u8, request: &[u8], from: Ipv4Addr) {
        self.pause_output(port);
        self.outputs[port].rdm_controller_ip = Some(from);

        let response = match self.rdm.as_mut().map(|rdm| rdm.transaction(port, request)) {
            Some(Ok(response)) => response,
            Some(Err(e)) => {
                warn!("RDM port {}: transaction failed: {}", port, e);
                None
            }
            None => None,
        };

        if let Some(response) = response {
            let len = ArtRdm {
                rdm_version: RDM_VERSION,
                net,
                command: RDM_COMMAND_PROCESS,
                address,
                rdm_packet: &response,
            }
            .encode(&mut self.tx);
            self.send(len, from);
        }
        self.restart_output(port);
    }
}
